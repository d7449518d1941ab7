mod commands;
mod exit_code;
mod output;
mod progress;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::analyze::AnalyzeArgs;
use commands::cache::CacheCommands;
use commands::versions::VersionsArgs;
use exit_code::ExitCode;
use query_analyzer_config::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "query-analyzer")]
#[command(
    about = "Find deprecated and breaking GraphQL usages before an API version upgrade",
    long_about = None
)]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Path to the analyzer config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Force colored output even when not a TTY
    #[arg(long, global = true, conflicts_with = "no_color")]
    color: bool,

    /// Disable colored output
    #[arg(long, global = true, conflicts_with = "color")]
    no_color: bool,

    /// Suppress all output except the report and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Suppress progress indicators (spinners)
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output verbosity options
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    /// Whether to show progress indicators (spinners)
    pub show_progress: bool,
    /// Whether to show informational output (counts, resolved versions)
    pub show_info: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare queries against the current and target API versions
    ///
    /// Exits 1 when any query breaks, 2 when only deprecations were found.
    Analyze(AnalyzeArgs),

    /// List available API versions
    Versions(VersionsArgs),

    /// Manage the local schema cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing();
    configure_colors(cli.color, cli.no_color);

    let output_opts = OutputOptions {
        show_progress: !cli.quiet && !cli.no_progress,
        show_info: !cli.quiet,
    };
    let json_errors = matches!(
        &cli.command,
        Commands::Analyze(args) if args.format == Some(OutputFormat::Json)
    );

    let result = match cli.command {
        Commands::Analyze(args) => commands::analyze::run(&args, cli.config, output_opts).await,
        Commands::Versions(args) => commands::versions::run(&args, output_opts).await,
        Commands::Cache { command } => commands::cache::run(command),
    };

    match result {
        Ok(code) => code.exit(),
        Err(err) => {
            let code = ExitCode::classify(&err);
            tracing::debug!(?err, %code, "Command failed");
            if json_errors {
                eprintln!("{}", serde_json::json!({ "error": format!("{err:#}") }));
            } else {
                eprintln!("{} {err:#}", "✗".red());
            }
            code.exit()
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn configure_colors(force_color: bool, no_color: bool) {
    use colored::control;

    if force_color {
        control::set_override(true);
    } else if no_color {
        control::set_override(false);
    } else if std::env::var_os("NO_COLOR").is_some() {
        // NO_COLOR: presence alone disables colors
        control::set_override(false);
    } else if let Ok(val) = std::env::var("CLICOLOR_FORCE") {
        if !val.is_empty() && val != "0" {
            control::set_override(true);
        }
    } else if let Ok(val) = std::env::var("CLICOLOR") {
        if val == "0" {
            control::set_override(false);
        }
    }
    // Otherwise the colored crate decides from TTY detection
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use query_analyzer_config::ApiKind;

    #[test]
    fn analyze_accepts_paths_and_flags() {
        let cli = Cli::try_parse_from([
            "query-analyzer",
            "analyze",
            "app",
            "queries",
            "--api",
            "storefront",
            "--target",
            "unstable",
            "-e",
            "php",
            "--format",
            "json",
            "--no-progress",
        ])
        .unwrap();

        assert!(cli.no_progress);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.paths, vec![PathBuf::from("app"), PathBuf::from("queries")]);
        assert_eq!(args.api, Some(ApiKind::Storefront));
        assert_eq!(args.target.as_deref(), Some("unstable"));
        assert_eq!(args.extensions, vec!["php".to_string()]);
        assert_eq!(args.format, Some(OutputFormat::Json));
    }

    #[test]
    fn schema_files_must_come_in_pairs() {
        let result = Cli::try_parse_from([
            "query-analyzer",
            "analyze",
            ".",
            "--current-schema-file",
            "current.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cache_dir_has_default() {
        let cli = Cli::try_parse_from(["query-analyzer", "cache", "info"]).unwrap();
        let Commands::Cache {
            command: CacheCommands::Info { cache_dir },
        } = cli.command
        else {
            panic!("expected cache info");
        };
        assert_eq!(cache_dir, PathBuf::from(query_analyzer_config::DEFAULT_CACHE_DIR));
    }

    #[test]
    fn color_flags_conflict() {
        assert!(Cli::try_parse_from(["query-analyzer", "--color", "--no-color", "cache", "info"])
            .is_err());
    }
}

#[cfg(test)]
mod color_tests {
    use super::configure_colors;
    use colored::control::{self, SHOULD_COLORIZE};
    use std::sync::Mutex;

    // Serializes tests that touch env vars and the global override
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 3] = ["NO_COLOR", "CLICOLOR", "CLICOLOR_FORCE"];

    fn with_clean_env<F: FnOnce()>(f: F) {
        let _lock = TEST_MUTEX.lock().unwrap();

        let saved: Vec<_> = VARS.iter().map(|v| std::env::var_os(v)).collect();
        for var in VARS {
            std::env::remove_var(var);
        }
        control::unset_override();

        f();

        control::unset_override();
        for (var, value) in VARS.iter().zip(saved) {
            match value {
                Some(v) => std::env::set_var(var, v),
                None => std::env::remove_var(var),
            }
        }
    }

    #[test]
    fn color_flag_forces_colors_on() {
        with_clean_env(|| {
            configure_colors(true, false);
            assert!(SHOULD_COLORIZE.should_colorize());
        });
    }

    #[test]
    fn no_color_flag_forces_colors_off() {
        with_clean_env(|| {
            configure_colors(false, true);
            assert!(!SHOULD_COLORIZE.should_colorize());
        });
    }

    #[test]
    fn color_flag_overrides_no_color_env() {
        with_clean_env(|| {
            std::env::set_var("NO_COLOR", "1");
            configure_colors(true, false);
            assert!(SHOULD_COLORIZE.should_colorize());
        });
    }

    #[test]
    fn no_color_env_with_empty_value_disables_colors() {
        with_clean_env(|| {
            std::env::set_var("NO_COLOR", "");
            configure_colors(false, false);
            assert!(!SHOULD_COLORIZE.should_colorize());
        });
    }

    #[test]
    fn clicolor_force_enables_colors() {
        with_clean_env(|| {
            std::env::set_var("CLICOLOR_FORCE", "1");
            configure_colors(false, false);
            assert!(SHOULD_COLORIZE.should_colorize());
        });
    }

    #[test]
    fn clicolor_zero_disables_colors() {
        with_clean_env(|| {
            std::env::set_var("CLICOLOR", "0");
            configure_colors(false, false);
            assert!(!SHOULD_COLORIZE.should_colorize());
        });
    }

    #[test]
    fn no_color_env_takes_priority_over_clicolor_force() {
        with_clean_env(|| {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("CLICOLOR_FORCE", "1");
            configure_colors(false, false);
            assert!(!SHOULD_COLORIZE.should_colorize());
        });
    }
}
