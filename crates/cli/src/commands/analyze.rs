use crate::exit_code::ExitCode;
use crate::{output, progress, OutputOptions};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use query_analyzer_analysis::{BatchAnalyzer, Versions};
use query_analyzer_cache::{FileFetcher, HttpFetcher, SchemaCache, SchemaStore};
use query_analyzer_config::{find_config, load_config, AnalyzerConfig, ApiKind, OutputFormat};
use query_analyzer_extract::{ExtractedQuery, QueryCollector};
use query_analyzer_schema::SchemaModel;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

const LOCAL_CURRENT: &str = "local";
const LOCAL_TARGET: &str = "local-target";

/// Analyze GraphQL queries for deprecations and breaking changes
#[derive(Debug, Default, Args)]
pub struct AnalyzeArgs {
    /// Files or directories to scan (defaults to `paths` from the config file)
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    /// API to analyze against: admin or storefront
    #[arg(long)]
    pub api: Option<ApiKind>,

    /// Version the code targets today (defaults to the latest supported)
    #[arg(long, value_name = "VERSION")]
    pub current_version: Option<String>,

    /// Version to upgrade to: latest, unstable or an explicit version
    #[arg(long, value_name = "VERSION")]
    pub target: Option<String>,

    /// Shop domain (e.g. myshop.myshopify.com)
    #[arg(long)]
    pub shop: Option<String>,

    /// Admin API access token (or `SHOPIFY_ADMIN_TOKEN`)
    #[arg(long)]
    pub admin_token: Option<String>,

    /// Storefront API access token (or `SHOPIFY_STOREFRONT_TOKEN`)
    #[arg(long)]
    pub storefront_token: Option<String>,

    /// Use the unauthenticated direct proxy (2025-01 and newer only)
    #[arg(long)]
    pub use_direct_proxy: bool,

    /// Output format: human or json
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Only scan files with these extensions (repeatable)
    #[arg(short, long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Directory for cached schemas
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Download schemas even when cached
    #[arg(long)]
    pub force_refresh: bool,

    /// Local introspection JSON for the current version (skips the API)
    #[arg(long, value_name = "FILE", requires = "target_schema_file")]
    pub current_schema_file: Option<PathBuf>,

    /// Local introspection JSON for the target version (skips the API)
    #[arg(long, value_name = "FILE", requires = "current_schema_file")]
    pub target_schema_file: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Layer the flags over the project config.
    fn apply(&self, mut config: AnalyzerConfig) -> AnalyzerConfig {
        if !self.paths.is_empty() {
            config.paths.clone_from(&self.paths);
        }
        if let Some(api) = self.api {
            config.api = api;
        }
        if self.current_version.is_some() {
            config.current_version.clone_from(&self.current_version);
        }
        if let Some(target) = &self.target {
            config.target.clone_from(target);
        }
        if self.shop.is_some() {
            config.auth.shop.clone_from(&self.shop);
        }
        if self.admin_token.is_some() {
            config.auth.admin_token.clone_from(&self.admin_token);
        }
        if self.storefront_token.is_some() {
            config.auth.storefront_token.clone_from(&self.storefront_token);
        }
        config.auth.use_direct_proxy |= self.use_direct_proxy;
        if let Some(format) = self.format {
            config.output_format = format;
        }
        if !self.extensions.is_empty() {
            config.extensions = Some(self.extensions.clone());
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir.clone_from(dir);
        }
        config.auth = config.auth.with_env_tokens();
        config
    }

    fn schema_files(&self) -> Option<(PathBuf, PathBuf)> {
        self.current_schema_file
            .clone()
            .zip(self.target_schema_file.clone())
    }
}

/// Explicit `--config`, or the nearest config file above the working directory.
///
/// Relative `paths` in the file are resolved against its directory.
fn load_settings(config_path: Option<PathBuf>) -> Result<AnalyzerConfig> {
    let path = match config_path {
        Some(path) => Some(path),
        None => find_config(&std::env::current_dir()?)?,
    };
    let Some(path) = path else {
        return Ok(AnalyzerConfig::default());
    };

    let mut config = load_config(&path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    if let Some(base) = path.parent() {
        for entry in &mut config.paths {
            if entry.is_relative() {
                *entry = base.join(&*entry);
            }
        }
    }
    Ok(config)
}

struct Schemas {
    versions: Versions,
    current: Arc<SchemaModel>,
    target: Arc<SchemaModel>,
}

#[tracing::instrument(skip_all, fields(paths = args.paths.len()))]
pub async fn run(
    args: &AnalyzeArgs,
    config_path: Option<PathBuf>,
    output_opts: OutputOptions,
) -> Result<ExitCode> {
    let config = args.apply(load_settings(config_path)?);
    let human = config.output_format == OutputFormat::Human;
    let show_progress = human && output_opts.show_progress;
    let show_info = human && output_opts.show_info;

    if config.paths.is_empty() {
        return Err(anyhow::anyhow!(
            "No paths to analyze. Pass files or directories, or set `paths` in the config file."
        )
        .context(ExitCode::ConfigError));
    }

    let schema_files = args.schema_files();
    if schema_files.is_none() {
        config.auth.validate(config.api)?;
    }

    let spinner = progress::spinner("Scanning for GraphQL queries...", show_progress);
    let extensions = config.normalized_extensions();
    let queries = QueryCollector::new().collect(&config.paths, extensions.as_deref())?;
    spinner.finish_and_clear();

    if queries.is_empty() {
        if output_opts.show_info {
            eprintln!(
                "{}",
                "No GraphQL queries found in the specified paths.".yellow()
            );
        }
        return Ok(ExitCode::Success);
    }
    if show_info {
        let files: BTreeSet<_> = queries.iter().map(|q| &q.file).collect();
        println!(
            "{}",
            format!("Found {} queries in {} files", queries.len(), files.len()).dimmed()
        );
    }

    let schemas = match schema_files {
        Some((current, target)) => local_schemas(&config, current, target, show_info).await?,
        None => remote_schemas(&config, args.force_refresh, show_progress).await?,
    };
    if show_info {
        println!(
            "{}",
            format!(
                "Current version: {}, target version: {}",
                schemas.versions.current, schemas.versions.target
            )
            .dimmed()
        );
    }

    let sources: Vec<_> = queries.into_iter().map(ExtractedQuery::into_source).collect();
    let bar = progress::bar(sources.len(), show_progress);
    let analyzer = BatchAnalyzer::new(schemas.current, schemas.target, schemas.versions);
    let report = {
        let bar = bar.clone();
        tokio::task::spawn_blocking(move || {
            analyzer.run_with_progress(sources, |done, _| bar.set_position(done as u64))
        })
        .await
        .context("Analysis worker failed")?
    };
    bar.finish_and_clear();

    let mut stdout = std::io::stdout().lock();
    match config.output_format {
        OutputFormat::Human => output::render_human(&report, &mut stdout)?,
        OutputFormat::Json => output::render_json(&report, &mut stdout)?,
    }

    Ok(ExitCode::from_report(&report))
}

/// Both schemas from local introspection files.
async fn local_schemas(
    config: &AnalyzerConfig,
    current_file: PathBuf,
    target_file: PathBuf,
    show_info: bool,
) -> Result<Schemas> {
    let current_label = config
        .current_version
        .clone()
        .unwrap_or_else(|| LOCAL_CURRENT.to_string());
    let target_label = if config.target == "latest" {
        LOCAL_TARGET.to_string()
    } else {
        config.target.clone()
    };

    if show_info {
        println!("{}", "Using local schema files".dimmed());
        println!("{}", format!("Current: {}", current_file.display()).dimmed());
        println!("{}", format!("Target: {}", target_file.display()).dimmed());
    }

    // Keyed by role so equal labels still read two files.
    let cache = SchemaCache::new(
        FileFetcher::new()
            .with_file("current", current_file)
            .with_file("target", target_file),
    );
    let (current, target) = tokio::try_join!(
        cache.get(config.api, "current", false),
        cache.get(config.api, "target", false),
    )
    .context("Failed to load schema files")?;

    Ok(Schemas {
        versions: Versions::new(current_label, target_label),
        current,
        target,
    })
}

/// Both schemas from the API, through the disk cache.
async fn remote_schemas(
    config: &AnalyzerConfig,
    force_refresh: bool,
    show_progress: bool,
) -> Result<Schemas> {
    let cache = SchemaCache::new(HttpFetcher::new(config.auth.clone()))
        .with_store(SchemaStore::new(&config.cache_dir));

    let spinner = progress::spinner("Resolving API versions...", show_progress);
    let current_version = match &config.current_version {
        Some(version) => version.clone(),
        None => cache
            .resolve_version(config.api, "latest")
            .await
            .context("Failed to resolve the current API version")?,
    };
    let target_version = cache
        .resolve_version(config.api, &config.target)
        .await
        .context("Failed to resolve the target API version")?;
    tracing::info!(%current_version, %target_version, "Resolved versions");

    spinner.set_message(format!(
        "Fetching {} {current_version} and {target_version} schemas...",
        config.api.title()
    ));
    let (current, target) = tokio::try_join!(
        cache.get(config.api, &current_version, force_refresh),
        cache.get(config.api, &target_version, force_refresh),
    )
    .context("Failed to fetch schemas")?;
    spinner.finish_and_clear();

    Ok(Schemas {
        versions: Versions::new(current_version, target_version),
        current,
        target,
    })
}
