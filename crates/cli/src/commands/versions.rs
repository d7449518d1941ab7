use crate::exit_code::ExitCode;
use crate::{progress, OutputOptions};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use query_analyzer_cache::{HttpFetcher, SchemaFetcher};
use query_analyzer_config::{ApiKind, AuthConfig};

/// List the API versions the endpoint knows about
#[derive(Debug, Default, Args)]
pub struct VersionsArgs {
    /// API to list: admin or storefront
    #[arg(long, default_value = "admin")]
    pub api: ApiKind,

    /// Shop domain (e.g. myshop.myshopify.com)
    #[arg(long)]
    pub shop: Option<String>,

    /// Admin API access token (or `SHOPIFY_ADMIN_TOKEN`)
    #[arg(long)]
    pub admin_token: Option<String>,

    /// Storefront API access token (or `SHOPIFY_STOREFRONT_TOKEN`)
    #[arg(long)]
    pub storefront_token: Option<String>,

    /// Use the unauthenticated direct proxy
    #[arg(long)]
    pub use_direct_proxy: bool,
}

impl VersionsArgs {
    fn auth(&self) -> AuthConfig {
        AuthConfig {
            shop: self.shop.clone(),
            admin_token: self.admin_token.clone(),
            storefront_token: self.storefront_token.clone(),
            use_direct_proxy: self.use_direct_proxy,
        }
        .with_env_tokens()
    }
}

#[tracing::instrument(skip_all, fields(api = %args.api))]
pub async fn run(args: &VersionsArgs, output_opts: OutputOptions) -> Result<ExitCode> {
    let auth = args.auth();
    auth.validate(args.api)?;

    let spinner = progress::spinner("Fetching API versions...", output_opts.show_progress);
    let versions = HttpFetcher::new(auth)
        .available_versions(args.api)
        .await
        .context("Failed to fetch versions")?;
    spinner.finish_and_clear();

    println!();
    println!(
        "{}",
        format!("Available {} API Versions:", args.api.title()).bold()
    );
    println!();
    for version in &versions {
        let status = if version.supported {
            "✓ Supported".green()
        } else {
            "⚠ Unsupported".yellow()
        };
        println!(
            "  {:12} {:20} {status}",
            version.handle, version.display_name
        );
    }
    println!();

    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_from_flags() {
        let args = VersionsArgs {
            api: ApiKind::Storefront,
            shop: Some("myshop".to_string()),
            storefront_token: Some("sf".to_string()),
            ..VersionsArgs::default()
        };
        let auth = args.auth();
        assert_eq!(
            auth.endpoint(ApiKind::Storefront, "2025-01").unwrap(),
            "https://myshop.myshopify.com/api/2025-01/graphql.json"
        );
        assert!(auth.validate(ApiKind::Storefront).is_ok());
    }

    #[test]
    fn test_direct_proxy_needs_no_credentials() {
        let args = VersionsArgs {
            use_direct_proxy: true,
            ..VersionsArgs::default()
        };
        assert!(args.auth().validate(ApiKind::Admin).is_ok());
    }
}
