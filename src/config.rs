use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    /// Base URL prefixed to generated thumbnail/download links. Empty means
    /// relative links (`/api/download/...`).
    pub public_base_url: String,
    /// Cover image used when a category has no cover candidate.
    pub placeholder_image: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Coloring-page catalog over a flat object store")]
pub struct Args {
    /// Host to bind to (overrides COLORING_CATALOG_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides COLORING_CATALOG_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where payloads are stored (overrides COLORING_CATALOG_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides COLORING_CATALOG_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Public base URL for generated links (overrides COLORING_CATALOG_PUBLIC_BASE_URL)
    #[arg(long)]
    pub public_base_url: Option<String>,

    /// Placeholder cover image path (overrides COLORING_CATALOG_PLACEHOLDER_IMAGE)
    #[arg(long)]
    pub placeholder_image: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("COLORING_CATALOG_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("COLORING_CATALOG_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing COLORING_CATALOG_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading COLORING_CATALOG_PORT"),
        };
        let env_storage =
            env::var("COLORING_CATALOG_STORAGE_DIR").unwrap_or_else(|_| "./data/objects".into());
        let env_db = env::var("COLORING_CATALOG_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/catalog.db".into());
        let env_public_base =
            env::var("COLORING_CATALOG_PUBLIC_BASE_URL").unwrap_or_else(|_| String::new());
        let env_placeholder = env::var("COLORING_CATALOG_PLACEHOLDER_IMAGE")
            .unwrap_or_else(|_| "/assets/placeholder.png".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
            public_base_url: args.public_base_url.unwrap_or(env_public_base),
            placeholder_image: args.placeholder_image.unwrap_or(env_placeholder),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
