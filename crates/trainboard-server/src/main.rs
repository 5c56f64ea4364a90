//! Standalone server binary; `tb serve` offers the same with more options.

use tracing_subscriber::EnvFilter;

use trainboard_server::{serve, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = match std::env::var_os("TRAINBOARD_CONFIG") {
        Some(path) => ServerConfig::from_yaml_file(path.as_ref())?,
        None => ServerConfig::default(),
    };
    serve(config).await
}
