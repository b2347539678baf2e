use creaming::app;
use creaming::config::Config;

/// Main entry point for the web application
///
/// Usage: `website [addr] [static_dir]`. Logging is controlled by `RUST_LOG`
/// and defaults to `info`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_args(std::env::args().skip(1));
    app::run(config).await
}
