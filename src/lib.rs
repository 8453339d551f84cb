pub mod api; // HTTP routes, middleware, server lifecycle
pub mod config;
pub mod models;
pub mod pipeline; // Encoding, prediction, attribution, narration

use tracing_subscriber::EnvFilter;

pub fn run() {
    // A missing .env file is normal in production.
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let service_config = match config::ServiceConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Built before the runtime starts: the narrator owns a blocking client.
    let ctx = match api::server::build_context(&service_config) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Startup failed: {e}");
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("error while building tokio runtime");

    if let Err(e) = runtime.block_on(api::server::serve(ctx, &service_config)) {
        tracing::error!("Server failed: {e}");
        std::process::exit(1);
    }
}
