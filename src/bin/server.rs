use std::{
    env::{self},
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use makeup_inventory::{
    AdviceClient, AppState, build_router, graceful_shutdown,
    image_ingest::{DEFAULT_MAX_EDGE, ImageIngestor},
    logging_middleware,
    persistence::{StorageConfig, connect},
};

/// The web server for the makeup inventory.
///
/// Without `--db-path` the app runs in demo mode and keeps everything in
/// `--data-dir`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite document database. Enables remote mode.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Directory for the key-value files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// File path to an SSL certificate `cert.pem` and key `key.pem`.
    #[arg(long)]
    cert_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// URL of the AI text service used by the beauty advisor.
    #[arg(long)]
    advisor_url: Option<String>,

    /// The longest edge, in pixels, of stored photos.
    #[arg(long, default_value_t = DEFAULT_MAX_EDGE)]
    max_image_edge: u32,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(error) = setup_logging() {
        eprintln!("Could not set up logging: {error}");
        return ExitCode::FAILURE;
    }

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let tls_config = match RustlsConfig::from_pem_file(
        PathBuf::from(&args.cert_path).join("cert.pem"),
        PathBuf::from(&args.cert_path).join("key.pem"),
    )
    .await
    {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Could not open TLS certificates: {error}");
            return ExitCode::FAILURE;
        }
    };

    let Ok(secret) = env::var("SECRET") else {
        tracing::error!("The environment variable 'SECRET' must be set");
        return ExitCode::FAILURE;
    };

    let backends = match connect(&StorageConfig {
        db_path: args.db_path,
        data_dir: args.data_dir,
    }) {
        Ok(backends) => backends,
        Err(error) => {
            tracing::error!("Could not open storage: {error}");
            return ExitCode::FAILURE;
        }
    };

    let advisor = match args.advisor_url {
        Some(url) => AdviceClient::new(url),
        None => {
            tracing::info!("No advisor URL given, the beauty advisor is disabled.");
            AdviceClient::disabled()
        }
    };

    let app_state = AppState::new(
        backends,
        &secret,
        ImageIngestor::with_max_edge(args.max_image_edge),
        advisor,
    );

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(app_state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTPS server listening on {}", addr);
    if let Err(error) = axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("The server stopped with an error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn setup_logging() -> Result<(), std::io::Error> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
