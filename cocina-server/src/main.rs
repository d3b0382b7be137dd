use anyhow::{Context, Result};
use clap::Parser;
use cocina::plan::{plan_detail_pages, PathStrategy};
use cocina_server::{app, config::Config, AppState};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// The address and optionally port to bind to
    #[clap(long, default_value = "0.0.0.0:3000")]
    address: String,

    /// Whether to use HTTPS / TLS
    #[clap(long)]
    tls: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Loading configuration")?;

    // initialize tracing
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "access.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args = Args::parse();

    // connect to the CMS and decide which detail pages exist up front
    let source = cocina::cms::connect(&config.cms);
    let plan = plan_detail_pages(source.as_ref(), config.page_strategy, config.revalidate).await;
    let state = AppState::new(source, plan, &config.site_url);
    if config.page_strategy == PathStrategy::Eager {
        state.prerender().await.context("Prerendering recipe pages")?;
    }

    let app = app(state);

    // In development, use HTTP. In production, use HTTPS.
    if args.tls {
        let tls = config
            .tls
            .context("--tls needs TLS_CERT_PATH and TLS_KEY_PATH")?;
        rustls::crypto::ring::default_provider()
            .install_default()
            .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;
        let tls_config =
            axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .context("Loading TLS certificate")?;

        let addr = args.address.parse()?;
        tracing::info!("Listening on {}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .context("Starting TLS server")?;
    } else {
        let listener = tokio::net::TcpListener::bind(&args.address).await?;
        tracing::info!("Listening on {}", args.address);
        axum::serve(listener, app).await?;
    }
    Ok(())
}
