use bazaar::api;
use bazaar::logger::*;
use bazaar::server::*;
use bazaar::settings::*;
use std::fs;
use std::sync::Arc;
use tokio::signal;
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::bootstrap();

    let settings = parse_settings(cli.settings.as_deref())?;
    logger.set_filter(&settings.log.filter)?;
    info!(
        address = %settings.http.address,
        store = %settings.store.backend,
        member = %settings.member.backend,
        local_signup = settings.auth.local_signup,
        "starting"
    );

    let address: std::net::SocketAddr = settings.http.address.parse()?;
    if !fs::metadata(&settings.http.cert_path)?.is_file() {
        return Err(anyhow::anyhow!(
            "TLS cert is not a regular file: {:?}",
            settings.http.cert_path
        ));
    }
    if !fs::metadata(&settings.http.key_path)?.is_file() {
        return Err(anyhow::anyhow!(
            "TLS key is not a regular file: {:?}",
            settings.http.key_path
        ));
    }

    let server = Arc::new(Server::try_new(&settings).await?);

    let api_v1 = warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes(server.clone()))
        .recover(api::v1::recover_error);

    warp::serve(api_v1)
        .tls()
        .cert_path(settings.http.cert_path.clone())
        .key_path(settings.http.key_path.clone())
        .bind_with_graceful_shutdown(address, async {
            signal::ctrl_c().await.expect("Could not register SIGINT");
        })
        .1
        .await;

    let shutdown_timeout = std::time::Duration::from_secs(30);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => tracing::info!("server shutdown successfully"),
        Err(_) => tracing::error!("server shutdown timed out"),
    }

    Ok(())
}
