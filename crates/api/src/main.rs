use std::net::SocketAddr;

use natours_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    natours_observability::init();

    let config = AppConfig::from_env()?;
    let app = natours_api::app::build_app(&config);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

    tracing::info!(
        addr = %listener.local_addr()?,
        mode = config.mode.as_str(),
        "listening"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
