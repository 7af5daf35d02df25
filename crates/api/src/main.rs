use anyhow::Context;

use voucherdesk_infra::{build_services, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    voucherdesk_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = build_services(&config).await?;
    let app = voucherdesk_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!(profile = %config.profile, "listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
