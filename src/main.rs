use mail_lane::{http_server, AppConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mail_lane=info,mail_lane_receiver=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    config.receiver.validate()?;

    let (addr, server) = http_server::start(&config.receiver).await?;
    tracing::info!(%addr, history = config.receiver.recent_events, "receiver started");

    tokio::select! {
        _ = server => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }
    Ok(())
}
