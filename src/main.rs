mod telemetry;

use reminders_api::Application;
use reminders_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("reminders".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context()?;

    let _app = Application::new(context).await;
    info!("Reminder scheduler started");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down, pending reminders are dropped");

    Ok(())
}
