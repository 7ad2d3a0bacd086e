use anyhow::Context;
use bookapi_app::Application;
use bookapi_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load bookapi settings")?;
    bookapi_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookapi bootstrap starting"
    );

    let app = Application::start(settings).await?;
    tracing::info!("bookapi bootstrap complete");
    app.serve().await
}
