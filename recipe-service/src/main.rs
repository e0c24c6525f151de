use recipe_service::{config::RecipeConfig, services::init_metrics, Application};
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RecipeConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;
    init_metrics()?;

    tracing::info!(
        environment = ?config.environment,
        version = %config.service_version,
        "Starting {}",
        config.service_name
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
