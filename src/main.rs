use dekanat::{
    config::{self, database},
    core::{semester, settings},
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the first settings row from config if none exists
    match settings::ensure_settings(&db, app_config.load_defaults.clone()).await? {
        Some(active) => info!(settings_id = active.id, "Active load settings loaded."),
        None => warn!("Load settings exist but none is active; built-in defaults apply."),
    }

    // 6. Check whether the planning term flag still matches the calendar
    let today = chrono::Local::now().date_naive();
    if let Some(suggestion) = semester::suggest_planning_semester(&db, today).await? {
        warn!(
            current = suggestion.current.as_ref().map(|s| s.code.as_str()),
            suggested = %suggestion.suggested.code,
            "Planning term looks outdated; an administrator should move it."
        );
    } else {
        info!("Planning term matches the calendar.");
    }

    info!(
        allow_empty_submission = app_config.workflow.allow_empty_submission,
        single_active_phase = app_config.workflow.single_active_phase,
        "Startup checks complete."
    );
    Ok(())
}
