use hospital::{app, db, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    hospital::init_tracing();

    let app_state = AppState::init().await?;

    db::MIGRATOR.run(app_state.db.pool()).await?;
    tracing::info!(database = %app_state.config.database_url, "schema up to date");

    app::serve(app::build_app(app_state)).await
}
