use std::env;
use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use prohosp_api::app::{self, AppState};
use prohosp_api::artifact::ModelState;
use prohosp_api::weather::WeatherClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let api_key =
        env::var("OPENWEATHER_API_KEY").expect("missing OPENWEATHER_API_KEY environment variable");
    let model_dir = env::var("MODEL_DIR").unwrap_or_else(|_| "models".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8000);

    let models = ModelState::load(&PathBuf::from(model_dir));

    let state = AppState {
        models: Arc::new(models),
        weather: WeatherClient::new(&api_key),
    };

    let app = app::create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
