use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::artifact::ModelState;
use crate::handler::{home, predict_demand, predict_patient};
use crate::weather::WeatherClient;

#[derive(Clone)]
pub struct AppState {
    pub models: Arc<ModelState>,
    pub weather: WeatherClient,
}

pub fn create_router(app_state: AppState) -> Router {
    // Fully open cross-origin access: the dashboard is served from
    // arbitrary hosts and talks to this API directly.
    Router::new()
        .route("/", get(home))
        .route("/predict_patient", post(predict_patient))
        .route("/predict_demand", post(predict_demand))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
