use axum::http::StatusCode;
use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use serde_json::Value;
use thiserror::Error;

use crate::app::AppState;
use crate::artifact::{ModelRegistry, ModelState, PredictError};
use crate::features::{self, AssembleError};
use crate::model::{DemandPrediction, PatientPrediction, WeatherSnapshot};
use crate::schema::{DemandRequest, PatientInput};

const RISK_MESSAGE: &str = "ALERTA: Paciente de Larga Estancia";
const STANDARD_MESSAGE: &str = "Estancia Standard";

/// Anything that can go wrong between a validated body and a prediction.
/// Surfaced to the caller as a client error with the cause text.
#[derive(Error, Debug)]
enum PredictionError {
    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error(transparent)]
    Model(#[from] PredictError),
}

pub async fn home() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "online",
        "system": "Hospital Demand Predictor v3.1",
    }))
}

pub async fn predict_patient(
    State(state): State<AppState>,
    Json(payload): Json<PatientInput>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let ModelState::Ready(registry) = state.models.as_ref() else {
        return Err(models_unavailable());
    };

    let prediction = patient_prediction(registry, &payload)
        .map_err(|e| bad_request(format!("Error en datos: {e}")))?;

    Ok(Json(prediction))
}

pub async fn predict_demand(
    State(state): State<AppState>,
    Json(payload): Json<DemandRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let ModelState::Ready(registry) = state.models.as_ref() else {
        return Err(models_unavailable());
    };

    // Real or simulated, never an error.
    let weather = state.weather.current().await;

    let prediction = demand_prediction(registry, &payload.date, weather)
        .map_err(|e| bad_request(format!("Error procesando demanda: {e}")))?;

    Ok(Json(prediction))
}

fn patient_prediction(
    registry: &ModelRegistry,
    payload: &PatientInput,
) -> Result<PatientPrediction, PredictionError> {
    let frame = features::patient_frame(payload)?;

    // Both estimators consume the same row.
    let stay = registry.stay.predict(&frame)?;
    let risk = registry.block.predict(&frame)?;

    let mensaje = if risk == 1 {
        RISK_MESSAGE
    } else {
        STANDARD_MESSAGE
    };

    Ok(PatientPrediction {
        estancia_estimada: stay,
        riesgo_bloqueo: risk,
        mensaje: mensaje.to_string(),
    })
}

fn demand_prediction(
    registry: &ModelRegistry,
    date: &str,
    weather: WeatherSnapshot,
) -> Result<DemandPrediction, PredictionError> {
    let frame = features::demand_frame(date, &weather)?;
    let expected = registry.demand.predict(&frame)?;

    Ok(DemandPrediction {
        fecha: date.to_string(),
        admisiones_respiratorias_esperadas: expected,
        clima_usado: weather,
    })
}

fn models_unavailable() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"detail": "Modelos no cargados"})),
    )
}

fn bad_request(detail: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"detail": detail})),
    )
}
