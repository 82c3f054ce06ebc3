use serde::{Deserialize, Serialize};

/// Environmental reading attached to a demand prediction. `aqi` carries the
/// provider's 1-5 category scaled x20 for display; `is_simulated` tells the
/// caller whether the values came from the provider or from the fallback.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub so2: f64,
    pub co: f64,
    pub o3: f64,
    pub aqi: f64,
    pub status: String,
    pub is_simulated: bool,
}

impl WeatherSnapshot {
    /// Long-run Santo Domingo averages, served whenever the provider is
    /// unreachable or returns something unusable.
    pub fn simulated() -> Self {
        Self {
            temperature: 31.0,
            humidity: 78.0,
            wind_speed: 12.0,
            pm25: 15.0,
            pm10: 35.0,
            no2: 12.0,
            so2: 5.0,
            co: 0.8,
            o3: 25.0,
            aqi: 60.0,
            status: "Moderate".to_string(),
            is_simulated: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PatientPrediction {
    pub estancia_estimada: f64,
    pub riesgo_bloqueo: i32,
    pub mensaje: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DemandPrediction {
    pub fecha: String,
    pub admisiones_respiratorias_esperadas: f64,
    pub clima_usado: WeatherSnapshot,
}
