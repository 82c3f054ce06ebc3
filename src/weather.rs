//! Live weather and air-quality adapter.
//!
//! Two sequential provider calls per reading: general weather, then air
//! pollution. Any failure anywhere in the sequence degrades to a fixed
//! simulated snapshot; callers always get a usable reading.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::model::WeatherSnapshot;

/// Santo Domingo, metro reference point.
pub const LAT: f64 = 18.4861;
pub const LON: f64 = -69.9312;

const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const DEFAULT_AIR_URL: &str = "http://api.openweathermap.org/data/2.5/air_pollution";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("air pollution report is empty")]
    EmptyAirReport,

    #[error("air quality category {0} outside the provider's 1-5 range")]
    AqiOutOfRange(i64),
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: WeatherMain,
    wind: WeatherWind,
}

#[derive(Debug, Deserialize)]
struct WeatherMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct AirPollution {
    list: Vec<AirEntry>,
}

#[derive(Debug, Deserialize)]
struct AirEntry {
    main: AirMain,
    components: AirComponents,
}

#[derive(Debug, Deserialize)]
struct AirMain {
    aqi: i64,
}

#[derive(Debug, Deserialize)]
struct AirComponents {
    pm2_5: f64,
    pm10: f64,
    no2: f64,
    so2: f64,
    co: f64,
    o3: f64,
}

/// Maps the provider's 1-5 air quality category to the label the demand
/// model was trained on. Anything else reads as "Moderate".
pub fn aqi_status(category: i64) -> &'static str {
    match category {
        1 => "Good",
        2 => "Fair",
        3 => "Moderate",
        4 => "Poor",
        5 => "Very Poor",
        _ => "Moderate",
    }
}

#[derive(Clone)]
pub struct WeatherClient {
    http: Client,
    weather_url: String,
    air_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_urls(api_key, DEFAULT_WEATHER_URL, DEFAULT_AIR_URL)
    }

    /// Create with custom provider endpoints.
    pub fn with_urls(api_key: &str, weather_url: &str, air_url: &str) -> Self {
        Self {
            http: Client::new(),
            weather_url: weather_url.to_string(),
            air_url: air_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch the current reading for the fixed coordinates. Never fails:
    /// when the provider is unreachable or the payload is unusable, the
    /// cause is logged and the fixed simulated snapshot is returned.
    pub async fn current(&self) -> WeatherSnapshot {
        match self.fetch_live().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "weather provider failed, using simulated reading");
                WeatherSnapshot::simulated()
            }
        }
    }

    async fn fetch_live(&self) -> Result<WeatherSnapshot, WeatherError> {
        let weather_url = format!(
            "{}?lat={}&lon={}&appid={}&units=metric",
            self.weather_url, LAT, LON, self.api_key
        );
        let weather: CurrentWeather = self
            .http
            .get(&weather_url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let air_url = format!(
            "{}?lat={}&lon={}&appid={}",
            self.air_url, LAT, LON, self.api_key
        );
        let air: AirPollution = self
            .http
            .get(&air_url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        live_snapshot(weather, air)
    }
}

fn live_snapshot(weather: CurrentWeather, air: AirPollution) -> Result<WeatherSnapshot, WeatherError> {
    let entry = air.list.first().ok_or(WeatherError::EmptyAirReport)?;

    // The category drives both the label and the display-scale index, so
    // a value outside 1-5 makes the whole reading unusable.
    let category = entry.main.aqi;
    if !(1..=5).contains(&category) {
        return Err(WeatherError::AqiOutOfRange(category));
    }

    Ok(WeatherSnapshot {
        temperature: weather.main.temp,
        humidity: weather.main.humidity,
        wind_speed: weather.wind.speed,
        pm25: entry.components.pm2_5,
        pm10: entry.components.pm10,
        no2: entry.components.no2,
        so2: entry.components.so2,
        co: entry.components.co,
        o3: entry.components.o3,
        aqi: (category * 20) as f64,
        status: aqi_status(category).to_string(),
        is_simulated: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_payload() -> CurrentWeather {
        serde_json::from_str(
            r#"{"main": {"temp": 29.4, "humidity": 81.0}, "wind": {"speed": 9.3}}"#,
        )
        .unwrap()
    }

    fn air_payload(aqi: i64) -> AirPollution {
        serde_json::from_str(&format!(
            r#"{{"list": [{{"main": {{"aqi": {aqi}}},
                "components": {{"pm2_5": 11.2, "pm10": 24.0, "no2": 8.5,
                                "so2": 3.1, "co": 0.6, "o3": 30.2}}}}]}}"#,
        ))
        .unwrap()
    }

    #[test]
    fn category_labels_match_training_vocabulary() {
        assert_eq!(aqi_status(1), "Good");
        assert_eq!(aqi_status(2), "Fair");
        assert_eq!(aqi_status(3), "Moderate");
        assert_eq!(aqi_status(4), "Poor");
        assert_eq!(aqi_status(5), "Very Poor");
    }

    #[test]
    fn live_snapshot_scales_every_category_by_twenty() {
        for category in 1..=5 {
            let snapshot = live_snapshot(weather_payload(), air_payload(category)).unwrap();
            assert_eq!(snapshot.aqi, (category * 20) as f64);
            assert_eq!(snapshot.status, aqi_status(category));
            assert!(!snapshot.is_simulated);
        }
    }

    #[test]
    fn live_snapshot_copies_provider_fields() {
        let snapshot = live_snapshot(weather_payload(), air_payload(2)).unwrap();
        assert_eq!(snapshot.temperature, 29.4);
        assert_eq!(snapshot.humidity, 81.0);
        assert_eq!(snapshot.wind_speed, 9.3);
        assert_eq!(snapshot.pm25, 11.2);
        assert_eq!(snapshot.pm10, 24.0);
        assert_eq!(snapshot.no2, 8.5);
        assert_eq!(snapshot.so2, 3.1);
        assert_eq!(snapshot.co, 0.6);
        assert_eq!(snapshot.o3, 30.2);
        assert_eq!(snapshot.status, "Fair");
    }

    #[test]
    fn out_of_range_category_is_rejected() {
        for category in [0, 6, -1, 42] {
            let result = live_snapshot(weather_payload(), air_payload(category));
            assert!(matches!(result, Err(WeatherError::AqiOutOfRange(c)) if c == category));
        }
    }

    #[test]
    fn empty_air_report_is_rejected() {
        let air: AirPollution = serde_json::from_str(r#"{"list": []}"#).unwrap();
        let result = live_snapshot(weather_payload(), air);
        assert!(matches!(result, Err(WeatherError::EmptyAirReport)));
    }

    #[test]
    fn simulated_snapshot_uses_fixed_fallback_values() {
        let snapshot = WeatherSnapshot::simulated();
        assert_eq!(snapshot.temperature, 31.0);
        assert_eq!(snapshot.humidity, 78.0);
        assert_eq!(snapshot.wind_speed, 12.0);
        assert_eq!(snapshot.pm25, 15.0);
        assert_eq!(snapshot.pm10, 35.0);
        assert_eq!(snapshot.no2, 12.0);
        assert_eq!(snapshot.so2, 5.0);
        assert_eq!(snapshot.co, 0.8);
        assert_eq!(snapshot.o3, 25.0);
        assert_eq!(snapshot.aqi, 60.0);
        assert_eq!(snapshot.status, "Moderate");
        assert!(snapshot.is_simulated);
    }

    #[tokio::test]
    async fn unreachable_provider_falls_back_to_simulation() {
        // Nothing listens on the discard port, so the first call fails fast.
        let client = WeatherClient::with_urls(
            "test-key",
            "http://127.0.0.1:9/weather",
            "http://127.0.0.1:9/air_pollution",
        );
        let snapshot = client.current().await;
        assert_eq!(snapshot, WeatherSnapshot::simulated());
    }
}
