//! Feature assembly: turns validated request data into the single-row
//! frames the estimators were fitted on.

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;

use crate::model::WeatherSnapshot;
use crate::schema::PatientInput;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error(transparent)]
    Frame(#[from] PolarsError),
}

/// Training epoch for the demand model's day-offset feature. Must stay in
/// lockstep with the date the model was fitted against.
fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).expect("fixed reference date")
}

/// Days between `date` and the training reference date.
pub fn day_offset(date: &str) -> Result<i64, AssembleError> {
    let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| AssembleError::InvalidDate(date.to_string()))?;
    Ok((parsed - reference_date()).num_days())
}

/// Single-row frame for the stay and bed-block models. The column list is
/// the static field-to-feature mapping: every name matches the training
/// columns, with `Type_of_Admission` exposed as "Type of Admission".
pub fn patient_frame(input: &PatientInput) -> Result<DataFrame, AssembleError> {
    let df = DataFrame::new(vec![
        Series::new("Department", [input.department.as_str()]),
        Series::new("Ward_Type", [input.ward_type.as_str()]),
        Series::new("Ward_Facility", [input.ward_facility.as_str()]),
        Series::new("Type of Admission", [input.type_of_admission.as_str()]),
        Series::new("Illness_Severity", [input.illness_severity.as_str()]),
        Series::new("Age", [input.age.as_str()]),
        Series::new("Hospital_type", [input.hospital_type]),
        Series::new("Hospital_city", [input.hospital_city]),
        Series::new("Hospital_region", [input.hospital_region]),
        Series::new(
            "Available_Extra_Rooms_in_Hospital",
            [input.available_extra_rooms_in_hospital],
        ),
        Series::new("Bed_Grade", [input.bed_grade]),
        Series::new("Patient_Visitors", [input.patient_visitors]),
        Series::new("City_Code_Patient", [input.city_code_patient]),
        Series::new("Admission_Deposit", [input.admission_deposit]),
    ])?;
    Ok(df)
}

/// Single-row frame for the demand model: the requested date crossed with
/// the weather reading. The raw date is replaced by its numeric offset
/// from the reference date; the model never sees the date itself.
pub fn demand_frame(date: &str, weather: &WeatherSnapshot) -> Result<DataFrame, AssembleError> {
    let offset = day_offset(date)?;

    let mut df = DataFrame::new(vec![
        Series::new("date", [date]),
        Series::new("AQI", [weather.aqi]),
        Series::new("PM2.5", [weather.pm25]),
        Series::new("PM10", [weather.pm10]),
        Series::new("NO2", [weather.no2]),
        Series::new("SO2", [weather.so2]),
        Series::new("CO", [weather.co]),
        Series::new("O3", [weather.o3]),
        Series::new("temperature", [weather.temperature]),
        Series::new("humidity", [weather.humidity]),
        Series::new("wind_speed", [weather.wind_speed]),
        Series::new("AirQuality_Status", [weather.status.as_str()]),
    ])?;

    df.with_column(Series::new("date_num", [offset]))?;
    let df = df.drop("date")?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_patient() -> PatientInput {
        PatientInput {
            department: "gynecology".to_string(),
            ward_type: "R".to_string(),
            ward_facility: "F".to_string(),
            type_of_admission: "Trauma".to_string(),
            illness_severity: "Extreme".to_string(),
            age: "41-50".to_string(),
            hospital_type: 2,
            hospital_city: 5,
            hospital_region: 1,
            available_extra_rooms_in_hospital: 3,
            bed_grade: 2.0,
            patient_visitors: 4,
            city_code_patient: 7.0,
            admission_deposit: 4911.0,
        }
    }

    #[test]
    fn day_offset_counts_from_reference_date() {
        assert_eq!(day_offset("2023-01-01").unwrap(), 0);
        assert_eq!(day_offset("2023-01-11").unwrap(), 10);
        assert_eq!(day_offset("2024-01-01").unwrap(), 365);
        assert_eq!(day_offset("2022-12-31").unwrap(), -1);
    }

    #[test]
    fn day_offset_rejects_malformed_dates() {
        for bad in ["11-01-2023", "2023/01/11", "not-a-date", ""] {
            assert!(matches!(
                day_offset(bad),
                Err(AssembleError::InvalidDate(_))
            ));
        }
    }

    #[test]
    fn patient_frame_renames_admission_type() {
        let df = patient_frame(&sample_patient()).unwrap();
        assert_eq!(df.height(), 1);
        assert!(df.column("Type of Admission").is_ok());
        assert!(df.column("Type_of_Admission").is_err());
    }

    #[test]
    fn patient_frame_keeps_training_columns() {
        let df = patient_frame(&sample_patient()).unwrap();
        assert_eq!(
            df.get_column_names(),
            vec![
                "Department",
                "Ward_Type",
                "Ward_Facility",
                "Type of Admission",
                "Illness_Severity",
                "Age",
                "Hospital_type",
                "Hospital_city",
                "Hospital_region",
                "Available_Extra_Rooms_in_Hospital",
                "Bed_Grade",
                "Patient_Visitors",
                "City_Code_Patient",
                "Admission_Deposit",
            ]
        );
    }

    #[test]
    fn demand_frame_swaps_date_for_numeric_offset() {
        let df = demand_frame("2023-01-11", &WeatherSnapshot::simulated()).unwrap();
        assert_eq!(df.height(), 1);
        assert!(df.column("date").is_err());
        let offset = df.column("date_num").unwrap().i64().unwrap().get(0);
        assert_eq!(offset, Some(10));
    }

    #[test]
    fn demand_frame_carries_the_weather_reading() {
        let weather = WeatherSnapshot::simulated();
        let df = demand_frame("2023-03-15", &weather).unwrap();
        assert_eq!(
            df.column("AQI").unwrap().f64().unwrap().get(0),
            Some(weather.aqi)
        );
        assert_eq!(
            df.column("PM2.5").unwrap().f64().unwrap().get(0),
            Some(weather.pm25)
        );
        assert_eq!(
            df.column("AirQuality_Status").unwrap().utf8().unwrap().get(0),
            Some(weather.status.as_str())
        );
    }

    #[test]
    fn demand_frame_rejects_bad_dates() {
        let result = demand_frame("15-03-2023", &WeatherSnapshot::simulated());
        assert!(matches!(result, Err(AssembleError::InvalidDate(_))));
    }
}
