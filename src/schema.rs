use serde::Deserialize;

/// One admission record, keyed exactly like the training data. The JSON
/// surface keeps the capitalized column names the models were fitted on.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientInput {
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Ward_Type")]
    pub ward_type: String,
    #[serde(rename = "Ward_Facility")]
    pub ward_facility: String,
    #[serde(rename = "Type_of_Admission")]
    pub type_of_admission: String,
    #[serde(rename = "Illness_Severity")]
    pub illness_severity: String,
    #[serde(rename = "Age")]
    pub age: String,
    #[serde(rename = "Hospital_type")]
    pub hospital_type: i64,
    #[serde(rename = "Hospital_city")]
    pub hospital_city: i64,
    #[serde(rename = "Hospital_region")]
    pub hospital_region: i64,
    #[serde(rename = "Available_Extra_Rooms_in_Hospital")]
    pub available_extra_rooms_in_hospital: i64,
    #[serde(rename = "Bed_Grade")]
    pub bed_grade: f64,
    #[serde(rename = "Patient_Visitors")]
    pub patient_visitors: i64,
    #[serde(rename = "City_Code_Patient")]
    pub city_code_patient: f64,
    #[serde(rename = "Admission_Deposit")]
    pub admission_deposit: f64,
}

/// A single calendar date, formatted YYYY-MM-DD.
#[derive(Debug, Clone, Deserialize)]
pub struct DemandRequest {
    pub date: String,
}
