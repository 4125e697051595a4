//! Column names of the two CMS source tables.

pub const FACILITY_ID: &str = "Facility ID";
pub const FACILITY_NAME: &str = "Facility Name";
pub const STATE: &str = "State";
pub const MEASURE_NAME: &str = "Measure Name";
pub const SCORE: &str = "Score";
pub const DENOMINATOR: &str = "Denominator";
pub const NUMBER_OF_PATIENTS: &str = "Number of Patients";
pub const NUMBER_OF_PATIENTS_RETURNED: &str = "Number of Patients Returned";
pub const LOWER_ESTIMATE: &str = "Lower Estimate";
pub const HIGHER_ESTIMATE: &str = "Higher Estimate";
pub const COMPARED_TO_NATIONAL: &str = "Compared to National";

/// Hospital table columns coerced to `Float64`.
pub const HOSPITAL_NUMERIC_COLUMNS: [&str; 6] = [
    SCORE,
    DENOMINATOR,
    NUMBER_OF_PATIENTS,
    NUMBER_OF_PATIENTS_RETURNED,
    LOWER_ESTIMATE,
    HIGHER_ESTIMATE,
];

/// Hospital table columns that must be present in the CSV header.
pub const HOSPITAL_REQUIRED_COLUMNS: [&str; 4] = [FACILITY_ID, FACILITY_NAME, STATE, MEASURE_NAME];

/// State table columns that must be present in the CSV header.
pub const STATE_REQUIRED_COLUMNS: [&str; 2] = [STATE, MEASURE_NAME];

/// Textual markers CMS uses for a missing value.
pub const MISSING_SENTINELS: [&str; 7] = [
    "Not Available",
    "Not Applicable",
    "NA",
    "",
    "Too Few to Report",
    "Number of Cases Too Small",
    "Number of cases too small",
];

/// Whether a raw cell is one of the missing-value markers.
pub fn is_missing_sentinel(raw: &str) -> bool {
    let trimmed = raw.trim();
    MISSING_SENTINELS.iter().any(|s| *s == trimmed)
}
