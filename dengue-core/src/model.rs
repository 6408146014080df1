use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

/// Cities offered by the location prompt, the predict form and the forecast panel.
pub const METRO_CITIES: [&str; 10] = [
    "Delhi",
    "Mumbai",
    "Chennai",
    "Kolkata",
    "Bangalore",
    "Hyderabad",
    "Pune",
    "Ahmedabad",
    "Jaipur",
    "Lucknow",
];

pub const DEFAULT_CITY: &str = "Delhi";

/// State selector options for the historical panel. The first entry is the
/// nationwide sentinel.
pub const INDIAN_STATES: [&str; 30] = [
    "All",
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Delhi",
];

const ALL_STATES: &str = "All";

pub fn is_metro_city(city: &str) -> bool {
    METRO_CITIES.contains(&city)
}

/// Years offered by the forecast panel: two back, four ahead.
pub fn forecast_years(current_year: i32) -> Vec<i32> {
    (current_year - 2..=current_year + 4).collect()
}

pub fn current_year() -> i32 {
    Local::now().year()
}

/// Risk classification returned by the prediction service.
///
/// `Unknown` is emitted by the yearly forecast when the server has no model
/// loaded; any other label fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::Unknown => "Unknown",
        }
    }

    /// Y value on the yearly trend chart.
    pub fn score(&self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Moderate => 2,
            RiskLevel::High => 3,
            RiskLevel::Unknown => 0,
        }
    }

    pub fn abbrev(&self) -> &'static str {
        &self.as_str()[..3]
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Styling hint attached to a risk result. Unrecognised values are kept
/// verbatim so the view layer can fall back to a neutral style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskColor {
    Red,
    Yellow,
    Green,
    Other(String),
}

impl RiskColor {
    pub fn as_str(&self) -> &str {
        match self {
            RiskColor::Red => "red",
            RiskColor::Yellow => "yellow",
            RiskColor::Green => "green",
            RiskColor::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for RiskColor {
    fn from(value: String) -> Self {
        match value.as_str() {
            "red" => RiskColor::Red,
            "yellow" => RiskColor::Yellow,
            "green" => RiskColor::Green,
            _ => RiskColor::Other(value),
        }
    }
}

impl From<&str> for RiskColor {
    fn from(value: &str) -> Self {
        RiskColor::from(value.to_string())
    }
}

impl From<RiskColor> for String {
    fn from(value: RiskColor) -> Self {
        match value {
            RiskColor::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// Calendar month, 1 through 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Month(u8);

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl Month {
    pub fn new(value: u8) -> Option<Self> {
        (1..=12).contains(&value).then_some(Month(value))
    }

    pub fn current() -> Self {
        // chrono guarantees 1..=12
        Month(Local::now().month() as u8)
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[usize::from(self.0 - 1)]
    }

    pub fn short_name(&self) -> &'static str {
        &self.name()[..3]
    }

    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12).map(Month)
    }
}

impl TryFrom<u8> for Month {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Month::new(value).ok_or_else(|| format!("month must be between 1 and 12, got {value}"))
    }
}

impl From<Month> for u8 {
    fn from(value: Month) -> Self {
        value.0
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Risk verdict shared by the live-weather and predict endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub color: RiskColor,
}

/// Current conditions for the user's city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub description: String,
    pub city: String,
    pub month: Month,
}

/// Decoded `/api/live-weather` response.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveWeather {
    pub assessment: RiskAssessment,
    pub weather: WeatherSnapshot,
    /// False when the server fell back to seasonal estimates.
    pub is_live: bool,
}

/// Body of `POST /api/predict-city`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionRequest {
    pub city: String,
    pub month: Month,
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self { city: DEFAULT_CITY.to_string(), month: Month::current() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub color: RiskColor,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
}

/// One month of a yearly forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyForecastEntry {
    /// Short label as sent by the server, e.g. "Jan".
    pub month: String,
    pub month_num: Option<Month>,
    pub year: Option<i32>,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub risk_level: RiskLevel,
    pub risk_color: RiskColor,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub year: i32,
    pub cases: u64,
    pub deaths: u64,
}

/// Historical-cases scope: nationwide or a single state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StateFilter {
    #[default]
    All,
    Named(String),
}

impl StateFilter {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ALL_STATES {
            StateFilter::All
        } else {
            StateFilter::Named(trimmed.to_string())
        }
    }

    /// Value for the `state` query parameter, if any.
    pub fn query_value(&self) -> Option<&str> {
        match self {
            StateFilter::All => None,
            StateFilter::Named(s) => Some(s.as_str()),
        }
    }

    pub fn label(&self) -> &str {
        self.query_value().unwrap_or(ALL_STATES)
    }
}

impl fmt::Display for StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_decodes_known_labels_and_rejects_others() {
        let level: RiskLevel = serde_json::from_str("\"Moderate\"").unwrap();
        assert_eq!(level, RiskLevel::Moderate);

        let unknown: RiskLevel = serde_json::from_str("\"Unknown\"").unwrap();
        assert_eq!(unknown.score(), 0);

        assert!(serde_json::from_str::<RiskLevel>("\"Severe\"").is_err());
        assert!(serde_json::from_str::<RiskLevel>("\"high\"").is_err());
    }

    #[test]
    fn risk_level_scores_and_abbreviations() {
        assert_eq!(RiskLevel::Low.score(), 1);
        assert_eq!(RiskLevel::Moderate.score(), 2);
        assert_eq!(RiskLevel::High.score(), 3);
        assert_eq!(RiskLevel::High.abbrev(), "Hig");
        assert_eq!(RiskLevel::Moderate.abbrev(), "Mod");
    }

    #[test]
    fn risk_color_keeps_unrecognised_values() {
        let red: RiskColor = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(red, RiskColor::Red);

        let gray: RiskColor = serde_json::from_str("\"gray\"").unwrap();
        assert_eq!(gray, RiskColor::Other("gray".into()));
        assert_eq!(serde_json::to_string(&gray).unwrap(), "\"gray\"");
    }

    #[test]
    fn month_bounds() {
        assert!(Month::new(0).is_none());
        assert!(Month::new(13).is_none());

        let march = Month::new(3).expect("march is valid");
        assert_eq!(march.name(), "March");
        assert_eq!(march.short_name(), "Mar");
        assert_eq!(Month::all().count(), 12);

        assert!(serde_json::from_str::<Month>("13").is_err());
    }

    #[test]
    fn prediction_request_serialises_as_city_and_month_number() {
        let req = PredictionRequest { city: "Pune".into(), month: Month::new(8).unwrap() };
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json, serde_json::json!({ "city": "Pune", "month": 8 }));
    }

    #[test]
    fn state_filter_treats_all_as_nationwide() {
        assert_eq!(StateFilter::parse("All"), StateFilter::All);
        assert_eq!(StateFilter::parse(""), StateFilter::All);
        assert_eq!(StateFilter::All.query_value(), None);

        let kerala = StateFilter::parse("Kerala");
        assert_eq!(kerala.query_value(), Some("Kerala"));
        assert_eq!(kerala.label(), "Kerala");
    }

    #[test]
    fn forecast_years_span_seven_years() {
        let years = forecast_years(2026);
        assert_eq!(years, vec![2024, 2025, 2026, 2027, 2028, 2029, 2030]);
    }

    #[test]
    fn metro_city_lookup() {
        assert!(is_metro_city("Kolkata"));
        assert!(!is_metro_city("Shimla"));
        assert_eq!(INDIAN_STATES[0], "All");
    }
}
