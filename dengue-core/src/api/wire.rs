//! Raw response bodies and the contract checks applied before they become
//! model values.

use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    api::Endpoint,
    error::{ApiError, ApiResult},
    model::{
        HistoricalRecord, LiveWeather, Month, PredictionResult, RiskAssessment, RiskColor,
        RiskLevel, WeatherSnapshot, YearlyForecastEntry,
    },
};

#[derive(Debug, Deserialize)]
struct LiveWeatherBody {
    risk_level: RiskLevel,
    confidence: f64,
    color: RiskColor,
    #[serde(default)]
    is_live: bool,
    temperature: f64,
    humidity: f64,
    rainfall: f64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    city: Option<String>,
    month: u8,
}

#[derive(Debug, Deserialize)]
struct ForecastEntryBody {
    month: String,
    #[serde(default)]
    month_num: Option<u8>,
    #[serde(default)]
    year: Option<i32>,
    temperature: f64,
    humidity: f64,
    rainfall: f64,
    risk_level: RiskLevel,
    risk_color: RiskColor,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ForecastBody {
    forecast: Vec<ForecastEntryBody>,
}

#[derive(Debug, Deserialize)]
struct HistoryBody {
    historical_data: Vec<HistoricalRecord>,
}

#[derive(Debug, Deserialize)]
struct PredictionBody {
    risk_level: RiskLevel,
    confidence: f64,
    color: RiskColor,
    temperature: f64,
    humidity: f64,
    rainfall: f64,
}

struct Contract {
    endpoint: Endpoint,
}

impl Contract {
    fn finite(&self, field: &str, value: f64) -> ApiResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ApiError::contract(self.endpoint, format!("{field} is not a finite number")))
        }
    }

    fn percentage(&self, field: &str, value: f64) -> ApiResult<f64> {
        let value = self.finite(field, value)?;
        if (0.0..=100.0).contains(&value) {
            Ok(value)
        } else {
            Err(ApiError::contract(self.endpoint, format!("{field} {value} is outside 0..=100")))
        }
    }

    fn non_negative(&self, field: &str, value: f64) -> ApiResult<f64> {
        let value = self.finite(field, value)?;
        if value >= 0.0 {
            Ok(value)
        } else {
            Err(ApiError::contract(self.endpoint, format!("{field} {value} is negative")))
        }
    }

    fn month(&self, field: &str, value: u8) -> ApiResult<Month> {
        Month::new(value).ok_or_else(|| {
            ApiError::contract(self.endpoint, format!("{field} {value} is not a calendar month"))
        })
    }
}

fn parse<T: DeserializeOwned>(endpoint: Endpoint, body: &str) -> ApiResult<T> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode { endpoint, source })
}

/// Decode `/api/live-weather`. A blank `city` falls back to the one requested.
pub(crate) fn live_weather(body: &str, requested_city: &str) -> ApiResult<LiveWeather> {
    let check = Contract { endpoint: Endpoint::LiveWeather };
    let raw: LiveWeatherBody = parse(check.endpoint, body)?;

    let city = raw
        .city
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| requested_city.to_string());

    Ok(LiveWeather {
        assessment: RiskAssessment {
            risk_level: raw.risk_level,
            confidence: check.percentage("confidence", raw.confidence)?,
            color: raw.color,
        },
        weather: WeatherSnapshot {
            temperature: check.finite("temperature", raw.temperature)?,
            humidity: check.percentage("humidity", raw.humidity)?,
            rainfall: check.non_negative("rainfall", raw.rainfall)?,
            description: raw.description,
            city,
            month: check.month("month", raw.month)?,
        },
        is_live: raw.is_live,
    })
}

pub(crate) fn yearly_forecast(body: &str) -> ApiResult<Vec<YearlyForecastEntry>> {
    let check = Contract { endpoint: Endpoint::YearlyForecast };
    let raw: ForecastBody = parse(check.endpoint, body)?;

    raw.forecast
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            if entry.month.trim().is_empty() {
                return Err(ApiError::contract(
                    check.endpoint,
                    format!("forecast[{idx}] has an empty month label"),
                ));
            }

            let month_num = entry.month_num.map(|m| check.month("month_num", m)).transpose()?;
            let confidence =
                entry.confidence.map(|c| check.percentage("confidence", c)).transpose()?;

            Ok(YearlyForecastEntry {
                month: entry.month,
                month_num,
                year: entry.year,
                temperature: check.finite("temperature", entry.temperature)?,
                humidity: check.percentage("humidity", entry.humidity)?,
                rainfall: check.non_negative("rainfall", entry.rainfall)?,
                risk_level: entry.risk_level,
                risk_color: entry.risk_color,
                confidence,
            })
        })
        .collect()
}

pub(crate) fn historical_cases(body: &str) -> ApiResult<Vec<HistoricalRecord>> {
    let raw: HistoryBody = parse(Endpoint::HistoricalCases, body)?;
    Ok(raw.historical_data)
}

pub(crate) fn prediction(body: &str) -> ApiResult<PredictionResult> {
    let check = Contract { endpoint: Endpoint::PredictCity };
    let raw: PredictionBody = parse(check.endpoint, body)?;

    Ok(PredictionResult {
        risk_level: raw.risk_level,
        confidence: check.percentage("confidence", raw.confidence)?,
        color: raw.color,
        temperature: check.finite("temperature", raw.temperature)?,
        humidity: check.percentage("humidity", raw.humidity)?,
        rainfall: check.non_negative("rainfall", raw.rainfall)?,
    })
}
