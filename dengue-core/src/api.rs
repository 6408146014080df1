use anyhow::Context;
use async_trait::async_trait;
use std::{
    fmt::{self, Debug},
    time::Duration,
};

use crate::{
    Config,
    error::{ApiError, ApiResult},
    model::{
        HistoricalRecord, LiveWeather, PredictionRequest, PredictionResult, StateFilter,
        YearlyForecastEntry,
    },
};

pub mod http;
mod wire;

pub use http::{DEFAULT_BASE_URL, HttpDengueApi};

/// The four routes the dashboard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    LiveWeather,
    YearlyForecast,
    HistoricalCases,
    PredictCity,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::LiveWeather => "/api/live-weather",
            Endpoint::YearlyForecast => "/api/yearly-forecast",
            Endpoint::HistoricalCases => "/api/historical-cases",
            Endpoint::PredictCity => "/api/predict-city",
        }
    }

    pub const fn all() -> &'static [Endpoint] {
        &[
            Endpoint::LiveWeather,
            Endpoint::YearlyForecast,
            Endpoint::HistoricalCases,
            Endpoint::PredictCity,
        ]
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Client side of the prediction service.
///
/// Implementations return fully validated values: anything that does not
/// match the response contract comes back as [`ApiError`], never as a
/// partially filled struct.
#[async_trait]
pub trait DengueApi: Send + Sync + Debug {
    /// `GET /api/live-weather?city=<city>`
    async fn live_weather(&self, city: &str) -> ApiResult<LiveWeather>;

    /// `GET /api/yearly-forecast?year=<year>&city=<city>`
    async fn yearly_forecast(&self, year: i32, city: &str) -> ApiResult<Vec<YearlyForecastEntry>>;

    /// `GET /api/historical-cases[?state=<state>]`
    async fn historical_cases(&self, state: &StateFilter) -> ApiResult<Vec<HistoricalRecord>>;

    /// `POST /api/predict-city` with `{city, month}`
    async fn predict_city(&self, request: &PredictionRequest) -> ApiResult<PredictionResult>;
}

/// Build the HTTP client from config, with an optional one-off base URL override.
pub fn api_from_config(config: &Config, base_url_override: Option<&str>) -> anyhow::Result<HttpDengueApi> {
    let base_url = base_url_override.unwrap_or_else(|| config.api_base_url());

    match config.request_timeout_secs {
        Some(secs) => HttpDengueApi::with_timeout(base_url, Duration::from_secs(secs))
            .with_context(|| format!("Failed to build HTTP client for {base_url}")),
        None => Ok(HttpDengueApi::new(base_url)),
    }
}

pub(crate) fn require_city(city: &str) -> ApiResult<()> {
    if city.trim().is_empty() {
        return Err(ApiError::InvalidInput("city must not be empty".to_string()));
    }
    Ok(())
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut cut = MAX;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        let paths: Vec<_> = Endpoint::all().iter().map(|e| e.path()).collect();
        assert_eq!(
            paths,
            vec![
                "/api/live-weather",
                "/api/yearly-forecast",
                "/api/historical-cases",
                "/api/predict-city"
            ]
        );
    }

    #[test]
    fn empty_city_is_rejected_before_any_request() {
        let err = require_city("   ").unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert!(err.endpoint().is_none());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let short = "not found";
        assert_eq!(truncate_body(short), short);

        let long = "é".repeat(150);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }

    #[test]
    fn api_from_config_prefers_override() {
        let mut cfg = Config::default();
        cfg.api_base_url = Some("http://configured:9000".into());

        let api = api_from_config(&cfg, Some("http://override:1234/")).unwrap();
        assert_eq!(api.base_url(), "http://override:1234");

        let api = api_from_config(&cfg, None).unwrap();
        assert_eq!(api.base_url(), "http://configured:9000");
    }

    #[test]
    fn api_from_config_defaults_to_localhost() {
        let api = api_from_config(&Config::default(), None).unwrap();
        assert_eq!(api.base_url(), DEFAULT_BASE_URL);
    }
}
