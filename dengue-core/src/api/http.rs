use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    model::{
        HistoricalRecord, LiveWeather, PredictionRequest, PredictionResult, StateFilter,
        YearlyForecastEntry,
    },
};

use super::{DengueApi, Endpoint, require_city, truncate_body, wire};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// [`DengueApi`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpDengueApi {
    base_url: String,
    http: Client,
}

impl HttpDengueApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Send the request and return the body of a 2xx response.
    async fn send(&self, endpoint: Endpoint, request: RequestBuilder) -> ApiResult<String> {
        debug!(%endpoint, "sending request");

        let res = request
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;

        debug!(%endpoint, status = status.as_u16(), bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl DengueApi for HttpDengueApi {
    async fn live_weather(&self, city: &str) -> ApiResult<LiveWeather> {
        require_city(city)?;
        let endpoint = Endpoint::LiveWeather;

        let request = self.http.get(self.url(endpoint)).query(&[("city", city)]);
        let body = self.send(endpoint, request).await?;

        wire::live_weather(&body, city)
    }

    async fn yearly_forecast(&self, year: i32, city: &str) -> ApiResult<Vec<YearlyForecastEntry>> {
        require_city(city)?;
        let endpoint = Endpoint::YearlyForecast;

        let year = year.to_string();
        let request = self
            .http
            .get(self.url(endpoint))
            .query(&[("year", year.as_str()), ("city", city)]);
        let body = self.send(endpoint, request).await?;

        wire::yearly_forecast(&body)
    }

    async fn historical_cases(&self, state: &StateFilter) -> ApiResult<Vec<HistoricalRecord>> {
        let endpoint = Endpoint::HistoricalCases;

        let mut request = self.http.get(self.url(endpoint));
        if let Some(state) = state.query_value() {
            request = request.query(&[("state", state)]);
        }
        let body = self.send(endpoint, request).await?;

        wire::historical_cases(&body)
    }

    async fn predict_city(&self, request: &PredictionRequest) -> ApiResult<PredictionResult> {
        require_city(&request.city)?;
        let endpoint = Endpoint::PredictCity;

        let builder = self.http.post(self.url(endpoint)).json(request);
        let body = self.send(endpoint, builder).await?;

        wire::prediction(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = HttpDengueApi::new("http://localhost:8000/");
        assert_eq!(api.url(Endpoint::PredictCity), "http://localhost:8000/api/predict-city");
    }

    #[test]
    fn query_parameters_are_encoded() {
        let api = HttpDengueApi::new(DEFAULT_BASE_URL);
        let request = api
            .http
            .get(api.url(Endpoint::HistoricalCases))
            .query(&[("state", "Tamil Nadu")])
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/api/historical-cases?state=Tamil+Nadu"
        );
    }

    #[tokio::test]
    async fn blank_city_never_reaches_the_network() {
        // Port 9 (discard) would fail with a transport error if a request went out.
        let api = HttpDengueApi::new("http://127.0.0.1:9");
        let err = api.live_weather("").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let api = HttpDengueApi::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = api.historical_cases(&StateFilter::All).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { endpoint: Endpoint::HistoricalCases, .. }));
    }
}
