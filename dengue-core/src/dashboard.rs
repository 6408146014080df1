//! Root of the dashboard: owns the shared view state and drives every fetch.
//!
//! Each selection change issues one request. Failures are logged and leave
//! the current state alone; responses that resolve after a newer request on
//! the same channel has been issued are dropped.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    Config, ConfigStore,
    api::DengueApi,
    model::{
        self, DEFAULT_CITY, HistoricalRecord, Month, PredictionRequest, PredictionResult,
        RiskAssessment, StateFilter, WeatherSnapshot, YearlyForecastEntry,
    },
    sequence::RequestSequencer,
    view::{ForecastChart, HistoryChart, PredictionCard, SummaryCards},
};

/// Receives every applied prediction together with the request that produced it.
pub type PredictionListener = Arc<dyn Fn(&PredictionResult, &PredictionRequest) + Send + Sync>;

/// First-run / change-location prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationModal {
    pub open: bool,
    pub selected: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPanel {
    pub filter: StateFilter,
    pub records: Vec<HistoricalRecord>,
    pub loading: bool,
}

impl Default for HistoryPanel {
    fn default() -> Self {
        // Starts in the loading state until the first fetch resolves.
        Self { filter: StateFilter::All, records: Vec::new(), loading: true }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictionForm {
    pub request: PredictionRequest,
    pub result: Option<PredictionResult>,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub current: Option<WeatherSnapshot>,
    pub assessment: Option<RiskAssessment>,
    pub is_live: bool,
    pub forecast: Vec<YearlyForecastEntry>,
    pub forecast_year: i32,
    pub forecast_city: String,
    pub user_city: Option<String>,
    pub location_modal: LocationModal,
    pub history: HistoryPanel,
    pub prediction: PredictionForm,
}

impl DashboardState {
    pub fn new(config: &Config, forecast_year: i32) -> Self {
        let user_city = config.user_city().map(str::to_string);
        Self {
            current: None,
            assessment: None,
            is_live: false,
            forecast: Vec::new(),
            forecast_year,
            forecast_city: DEFAULT_CITY.to_string(),
            location_modal: LocationModal {
                open: user_city.is_none(),
                selected: DEFAULT_CITY.to_string(),
            },
            user_city,
            history: HistoryPanel::default(),
            prediction: PredictionForm::default(),
        }
    }

    pub fn summary(&self, today: NaiveDate) -> SummaryCards {
        SummaryCards::build(self.current.as_ref(), self.assessment.as_ref(), self.is_live, today)
    }

    pub fn forecast_chart(&self) -> Option<ForecastChart> {
        ForecastChart::build(&self.forecast, self.forecast_year, &self.forecast_city)
    }

    pub fn history_chart(&self) -> HistoryChart {
        HistoryChart::build(&self.history.records, self.history.loading)
    }

    pub fn prediction_card(&self) -> PredictionCard {
        PredictionCard::from_result(self.prediction.result.as_ref())
    }
}

pub struct Dashboard<A> {
    api: A,
    state: RwLock<DashboardState>,
    live_seq: RequestSequencer,
    forecast_seq: RequestSequencer,
    history_seq: RequestSequencer,
    predict_seq: RequestSequencer,
    on_prediction: Option<PredictionListener>,
}

impl<A: DengueApi> Dashboard<A> {
    pub fn new(api: A, config: &Config) -> Self {
        Self::with_state(api, DashboardState::new(config, model::current_year()))
    }

    pub fn with_state(api: A, state: DashboardState) -> Self {
        Self {
            api,
            state: RwLock::new(state),
            live_seq: RequestSequencer::new(),
            forecast_seq: RequestSequencer::new(),
            history_seq: RequestSequencer::new(),
            predict_seq: RequestSequencer::new(),
            on_prediction: None,
        }
    }

    pub fn with_prediction_listener(
        mut self,
        listener: impl Fn(&PredictionResult, &PredictionRequest) + Send + Sync + 'static,
    ) -> Self {
        self.on_prediction = Some(Arc::new(listener));
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Copy of the current state for rendering.
    pub async fn state(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    /// Initial load: live weather (when a city is saved), forecast and history.
    pub async fn start(&self) {
        tokio::join!(self.refresh_live_weather(), self.refresh_forecast(), self.refresh_history());
    }

    pub async fn refresh_live_weather(&self) {
        let Some(city) = self.state.read().await.user_city.clone() else {
            debug!("no saved city, skipping live weather");
            return;
        };

        let token = self.live_seq.issue();
        let result = self.api.live_weather(&city).await;

        match result {
            Ok(live) => {
                let mut state = self.state.write().await;
                if !self.live_seq.is_latest(token) {
                    debug!(%city, "discarding stale live weather");
                    return;
                }
                state.assessment = Some(live.assessment);
                state.is_live = live.is_live;
                state.current = Some(live.weather);
                info!(%city, is_live = state.is_live, "live weather updated");
            }
            Err(err) => warn!(%city, error = %err, "Error fetching live weather"),
        }
    }

    /// Fetches only when `year` differs from the current selection.
    pub async fn select_forecast_year(&self, year: i32) {
        let city = {
            let mut state = self.state.write().await;
            if state.forecast_year == year {
                return;
            }
            state.forecast_year = year;
            state.forecast_city.clone()
        };
        self.fetch_forecast(year, city).await;
    }

    pub async fn select_forecast_city(&self, city: impl Into<String>) {
        let city = city.into();
        let year = {
            let mut state = self.state.write().await;
            if state.forecast_city == city {
                return;
            }
            state.forecast_city = city.clone();
            state.forecast_year
        };
        self.fetch_forecast(year, city).await;
    }

    pub async fn refresh_forecast(&self) {
        let (year, city) = {
            let state = self.state.read().await;
            (state.forecast_year, state.forecast_city.clone())
        };
        self.fetch_forecast(year, city).await;
    }

    async fn fetch_forecast(&self, year: i32, city: String) {
        let token = self.forecast_seq.issue();
        let result = self.api.yearly_forecast(year, &city).await;

        match result {
            Ok(entries) => {
                let mut state = self.state.write().await;
                if !self.forecast_seq.is_latest(token) {
                    debug!(year, %city, "discarding stale yearly forecast");
                    return;
                }
                debug!(year, %city, months = entries.len(), "yearly forecast updated");
                state.forecast = entries;
            }
            Err(err) => warn!(year, %city, error = %err, "Error fetching yearly forecast"),
        }
    }

    pub async fn select_history_state(&self, filter: StateFilter) {
        {
            let mut state = self.state.write().await;
            if state.history.filter == filter {
                return;
            }
            state.history.filter = filter.clone();
        }
        self.fetch_history(filter).await;
    }

    pub async fn refresh_history(&self) {
        let filter = self.state.read().await.history.filter.clone();
        self.fetch_history(filter).await;
    }

    async fn fetch_history(&self, filter: StateFilter) {
        let token = self.history_seq.issue();
        self.state.write().await.history.loading = true;

        let result = self.api.historical_cases(&filter).await;

        let mut state = self.state.write().await;
        if !self.history_seq.is_latest(token) {
            debug!(state = %filter, "discarding stale historical cases");
            return;
        }
        match result {
            Ok(records) => {
                debug!(state = %filter, years = records.len(), "historical cases updated");
                state.history.records = records;
            }
            Err(err) => warn!(state = %filter, error = %err, "Error fetching historical data"),
        }
        state.history.loading = false;
    }

    pub async fn set_prediction_city(&self, city: impl Into<String>) {
        self.state.write().await.prediction.request.city = city.into();
    }

    pub async fn set_prediction_month(&self, month: Month) {
        self.state.write().await.prediction.request.month = month;
    }

    /// Submit the predict form: one POST with the current `{city, month}`.
    ///
    /// Returns the result when it was applied to the form.
    pub async fn submit_prediction(&self) -> Option<PredictionResult> {
        let request = {
            let mut state = self.state.write().await;
            state.prediction.loading = true;
            state.prediction.request.clone()
        };

        let token = self.predict_seq.issue();
        let result = self.api.predict_city(&request).await;

        let mut state = self.state.write().await;
        if !self.predict_seq.is_latest(token) {
            debug!(city = %request.city, "discarding stale prediction");
            return None;
        }
        state.prediction.loading = false;

        match result {
            Ok(prediction) => {
                state.prediction.result = Some(prediction.clone());
                drop(state);
                info!(city = %request.city, month = request.month.number(), risk = %prediction.risk_level, "prediction received");
                if let Some(listener) = &self.on_prediction {
                    listener(&prediction, &request);
                }
                Some(prediction)
            }
            Err(err) => {
                warn!(city = %request.city, error = %err, "Error predicting");
                None
            }
        }
    }

    pub async fn open_location_modal(&self) {
        self.state.write().await.location_modal.open = true;
    }

    /// Dismiss the location prompt. Refused (returns false) until a city has
    /// been saved.
    pub async fn close_location_modal(&self) -> bool {
        let mut state = self.state.write().await;
        if state.user_city.is_none() {
            return false;
        }
        state.location_modal.open = false;
        true
    }

    pub async fn choose_location(&self, city: impl Into<String>) {
        self.state.write().await.location_modal.selected = city.into();
    }

    /// Persist `city`, close the prompt and load its live weather.
    pub async fn save_location(&self, store: &mut ConfigStore, city: &str) -> Result<()> {
        if !model::is_metro_city(city) {
            bail!("Unknown city '{city}'. Choose one of: {}", model::METRO_CITIES.join(", "));
        }

        store.save_user_city(city)?;

        {
            let mut state = self.state.write().await;
            state.user_city = Some(city.to_string());
            state.location_modal.selected = city.to_string();
            state.location_modal.open = false;
        }
        info!(%city, "location saved");

        self.refresh_live_weather().await;
        Ok(())
    }
}
