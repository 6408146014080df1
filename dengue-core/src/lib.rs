//! Core library for the `dengue` dashboard.
//!
//! This crate defines:
//! - The typed contract of the prediction service and an HTTP client for it
//! - Configuration (API origin, saved user city)
//! - The dashboard state and the fetches that drive it
//! - View models for cards, charts and forms
//!
//! It is used by `dengue-cli`, but any other front end can drive the same
//! [`Dashboard`] and render the same view models.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod sequence;
pub mod view;

pub use api::{DengueApi, Endpoint, HttpDengueApi, api_from_config};
pub use config::{Config, ConfigStore};
pub use dashboard::{Dashboard, DashboardState};
pub use error::{ApiError, ApiResult};
pub use model::{
    HistoricalRecord, LiveWeather, Month, PredictionRequest, PredictionResult, RiskAssessment,
    RiskColor, RiskLevel, StateFilter, WeatherSnapshot, YearlyForecastEntry,
};
pub use sequence::{RequestSequencer, RequestToken};
