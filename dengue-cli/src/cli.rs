use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, builder::PossibleValuesParser};
use dengue_core::{
    ConfigStore, Dashboard, DashboardState, DengueApi, HttpDengueApi, Month, PredictionRequest,
    StateFilter, api_from_config,
    model::{self, INDIAN_STATES, METRO_CITIES},
    view::{ForecastChart, HistoryChart, PredictionCard},
};
use tracing::info;

use crate::{
    prompt::{self, Action},
    render,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "dengue", version, about = "Dengue outbreak risk dashboard")]
pub struct Cli {
    /// Prediction service origin for this run, e.g. http://localhost:8000.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Increase log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Choose the city used for live weather.
    Location {
        /// Skip the prompt and save this city.
        #[arg(long, value_parser = PossibleValuesParser::new(METRO_CITIES))]
        city: Option<String>,
    },

    /// Show the summary cards, yearly trend and historical cases.
    Dashboard {
        /// Forecast year; defaults to the current year.
        #[arg(long)]
        year: Option<i32>,

        /// City for the yearly trend.
        #[arg(long, value_parser = PossibleValuesParser::new(METRO_CITIES))]
        forecast_city: Option<String>,

        /// State for historical cases; "All" for nationwide.
        #[arg(long, value_parser = PossibleValuesParser::new(INDIAN_STATES))]
        state: Option<String>,
    },

    /// Predict the risk for a city and month.
    Predict {
        #[arg(long, value_parser = PossibleValuesParser::new(METRO_CITIES))]
        city: Option<String>,

        /// Month number, 1-12.
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
        month: Option<u8>,
    },

    /// Show the 12-month risk forecast.
    Forecast {
        #[arg(long)]
        year: Option<i32>,

        #[arg(long, value_parser = PossibleValuesParser::new(METRO_CITIES), default_value = model::DEFAULT_CITY)]
        city: String,
    },

    /// Show yearly case and death counts.
    History {
        #[arg(long, value_parser = PossibleValuesParser::new(INDIAN_STATES), default_value = "All")]
        state: String,
    },

    /// Browse the dashboard and change selections interactively.
    Interactive,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut store = ConfigStore::open_default()?;
        let api = api_from_config(store.config(), self.api_url.as_deref())?;
        info!(base_url = api.base_url(), config = %store.path().display(), "starting");

        match self.command {
            Command::Location { city } => location(api, &mut store, city).await,
            Command::Dashboard { year, forecast_city, state } => {
                dashboard(api, &mut store, year, forecast_city, state).await
            }
            Command::Predict { city, month } => predict(&api, city, month).await,
            Command::Forecast { year, city } => {
                forecast(&api, year.unwrap_or_else(model::current_year), &city).await
            }
            Command::History { state } => history(&api, StateFilter::parse(&state)).await,
            Command::Interactive => interactive(api, &mut store).await,
        }
    }
}

/// First run: the location prompt cannot be dismissed without a choice.
fn ensure_location(store: &mut ConfigStore) -> Result<()> {
    if !store.config().needs_location_prompt() {
        return Ok(());
    }

    println!("Select Location");
    let Some(city) = prompt::location(None)? else {
        bail!("A location is required. Run `dengue location` to choose one.");
    };
    store.save_user_city(&city)?;
    println!("Saved location: {city}");
    Ok(())
}

async fn location(api: HttpDengueApi, store: &mut ConfigStore, city: Option<String>) -> Result<()> {
    let city = match city {
        Some(city) => city,
        None => match prompt::location(store.config().user_city())? {
            Some(city) => city,
            None => {
                println!("Location unchanged.");
                return Ok(());
            }
        },
    };

    let dash = Dashboard::new(api, store.config());
    dash.save_location(store, &city).await?;
    println!("Saved location: {city} ({})", store.path().display());

    let state = dash.state().await;
    print!("{}", render::summary(&state.summary(today())));
    Ok(())
}

async fn dashboard(
    api: HttpDengueApi,
    store: &mut ConfigStore,
    year: Option<i32>,
    forecast_city: Option<String>,
    state: Option<String>,
) -> Result<()> {
    ensure_location(store)?;

    let mut initial = DashboardState::new(store.config(), year.unwrap_or_else(model::current_year));
    if let Some(city) = forecast_city {
        initial.forecast_city = city;
    }
    if let Some(state) = state {
        initial.history.filter = StateFilter::parse(&state);
    }

    let dash = Dashboard::with_state(api, initial);
    dash.start().await;

    print!("{}", render::dashboard(&dash.state().await, today()));
    Ok(())
}

async fn predict(api: &impl DengueApi, city: Option<String>, month: Option<u8>) -> Result<()> {
    let city = match city {
        Some(city) => city,
        None => prompt::city("Select City", model::DEFAULT_CITY)?.context("No city selected")?,
    };
    let month = match month {
        Some(m) => Month::new(m).with_context(|| format!("Invalid month {m}"))?,
        None => prompt::month(Month::current())?.context("No month selected")?,
    };

    let request = PredictionRequest { city, month };
    let result = api
        .predict_city(&request)
        .await
        .with_context(|| format!("Prediction for {} in {} failed", request.city, request.month))?;

    print!("{}", render::prediction(&PredictionCard::from_result(Some(&result)), &request));
    Ok(())
}

async fn forecast(api: &impl DengueApi, year: i32, city: &str) -> Result<()> {
    let entries = api
        .yearly_forecast(year, city)
        .await
        .with_context(|| format!("Yearly forecast for {city} {year} failed"))?;

    match ForecastChart::build(&entries, year, city) {
        Some(chart) => print!("{}", render::forecast(&chart)),
        None => println!("No forecast data for {city} {year}."),
    }
    Ok(())
}

async fn history(api: &impl DengueApi, filter: StateFilter) -> Result<()> {
    let records = api
        .historical_cases(&filter)
        .await
        .with_context(|| format!("Historical cases for {filter} failed"))?;

    print!("{}", render::history(&HistoryChart::build(&records, false), &filter));
    Ok(())
}

async fn interactive(api: HttpDengueApi, store: &mut ConfigStore) -> Result<()> {
    ensure_location(store)?;

    let dash = Dashboard::new(api, store.config());
    dash.start().await;

    loop {
        let state = dash.state().await;
        print!("{}", render::dashboard(&state, today()));

        match prompt::action()? {
            Action::Predict => {
                let request = &state.prediction.request;
                let Some(city) = prompt::city("Select City", &request.city)? else { continue };
                let Some(month) = prompt::month(request.month)? else { continue };
                dash.set_prediction_city(city).await;
                dash.set_prediction_month(month).await;
                dash.submit_prediction().await;
            }
            Action::ForecastYear => {
                if let Some(year) = prompt::year(state.forecast_year)? {
                    dash.select_forecast_year(year).await;
                }
            }
            Action::ForecastCity => {
                if let Some(city) = prompt::city("Forecast city", &state.forecast_city)? {
                    dash.select_forecast_city(city).await;
                }
            }
            Action::HistoryState => {
                if let Some(filter) = prompt::state(&state.history.filter)? {
                    dash.select_history_state(filter).await;
                }
            }
            Action::ChangeLocation => {
                dash.open_location_modal().await;
                match prompt::location(state.user_city.as_deref())? {
                    Some(city) => dash.save_location(store, &city).await?,
                    None => {
                        dash.close_location_modal().await;
                    }
                }
            }
            Action::Refresh => dash.start().await,
            Action::Quit => break,
        }
    }

    Ok(())
}
