//! Interactive selectors built on `inquire`.

use anyhow::Result;
use dengue_core::{
    Month, StateFilter,
    model::{self, INDIAN_STATES, METRO_CITIES},
};
use inquire::{InquireError, Select};
use std::fmt;

/// Esc yields `None`; Ctrl-C and I/O failures are errors.
fn cancellable<T>(answer: Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn cursor_of(options: &[&str], current: &str) -> usize {
    options.iter().position(|o| *o == current).unwrap_or(0)
}

/// The location modal: pick the city whose live weather is shown.
pub fn location(current: Option<&str>) -> Result<Option<String>> {
    let current = current.unwrap_or(model::DEFAULT_CITY);
    let answer = Select::new("My Current City", METRO_CITIES.to_vec())
        .with_starting_cursor(cursor_of(&METRO_CITIES, current))
        .with_help_message("To provide real-time risk analysis")
        .prompt();

    Ok(cancellable(answer)?.map(str::to_string))
}

pub fn city(message: &str, current: &str) -> Result<Option<String>> {
    let answer = Select::new(message, METRO_CITIES.to_vec())
        .with_starting_cursor(cursor_of(&METRO_CITIES, current))
        .prompt();

    Ok(cancellable(answer)?.map(str::to_string))
}

pub fn month(current: Month) -> Result<Option<Month>> {
    let answer = Select::new("Select Month", Month::all().collect::<Vec<_>>())
        .with_starting_cursor(usize::from(current.number() - 1))
        .prompt();

    cancellable(answer)
}

pub fn year(current: i32) -> Result<Option<i32>> {
    let years = model::forecast_years(model::current_year());
    let cursor = years.iter().position(|y| *y == current).unwrap_or(2);
    let answer = Select::new("Forecast year", years).with_starting_cursor(cursor).prompt();

    cancellable(answer)
}

pub fn state(current: &StateFilter) -> Result<Option<StateFilter>> {
    let answer = Select::new("Historical data for", INDIAN_STATES.to_vec())
        .with_starting_cursor(cursor_of(&INDIAN_STATES, current.label()))
        .prompt();

    Ok(cancellable(answer)?.map(StateFilter::parse))
}

/// Menu entries of the interactive dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Predict,
    ForecastYear,
    ForecastCity,
    HistoryState,
    ChangeLocation,
    Refresh,
    Quit,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Predict,
        Action::ForecastYear,
        Action::ForecastCity,
        Action::HistoryState,
        Action::ChangeLocation,
        Action::Refresh,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Predict => "Analyze risk factors for a city and month",
            Action::ForecastYear => "Change forecast year",
            Action::ForecastCity => "Change forecast city",
            Action::HistoryState => "Change historical data state",
            Action::ChangeLocation => "Change my location",
            Action::Refresh => "Refresh all panels",
            Action::Quit => "Quit",
        })
    }
}

/// Esc quits.
pub fn action() -> Result<Action> {
    let answer = Select::new("What next?", Action::ALL.to_vec()).prompt();
    Ok(cancellable(answer)?.unwrap_or(Action::Quit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_defaults_to_first_option() {
        assert_eq!(cursor_of(&METRO_CITIES, "Pune"), 6);
        assert_eq!(cursor_of(&METRO_CITIES, "Shimla"), 0);
        assert_eq!(cursor_of(&INDIAN_STATES, "All"), 0);
    }

    #[test]
    fn escape_is_not_an_error() {
        let answer: Result<Option<u8>> = cancellable(Err(InquireError::OperationCanceled));
        assert!(answer.unwrap().is_none());

        let interrupted: Result<Option<u8>> = cancellable(Err(InquireError::OperationInterrupted));
        assert!(interrupted.is_err());
    }

    #[test]
    fn quit_is_last_menu_entry() {
        assert_eq!(Action::ALL.last(), Some(&Action::Quit));
        assert_eq!(Action::Predict.to_string(), "Analyze risk factors for a city and month");
    }
}
