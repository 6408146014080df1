//! Presentation models for the dashboard panels.
//!
//! Everything here is pure: it turns model values into the strings and
//! style hints a front end draws, so any renderer shows the same thing.

use chrono::NaiveDate;

use crate::model::{
    HistoricalRecord, PredictionResult, RiskAssessment, RiskColor, RiskLevel, WeatherSnapshot,
    YearlyForecastEntry,
};

pub const PLACEHOLDER: &str = "--";
pub const AWAITING_DATA: &str = "Awaiting data";
pub const AWAITING_PREDICTION: &str = "Awaiting parameters to generate ML prediction";
pub const HISTORY_LOADING: &str = "Loading historical records...";
pub const HISTORY_EMPTY: &str = "No data available for this selection.";

/// Style class for a risk-bearing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Danger,
    Warning,
    Safe,
    Neutral,
}

impl Tone {
    /// Exactly `red`, `yellow` and `green` are styled; anything else is neutral.
    pub fn for_color(color: &RiskColor) -> Tone {
        match color {
            RiskColor::Red => Tone::Danger,
            RiskColor::Yellow => Tone::Warning,
            RiskColor::Green => Tone::Safe,
            RiskColor::Other(_) => Tone::Neutral,
        }
    }

    /// Used by the forecast legend, which styles by level rather than color.
    pub fn for_level(level: RiskLevel) -> Tone {
        match level {
            RiskLevel::High => Tone::Danger,
            RiskLevel::Moderate => Tone::Warning,
            RiskLevel::Low | RiskLevel::Unknown => Tone::Safe,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub value: String,
    pub caption: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceBadge {
    Live,
    Estimated,
}

impl SourceBadge {
    pub fn label(&self) -> &'static str {
        match self {
            SourceBadge::Live => "Live Weather · OpenWeatherMap",
            SourceBadge::Estimated => "Estimated Data (Offline)",
        }
    }
}

/// Header strip of the dashboard: date banner plus four summary cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCards {
    pub date: String,
    pub description: Option<String>,
    pub source: SourceBadge,
    pub cards: [Card; 4],
}

fn reading(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{v}{unit}"))
}

impl SummaryCards {
    pub fn build(
        current: Option<&WeatherSnapshot>,
        assessment: Option<&RiskAssessment>,
        is_live: bool,
        today: NaiveDate,
    ) -> Self {
        let city = current
            .map(|c| c.city.as_str())
            .filter(|c| !c.is_empty())
            .unwrap_or("Your City");

        let risk = Card {
            title: format!("Today's Risk — {city}"),
            value: assessment
                .map(|a| a.risk_level.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            caption: assessment
                .map(|a| format!("{}% confidence", a.confidence))
                .unwrap_or_else(|| AWAITING_DATA.to_string()),
            tone: assessment.map_or(Tone::Neutral, |a| Tone::for_color(&a.color)),
        };

        let cards = [
            Card {
                title: "Temperature".into(),
                value: reading(current.map(|c| c.temperature), "°C"),
                caption: "Live reading".into(),
                tone: Tone::Neutral,
            },
            Card {
                title: "Humidity".into(),
                value: reading(current.map(|c| c.humidity), "%"),
                caption: "Relative humidity".into(),
                tone: Tone::Neutral,
            },
            Card {
                title: "Rainfall".into(),
                value: reading(current.map(|c| c.rainfall), "mm"),
                caption: "Last 1 hour".into(),
                tone: Tone::Neutral,
            },
            risk,
        ];

        Self {
            date: today.format("%a, %-d %b %Y").to_string(),
            description: current
                .map(|c| c.description.clone())
                .filter(|d| !d.trim().is_empty()),
            source: if is_live { SourceBadge::Live } else { SourceBadge::Estimated },
            cards,
        }
    }
}

/// Result side of the predict form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionCard {
    Awaiting,
    Ready {
        heading: String,
        confidence: String,
        conditions: String,
        tone: Tone,
    },
}

impl PredictionCard {
    pub fn from_result(result: Option<&PredictionResult>) -> Self {
        match result {
            None => PredictionCard::Awaiting,
            Some(r) => PredictionCard::Ready {
                heading: format!("{} Risk", r.risk_level),
                confidence: format!("Confidence: {}%", r.confidence),
                conditions: format!("{}°C  {}%  {}mm", r.temperature, r.humidity, r.rainfall),
                tone: Tone::for_color(&r.color),
            },
        }
    }
}

/// Y-axis ticks of the trend chart.
pub const RISK_TICKS: [u8; 3] = [1, 2, 3];

pub fn risk_tick_label(score: u8) -> &'static str {
    match score {
        1 => "Low",
        2 => "Mod",
        3 => "High",
        _ => "",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub label: String,
    pub level: RiskLevel,
    pub score: u8,
    pub tone: Tone,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
}

impl ForecastPoint {
    /// Three-letter legend tag, e.g. "Mod".
    pub fn legend(&self) -> &'static str {
        self.level.abbrev()
    }

    /// Detail lines shown for one month of the trend.
    pub fn tooltip(&self, year: i32) -> Vec<String> {
        vec![
            format!("{} {year}", self.label),
            format!("Temp: {}°C", self.temperature),
            format!("Humidity: {}%", self.humidity),
            format!("Rainfall: {}mm", self.rainfall),
            format!("Risk: {}", self.level),
        ]
    }
}

/// Yearly risk trend: one point per month.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastChart {
    pub subtitle: String,
    pub year: i32,
    pub points: Vec<ForecastPoint>,
}

impl ForecastChart {
    pub const TITLE: &'static str = "Yearly Risk Trend";

    /// `None` when there is nothing to plot; the panel is hidden in that case.
    pub fn build(entries: &[YearlyForecastEntry], year: i32, city: &str) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }

        let points = entries
            .iter()
            .map(|e| ForecastPoint {
                label: e.month.clone(),
                level: e.risk_level,
                score: e.risk_level.score(),
                tone: Tone::for_level(e.risk_level),
                temperature: e.temperature,
                humidity: e.humidity,
                rainfall: e.rainfall,
            })
            .collect();

        let subtitle = if city.is_empty() { year.to_string() } else { format!("{city} · {year}") };

        Some(Self { subtitle, year, points })
    }
}

/// Historical cases panel body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryChart {
    Loading,
    Empty,
    Bars(Vec<HistoricalRecord>),
}

impl HistoryChart {
    pub const TITLE: &'static str = "Historical Dengue Cases (India)";

    pub fn build(records: &[HistoricalRecord], loading: bool) -> Self {
        if loading {
            HistoryChart::Loading
        } else if records.is_empty() {
            HistoryChart::Empty
        } else {
            HistoryChart::Bars(records.to_vec())
        }
    }

    /// Largest value on the shared y axis.
    pub fn max_value(&self) -> u64 {
        match self {
            HistoryChart::Bars(records) => records
                .iter()
                .map(|r| r.cases.max(r.deaths))
                .max()
                .unwrap_or(0),
            _ => 0,
        }
    }
}

/// Axis label: thousands collapse to "Nk".
pub fn compact_count(value: u64) -> String {
    if value >= 1000 {
        format!("{:.0}k", value as f64 / 1000.0)
    } else {
        value.to_string()
    }
}

/// Tooltip value with thousands separators, e.g. "123,456".
pub fn grouped_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
