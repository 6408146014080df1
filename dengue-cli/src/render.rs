//! Text rendering of the dashboard view models.
//!
//! Cards and forms are plain lines. The two charts are drawn with `ratatui`
//! widgets into an off-screen [`Buffer`] which is then printed row by row, so
//! the output works the same on a terminal and in a pipe.

use chrono::NaiveDate;
use dengue_core::{
    DashboardState, PredictionRequest, StateFilter,
    view::{
        self, ForecastChart, ForecastPoint, HistoryChart, PredictionCard, RISK_TICKS,
        SummaryCards, Tone,
    },
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

const RULE: &str = "────────────────────────────────────────────────────────────";

const FORECAST_WIDTH: u16 = 72;
const FORECAST_HEIGHT: u16 = 14;

const HISTORY_HEIGHT: u16 = 14;
const HISTORY_BAR_WIDTH: u16 = 6;
const HISTORY_GROUP_GAP: u16 = 2;
const PLACEHOLDER_HEIGHT: u16 = 3;

fn tone_mark(tone: Tone) -> &'static str {
    match tone {
        Tone::Danger => "▲",
        Tone::Warning => "◆",
        Tone::Safe => "●",
        Tone::Neutral => "○",
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Danger => Color::Red,
        Tone::Warning => Color::Yellow,
        Tone::Safe => Color::Green,
        Tone::Neutral => Color::Gray,
    }
}

fn section(title: &str, subtitle: &str) -> Vec<String> {
    let mut lines = vec![String::new(), RULE.to_string(), title.to_string()];
    if !subtitle.is_empty() {
        lines.push(subtitle.to_string());
    }
    lines.push(RULE.to_string());
    lines
}

/// Draw `widget` into a `width` x `height` buffer and return its rows,
/// trailing blanks trimmed.
fn draw(widget: impl Widget, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    widget.render(area, &mut buf);

    buf.content()
        .chunks(usize::from(width.max(1)))
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

fn placeholder(title: &str, message: &str, width: u16) -> String {
    let body = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(format!(" {title} ")));
    draw(body, width, PLACEHOLDER_HEIGHT)
}

pub fn header(user_city: Option<&str>) -> String {
    let mut lines = vec![
        "Dengue Risk Dashboard".to_string(),
        "Monitor environmental factors and predict outbreak risks in real-time.".to_string(),
    ];
    if let Some(city) = user_city {
        lines.push(format!("Location: {city} (change with `dengue location`)"));
    }
    lines.join("\n") + "\n"
}

pub fn summary(cards: &SummaryCards) -> String {
    let mut lines = vec![String::new(), format!("{}    [{}]", cards.date, cards.source.label())];
    if let Some(description) = &cards.description {
        lines.push(format!("  {description}"));
    }
    lines.push(String::new());

    for card in &cards.cards {
        lines.push(format!(
            "{} {:<28} {:>10}   {}",
            tone_mark(card.tone),
            card.title,
            card.value,
            card.caption
        ));
    }

    lines.join("\n") + "\n"
}

pub fn prediction(card: &PredictionCard, request: &PredictionRequest) -> String {
    let mut lines = section(
        "Dengue Risk Predictor",
        &format!("City: {}   Month: {}", request.city, request.month),
    );

    match card {
        PredictionCard::Awaiting => lines.push(view::AWAITING_PREDICTION.to_string()),
        PredictionCard::Ready { heading, confidence, conditions, tone } => {
            lines.push(format!("{} {heading}", tone_mark(*tone)));
            lines.push(format!("  {confidence}"));
            lines.push(format!("  {conditions}"));
        }
    }

    lines.join("\n") + "\n"
}

fn plotted(points: &[ForecastPoint], tone: Option<Tone>) -> Vec<(f64, f64)> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| tone.is_none_or(|t| p.tone == t))
        .map(|(i, p)| (i as f64, f64::from(p.score)))
        .collect()
}

/// Yearly trend: a line through the monthly risk scores with a marker per
/// month, coloured by level.
pub fn forecast(chart: &ForecastChart) -> String {
    let trend = plotted(&chart.points, None);
    let by_tone: Vec<(Tone, Vec<(f64, f64)>)> = [Tone::Safe, Tone::Warning, Tone::Danger]
        .into_iter()
        .map(|tone| (tone, plotted(&chart.points, Some(tone))))
        .collect();

    let mut datasets = vec![
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&trend),
    ];
    datasets.extend(by_tone.iter().map(|(tone, points)| {
        Dataset::default()
            .marker(Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(tone_color(*tone)))
            .data(points)
    }));

    let last = chart.points.len().saturating_sub(1);
    let x_labels: Vec<Span> = [0, last / 2, last]
        .iter()
        .filter_map(|i| chart.points.get(*i))
        .map(|p| Span::raw(p.label.clone()))
        .collect();
    let y_labels: Vec<Span> = std::iter::once(0)
        .chain(RISK_TICKS)
        .map(|tick| Span::raw(view::risk_tick_label(tick)))
        .collect();
    let y_max = RISK_TICKS.iter().copied().max().map_or(3.0, f64::from);

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} · {} ", ForecastChart::TITLE, chart.subtitle)),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, (last as f64).max(1.0)])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Risk")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(y_labels),
        );

    let mut out = String::from("\n");
    out.push_str(&draw(widget, FORECAST_WIDTH, FORECAST_HEIGHT));

    let legend: String = chart
        .points
        .iter()
        .map(|p| format!("{}{:<3}", tone_mark(p.tone), p.legend()))
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!("  {legend}\n\n"));

    for point in &chart.points {
        out.push_str(&format!("  {}\n", point.tooltip(chart.year).join("   ")));
    }
    out
}

/// Cases and deaths per year as grouped bars on a shared scale.
pub fn history(chart: &HistoryChart, filter: &StateFilter) -> String {
    let title = format!("{} · {}", HistoryChart::TITLE, filter.label());
    let mut out = String::from("\n");

    match chart {
        HistoryChart::Loading => out.push_str(&placeholder(&title, view::HISTORY_LOADING, FORECAST_WIDTH)),
        HistoryChart::Empty => out.push_str(&placeholder(&title, view::HISTORY_EMPTY, FORECAST_WIDTH)),
        HistoryChart::Bars(records) => {
            let max = chart.max_value();
            let groups: Vec<BarGroup> = records
                .iter()
                .map(|r| {
                    BarGroup::default().label(Line::from(r.year.to_string())).bars(&[
                        Bar::default()
                            .label("cases".into())
                            .value(r.cases)
                            .text_value(view::compact_count(r.cases))
                            .style(Style::default().fg(Color::Cyan)),
                        Bar::default()
                            .label("deaths".into())
                            .value(r.deaths)
                            .text_value(view::compact_count(r.deaths))
                            .style(Style::default().fg(Color::Red)),
                    ])
                })
                .collect();

            let widget = groups.into_iter().fold(
                BarChart::default()
                    .block(Block::default().borders(Borders::ALL).title(format!(" {title} ")))
                    .bar_width(HISTORY_BAR_WIDTH)
                    .bar_gap(1)
                    .group_gap(HISTORY_GROUP_GAP)
                    .max(max.max(1)),
                |bars, group| bars.data(group),
            );

            let group_width = 2 * HISTORY_BAR_WIDTH + 1 + HISTORY_GROUP_GAP;
            let count = u16::try_from(records.len()).unwrap_or(u16::MAX);
            let width = count.saturating_mul(group_width).saturating_add(2).max(FORECAST_WIDTH);

            out.push_str(&draw(widget, width, HISTORY_HEIGHT));
            out.push_str(&format!("  scale 0 .. {}\n", view::compact_count(max)));
            for record in records {
                out.push_str(&format!(
                    "  {}   cases {:>9}   deaths {:>7}\n",
                    record.year,
                    view::grouped_count(record.cases),
                    view::grouped_count(record.deaths)
                ));
            }
        }
    }

    out.push_str("  Source: Kaggle Dataset (2019 - 2024)\n");
    out
}

/// Every panel, in page order.
pub fn dashboard(state: &DashboardState, today: NaiveDate) -> String {
    let mut out = header(state.user_city.as_deref());
    out.push_str(&summary(&state.summary(today)));
    out.push_str(&prediction(&state.prediction_card(), &state.prediction.request));
    if let Some(chart) = state.forecast_chart() {
        out.push_str(&forecast(&chart));
    }
    out.push_str(&history(&state.history_chart(), &state.history.filter));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dengue_core::{
        Config, HistoricalRecord, Month, PredictionResult, RiskColor, RiskLevel,
        YearlyForecastEntry,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn empty_dashboard_shows_placeholders() {
        let mut state = DashboardState::new(&Config::default(), 2026);
        state.history.loading = false;

        let out = dashboard(&state, today());
        assert!(out.contains("Today's Risk — Your City"));
        assert!(out.contains("Estimated Data (Offline)"));
        assert!(out.contains(view::AWAITING_PREDICTION));
        assert!(out.contains(view::HISTORY_EMPTY));
        assert!(!out.contains(ForecastChart::TITLE), "empty forecast panel is hidden");
    }

    #[test]
    fn loading_history_shows_spinner_text() {
        let state = DashboardState::new(&Config::default(), 2026);
        let out = history(&state.history_chart(), &state.history.filter);
        assert!(out.contains(view::HISTORY_LOADING));
        assert!(out.contains("· All"));
        assert!(!out.contains('█'));
    }

    #[test]
    fn history_draws_grouped_bars() {
        let records = vec![
            HistoricalRecord { year: 2019, cases: 157_315, deaths: 166 },
            HistoricalRecord { year: 2020, cases: 44_585, deaths: 56 },
        ];
        let out = history(&HistoryChart::build(&records, false), &StateFilter::parse("Kerala"));

        assert!(out.contains("· Kerala"));
        assert!(out.contains('┌'), "chart is framed");
        assert!(out.contains('█'), "tallest bar is drawn");
        assert!(out.contains("2019"));
        assert!(out.contains("scale 0 .. 157k"));
        assert!(out.contains("157,315"));
    }

    #[test]
    fn drawn_rows_match_buffer_size() {
        let out = draw(Block::default().borders(Borders::ALL), 10, 3);
        let rows: Vec<&str> = out.lines().collect();
        assert_eq!(rows, vec!["┌────────┐", "│        │", "└────────┘"]);
    }

    #[test]
    fn forecast_chart_has_risk_axis_legend_and_tooltips() {
        let entries: Vec<YearlyForecastEntry> = [RiskLevel::Low, RiskLevel::High]
            .into_iter()
            .zip(["Jan", "Jul"])
            .map(|(level, month)| YearlyForecastEntry {
                month: month.into(),
                month_num: None,
                year: None,
                temperature: 25.0,
                humidity: 60.0,
                rainfall: 10.0,
                risk_level: level,
                risk_color: RiskColor::Green,
                confidence: None,
            })
            .collect();
        let chart = ForecastChart::build(&entries, 2026, "Delhi").unwrap();
        let out = forecast(&chart);

        assert!(out.contains("Yearly Risk Trend · Delhi · 2026"));
        for tick in ["Low", "Mod", "High"] {
            assert!(out.contains(tick), "missing y tick {tick}");
        }
        assert!(out.contains("●Low ▲Hig"));
        assert!(out.contains("Jul 2026   Temp: 25°C   Humidity: 60%   Rainfall: 10mm   Risk: High"));
    }

    #[test]
    fn prediction_card_rendering() {
        let request = PredictionRequest { city: "Pune".into(), month: Month::new(7).unwrap() };
        let result = PredictionResult {
            risk_level: RiskLevel::High,
            confidence: 88.0,
            color: RiskColor::Red,
            temperature: 28.0,
            humidity: 80.0,
            rainfall: 170.0,
        };
        let out = prediction(&PredictionCard::from_result(Some(&result)), &request);

        assert!(out.contains("City: Pune   Month: July"));
        assert!(out.contains("▲ High Risk"));
        assert!(out.contains("Confidence: 88%"));
    }

    #[test]
    fn header_mentions_saved_city() {
        assert!(header(Some("Lucknow")).contains("Location: Lucknow"));
        assert!(!header(None).contains("Location:"));
    }
}
