//! Display-ready view of an estimate
//!
//! The API returns [`EstimateView`] as JSON; the CLI prints
//! [`render_text`]. Nothing here changes any number, it only formats.

use colored::Colorize;
use serde::Serialize;
use uuid::Uuid;

use crate::features::{index, FEATURE_COUNT};
use crate::location::LocationResult;
use crate::valuation::PredictionResponse;

pub const POSITIVE_COLOR: &str = "#2ecc71";
pub const NEGATIVE_COLOR: &str = "#e74c3c";
pub const MAP_ZOOM: u8 = 13;

/// Half-width of the terminal chart, in characters, on each side of the axis
const TEXT_BAR_WIDTH: usize = 24;

#[derive(Debug, Clone, Serialize)]
pub struct EstimateView {
    pub id: Uuid,
    pub computed_at: String,
    pub estimate: f64,
    pub estimate_display: String,
    pub location: LocationResult,
    pub map: MapMarker,
    pub chart: Chart,
    pub breakdown: Breakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    /// Sorted by absolute value, smallest first
    pub bars: Vec<ChartBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub feature: String,
    pub label: String,
    pub value: f64,
    pub display: String,
    pub abbreviated: String,
    pub color: String,
}

/// Baseline + impacts = estimate, as shown under the chart
#[derive(Debug, Clone, Serialize)]
pub struct Breakdown {
    pub baseline: f64,
    pub baseline_display: String,
    pub total_impact: f64,
    pub total_impact_display: String,
    pub final_value: f64,
    pub final_display: String,
}

pub fn present(response: &PredictionResponse) -> EstimateView {
    let attribution = &response.attribution;
    let labels = feature_labels(response.record.floor_area_sq_m);

    let mut bars: Vec<ChartBar> = attribution
        .named()
        .zip(labels)
        .map(|((feature, value), label)| ChartBar {
            feature: feature.to_string(),
            label,
            value,
            display: format_signed_currency(value),
            abbreviated: format_abbreviated(value),
            color: bar_color(value).to_string(),
        })
        .collect();
    bars.sort_by(|a, b| a.value.abs().total_cmp(&b.value.abs()));

    let total_impact = attribution.total_impact();
    let final_value = attribution.reconstructed();

    EstimateView {
        id: Uuid::new_v4(),
        computed_at: chrono::Utc::now().to_rfc3339(),
        estimate: response.estimate,
        estimate_display: format_currency(response.estimate),
        location: response.location.clone(),
        map: map_marker(&response.location),
        chart: Chart { bars },
        breakdown: Breakdown {
            baseline: attribution.baseline,
            baseline_display: format_currency(attribution.baseline),
            total_impact,
            total_impact_display: format_signed_currency(total_impact),
            final_value,
            final_display: format_currency(final_value),
        },
    }
}

/// Human-readable feature labels in record order
pub fn feature_labels(floor_area_sq_m: f64) -> [String; FEATURE_COUNT] {
    let mut labels: [String; FEATURE_COUNT] = [
        "Bedrooms",
        "Bathrooms",
        "Floor area",
        "Latitude",
        "Longitude",
        "Property type",
        "Tenure",
        "Energy rating",
    ]
    .map(String::from);
    labels[index::FLOOR_AREA] = format!("Floor area ({:.0} m²)", floor_area_sq_m);
    labels
}

pub fn bar_color(value: f64) -> &'static str {
    if value > 0.0 {
        POSITIVE_COLOR
    } else {
        NEGATIVE_COLOR
    }
}

pub fn map_marker(location: &LocationResult) -> MapMarker {
    MapMarker {
        latitude: location.latitude,
        longitude: location.longitude,
        zoom: MAP_ZOOM,
        url: format!(
            "https://www.openstreetmap.org/?mlat={lat:.5}&mlon={lon:.5}#map={zoom}/{lat:.5}/{lon:.5}",
            lat = location.latitude,
            lon = location.longitude,
            zoom = MAP_ZOOM
        ),
    }
}

fn group_thousands(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut groups = Vec::new();
    while n > 0 {
        groups.push(n % 1000);
        n /= 1000;
    }
    let mut out = groups.pop().map(|g| g.to_string()).unwrap_or_default();
    for g in groups.iter().rev() {
        out.push_str(&format!(",{:03}", g));
    }
    out
}

fn rounded_pounds(value: f64) -> (bool, u64) {
    let rounded = value.round();
    (rounded < 0.0, rounded.abs() as u64)
}

/// `£412,346`; negatives as `-£1,200`
pub fn format_currency(value: f64) -> String {
    let (negative, pounds) = rounded_pounds(value);
    let sign = if negative { "-" } else { "" };
    format!("{}£{}", sign, group_thousands(pounds))
}

/// `+£16,000` / `-£5,000` / `£0`
pub fn format_signed_currency(value: f64) -> String {
    let (negative, pounds) = rounded_pounds(value);
    let sign = match (negative, pounds) {
        (_, 0) => "",
        (true, _) => "-",
        (false, _) => "+",
    };
    format!("{}£{}", sign, group_thousands(pounds))
}

/// Thousands of pounds: `+£16k` / `-£5k` / `£0k`
pub fn format_abbreviated(value: f64) -> String {
    let thousands = (value / 1000.0).round();
    let sign = if thousands > 0.0 {
        "+"
    } else if thousands < 0.0 {
        "-"
    } else {
        ""
    };
    format!("{}£{}k", sign, group_thousands(thousands.abs() as u64))
}

/// Terminal rendering: headline, location, bar chart and breakdown
pub fn render_text(view: &EstimateView) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} {}\n",
        "Estimated sale price:".bold(),
        view.estimate_display.bold().green()
    ));
    out.push_str(&format!(
        "{} {} [{}] ({:.4}, {:.4})\n",
        "Location:".bold(),
        view.location.label,
        view.location.provenance,
        view.location.latitude,
        view.location.longitude
    ));
    out.push_str(&format!("{} {}\n\n", "Map:".bold(), view.map.url));

    out.push_str(&format!("{}\n", "Contribution by feature".bold()));

    let label_width = view
        .chart
        .bars
        .iter()
        .map(|b| b.label.chars().count())
        .max()
        .unwrap_or(0);
    let max_abs = view
        .chart
        .bars
        .iter()
        .map(|b| b.value.abs())
        .fold(0.0_f64, f64::max);

    // Largest bar on top, like a horizontal bar chart sorted ascending from the bottom
    for bar in view.chart.bars.iter().rev() {
        let len = if max_abs > 0.0 {
            ((bar.value.abs() / max_abs) * TEXT_BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let fill = "█".repeat(len);
        let (left, right) = if bar.value < 0.0 {
            (
                format!("{}{}", " ".repeat(TEXT_BAR_WIDTH - len), fill.red()),
                " ".repeat(TEXT_BAR_WIDTH),
            )
        } else {
            (
                " ".repeat(TEXT_BAR_WIDTH),
                format!("{}{}", fill.green(), " ".repeat(TEXT_BAR_WIDTH - len)),
            )
        };

        let padding = " ".repeat(label_width - bar.label.chars().count());
        out.push_str(&format!(
            "  {}{} {}│{} {} ({})\n",
            bar.label, padding, left, right, bar.abbreviated, bar.display
        ));
    }

    let b = &view.breakdown;
    out.push_str(&format!("\n{}\n", "How the estimate is built".bold()));
    out.push_str(&format!("  {:<34}{}\n", "Starting point (average price)", b.baseline_display));
    out.push_str(&format!("  {:<34}{}\n", "+ Feature impacts (bars)", b.total_impact_display));
    out.push_str(&format!("  {:<34}{}\n", "= Estimated price", b.final_display));

    out
}
