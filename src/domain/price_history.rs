//! Synthetic chart data
//!
//! The API exposes no historical prices, so the detail chart is filled with
//! points scattered within ±5% of the current price.

use std::fmt;
use std::str::FromStr;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::token::parse_price;

/// Smallest price a generated point may take
pub const MIN_SYNTHETIC_PRICE: f64 = 0.000001;

/// Half-width of the scatter band, as a fraction of the base price
const JITTER: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFrame {
    #[default]
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "1Y")]
    OneYear,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 4] = [
        TimeFrame::OneDay,
        TimeFrame::OneWeek,
        TimeFrame::OneMonth,
        TimeFrame::OneYear,
    ];

    /// Number of chart points
    pub fn points(self) -> usize {
        match self {
            TimeFrame::OneDay => 24,
            TimeFrame::OneWeek => 7,
            TimeFrame::OneMonth => 30,
            TimeFrame::OneYear => 365,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeFrame::OneDay => "1D",
            TimeFrame::OneWeek => "1W",
            TimeFrame::OneMonth => "1M",
            TimeFrame::OneYear => "1Y",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeFrame::ALL
            .into_iter()
            .find(|tf| tf.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown timeframe '{}' (expected 1D, 1W, 1M or 1Y)", s))
    }
}

/// Base price for the chart: parsed `priceUsd`, or 1 when absent.
/// `None` when a price is present but unparseable; there is nothing to chart.
pub fn base_price(price_usd: Option<&str>) -> Option<f64> {
    let price_usd = price_usd.filter(|p| !p.is_empty()).unwrap_or("1");
    parse_price(Some(price_usd))
}

/// Generate chart points with the thread RNG
pub fn synthetic_history(base_price: f64, timeframe: TimeFrame) -> Vec<f64> {
    synthetic_history_with(&mut rand::thread_rng(), base_price, timeframe)
}

/// Generate chart points from a caller-supplied RNG
pub fn synthetic_history_with<R: Rng>(
    rng: &mut R,
    base_price: f64,
    timeframe: TimeFrame,
) -> Vec<f64> {
    (0..timeframe.points())
        .map(|_| {
            let factor = 1.0 + (rng.gen::<f64>() - 0.5) * 2.0 * JITTER;
            (base_price * factor).max(MIN_SYNTHETIC_PRICE)
        })
        .collect()
}
