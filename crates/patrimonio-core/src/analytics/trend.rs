//! Trend classification over a trailing monthly series.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PatrimonioError;
use crate::types::{pct_variation, Money};
use crate::PatrimonioResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    Down,
    #[serde(rename = "FLAT")]
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendOutput {
    pub tendencia: Trend,
    /// Average of the most recent 3 points (fewer when the series is short).
    pub media_3m: Money,
    /// Average of the most recent 6 points (fewer when the series is short).
    pub media_6m: Money,
    /// Variation of the last point vs. the previous one, as a percentage.
    pub variacion_mensual_pct: Decimal,
}

/// Classify a trailing monthly series (chronological, most recent last).
///
/// UP when the 3-month average exceeds the 6-month average and the
/// month-over-month delta is non-negative; DOWN on the exact reverse;
/// FLAT otherwise.
pub fn classify_trend(series: &[Money]) -> PatrimonioResult<TrendOutput> {
    if series.len() < 2 {
        return Err(PatrimonioError::InsufficientData(
            "Trend classification requires at least 2 points".into(),
        ));
    }

    let media_3m = tail_average(series, 3);
    let media_6m = tail_average(series, 6);
    let last = series[series.len() - 1];
    let prev = series[series.len() - 2];
    let delta = last - prev;

    let tendencia = if media_3m > media_6m && delta >= Decimal::ZERO {
        Trend::Up
    } else if media_3m < media_6m && delta <= Decimal::ZERO {
        Trend::Down
    } else {
        Trend::Flat
    };

    Ok(TrendOutput {
        tendencia,
        media_3m,
        media_6m,
        variacion_mensual_pct: pct_variation(prev, last),
    })
}

/// Simple moving average; one value per full window.
pub fn moving_average(series: &[Money], window: usize) -> PatrimonioResult<Vec<Money>> {
    if window == 0 {
        return Err(PatrimonioError::InvalidInput {
            field: "window".into(),
            reason: "Moving-average window must be greater than zero".into(),
        });
    }
    let divisor = Decimal::from(window as u64);
    Ok(series
        .windows(window)
        .map(|w| w.iter().copied().sum::<Decimal>() / divisor)
        .collect())
}

fn tail_average(series: &[Money], n: usize) -> Money {
    let take = n.min(series.len());
    let tail = &series[series.len() - take..];
    tail.iter().copied().sum::<Decimal>() / Decimal::from(take as u64)
}
