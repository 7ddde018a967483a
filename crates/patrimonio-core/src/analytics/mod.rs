//! Day-to-day spend analytics: trend classification, moving averages, and
//! the daily-spend run-rate view.

pub mod day_to_day;
pub mod trend;

pub use day_to_day::{day_to_day, DayToDayInput, DayToDayOutput, MonthTotal};
pub use trend::{classify_trend, moving_average, Trend, TrendOutput};
