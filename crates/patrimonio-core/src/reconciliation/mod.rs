//! Monthly reconciliation: budget vs. actual, trailing benchmark, and
//! narrative notes. Every date filter in this module goes through the
//! half-open [`MonthWindow`].

pub mod monthly;
pub mod notes;
pub mod window;

pub use monthly::{
    monthly_summary, MonthlySummary, MonthlySummaryInput, MovementDetail, MonthlyBudget,
    TrailingBenchmark,
};
pub use notes::{Note, NoteLevel};
pub use window::MonthWindow;
