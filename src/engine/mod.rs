//! Pure calculators: lifecycle status, FIFO matching, plan review.
//!
//! Everything here is synchronous, side-effect free, and total: malformed
//! input degrades to safe defaults instead of failing, because these are
//! queried far more often than they are the source of a bug.

pub mod fifo;
pub mod review;
pub mod status;

pub use fifo::{
    process_fifo, process_fifo_grouped, FifoReport, InstrumentReport, LotMatch, PositionReport,
    TradePnl,
};
pub use review::{review_plan, PlanReview, PriceComparison, ProfitComparison, Verdict};
pub use status::{compute_status, PositionStatus};
