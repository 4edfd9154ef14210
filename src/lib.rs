pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod prices;

pub use config::Config;
pub use db::{init_db, AppendTradeError, Repository};
pub use domain::{
    AssignmentEvent, AssignmentLink, Decimal, Direction, JournalEntry, OptionKind, OptionLeg,
    OptionTerms, Position, PositionId, PriceBasis, Strategy, Symbol, TimeMs, Trade, TradeId,
    TradePlan, ValidationError,
};
pub use engine::{
    compute_status, process_fifo, process_fifo_grouped, FifoReport, PlanReview, PositionReport,
    PositionStatus, Verdict,
};
pub use error::AppError;
pub use orchestration::{AssignmentError, AssignmentOrchestrator, AssignmentPreview};
pub use prices::{MockPrices, PriceSource, StoredPrices};
