//! Assignment workflow: close an expiring short option, open the resulting
//! stock position, and record the link as one atomic unit.
//!
//! The orchestrator decides *what* to write; the repository's
//! `commit_assignment` owns *how* the multi-aggregate write stays atomic.

use crate::db::Repository;
use crate::domain::{
    AssignmentEvent, AssignmentLink, Decimal, Direction, OptionKind, OptionLeg, Position,
    PositionId, Strategy, TimeMs, Trade, TradePlan, ValidationError,
};
use crate::engine::status::PositionStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Shares delivered per assigned contract.
const SHARES_PER_CONTRACT: i64 = 100;

#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("position not found: {0}")]
    NotFound(PositionId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Failure of the atomic commit; no partial state is visible afterwards.
    #[error("assignment transaction failed: {0}")]
    Transaction(#[from] sqlx::Error),
}

/// Read-only economics of a proposed assignment. Computes everything,
/// persists nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPreview {
    pub option_position_id: PositionId,
    pub contracts: i64,
    pub strike: Decimal,
    pub expiration: NaiveDate,
    /// Premium received per share of the resulting stock.
    pub premium_per_share: Decimal,
    /// Strike minus premium per share.
    pub cost_basis_per_share: Decimal,
    pub total_shares: i64,
    /// Cash outlay at assignment: shares times strike.
    pub total_cost: Decimal,
}

/// Caller input for completing an assignment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAssignment {
    pub option_position_id: PositionId,
    /// Contracts to assign; defaults to all open contracts.
    pub contracts: Option<i64>,
    pub assigned_on: NaiveDate,
    /// Thesis for the spawned stock position.
    pub thesis: String,
    /// Execution timestamp stamped on both generated trades.
    pub executed_at: TimeMs,
}

/// Everything the atomic commit wrote, as re-readable aggregates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOutcome {
    pub option_position: Position,
    pub option_status: PositionStatus,
    pub stock_position: Position,
    pub event: AssignmentEvent,
}

/// Validate an assignment request against a loaded option position and
/// compute its economics. Pure; shared by preview and complete.
pub fn preview_for(
    position: &Position,
    contracts: Option<i64>,
    today: NaiveDate,
) -> Result<AssignmentPreview, ValidationError> {
    let terms = position.strategy.option_terms().ok_or_else(|| {
        ValidationError::new(
            "strategy",
            position.strategy.label(),
            "assignment applies only to option positions",
        )
    })?;

    let open_contracts = position.net_quantity();
    if open_contracts <= 0 {
        return Err(ValidationError::new(
            "contracts",
            open_contracts,
            "position has no open contracts to assign",
        ));
    }

    if today < terms.expiration {
        return Err(ValidationError::new(
            "assignedOn",
            today,
            format!(
                "assignment requires the expiration date {} to have been reached",
                terms.expiration
            ),
        ));
    }

    let contracts = contracts.unwrap_or(open_contracts);
    if contracts <= 0 {
        return Err(ValidationError::new(
            "contracts",
            contracts,
            "must be a positive integer",
        ));
    }
    if contracts > open_contracts {
        return Err(ValidationError::new(
            "contracts",
            contracts,
            format!("exceeds open contracts of {}", open_contracts),
        ));
    }

    let premium_per_share = terms.premium_per_contract / Decimal::hundred();
    let cost_basis_per_share = terms.strike - premium_per_share;
    let total_shares = contracts * SHARES_PER_CONTRACT;

    Ok(AssignmentPreview {
        option_position_id: position.id,
        contracts,
        strike: terms.strike,
        expiration: terms.expiration,
        premium_per_share,
        cost_basis_per_share,
        total_shares,
        total_cost: Decimal::from_i64(total_shares) * terms.strike,
    })
}

/// Orchestrates the assignment state machine over the repository.
#[derive(Clone)]
pub struct AssignmentOrchestrator {
    repo: Arc<Repository>,
}

impl AssignmentOrchestrator {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Compute assignment economics without touching any state.
    pub async fn preview(
        &self,
        option_position_id: PositionId,
        contracts: Option<i64>,
        today: NaiveDate,
    ) -> Result<AssignmentPreview, AssignmentError> {
        let position = self
            .repo
            .get_position(option_position_id)
            .await?
            .ok_or(AssignmentError::NotFound(option_position_id))?;
        Ok(preview_for(&position, contracts, today)?)
    }

    /// Execute the assignment: close the option at zero, open the stock
    /// position at the effective cost basis, record the link. All five
    /// effects commit together or not at all.
    pub async fn complete(
        &self,
        input: CompleteAssignment,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        let mut option_position = self
            .repo
            .get_position(input.option_position_id)
            .await?
            .ok_or(AssignmentError::NotFound(input.option_position_id))?;

        let preview = preview_for(&option_position, input.contracts, input.assigned_on)?;

        // Terms re-read after validation; preview_for proved they exist.
        let (kind, terms) = match &option_position.strategy {
            Strategy::ShortPut(terms) => (OptionKind::Put, terms.clone()),
            Strategy::ShortCall(terms) => (OptionKind::Call, terms.clone()),
            Strategy::StockLong => unreachable!("preview_for rejects non-option strategies"),
        };

        let mut stock_position = Position::new(
            option_position.symbol.clone(),
            Strategy::StockLong,
            TradePlan {
                entry_price: preview.cost_basis_per_share,
                quantity: preview.total_shares,
                target_price: preview.strike,
                stop_price: Decimal::zero(),
                thesis: input.thesis,
            },
            input.executed_at,
        );

        let stock_entry = Trade::new(
            stock_position.id,
            Direction::Buy,
            preview.total_shares,
            preview.cost_basis_per_share,
            input.executed_at,
            stock_position.symbol.clone(),
        );
        stock_position.append_trade(stock_entry).map_err(AssignmentError::Validation)?;

        let cost_basis_adjustment =
            preview.premium_per_share * Decimal::from_i64(preview.total_shares);
        let closing_leg = OptionLeg::new(
            &option_position.symbol,
            kind,
            terms.strike,
            terms.expiration,
            terms.premium_per_contract,
        );
        let closing_trade = Trade::new(
            option_position.id,
            Direction::Sell,
            preview.contracts,
            Decimal::zero(),
            input.executed_at,
            option_position.symbol.clone(),
        )
        .with_option_leg(closing_leg)
        .with_assignment(AssignmentLink {
            stock_position_id: stock_position.id,
            cost_basis_adjustment,
        });

        let option_status = option_position
            .append_trade(closing_trade)
            .map_err(AssignmentError::Validation)?;

        let event = AssignmentEvent::new(
            option_position.id,
            stock_position.id,
            input.assigned_on,
            preview.contracts,
            preview.strike,
            preview.premium_per_share,
            preview.cost_basis_per_share,
            input.executed_at,
        );

        self.repo
            .commit_assignment(&option_position, &stock_position, &event)
            .await?;

        info!(
            option_position = %option_position.id,
            stock_position = %stock_position.id,
            contracts = preview.contracts,
            "assignment committed"
        );

        Ok(AssignmentOutcome {
            option_position,
            option_status,
            stock_position,
            event,
        })
    }
}
