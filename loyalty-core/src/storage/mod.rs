//! The transactional ledger behind the service and the reconciliation loop.
//!
//! `Ledger` is the storage seam: the server wires in [`PostgresLedger`],
//! tests inject [`MemoryLedger`]. Every method is atomic; on conflict the
//! whole call fails without partial effect.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::entities::{Balance, OrderRecord, OrderStatus, UserRecord, WithdrawalRecord};

pub use memory::MemoryLedger;
pub use postgres::PostgresLedger;

/// Semantic storage failures. Known constraint violations surface as their
/// own kinds; anything else propagates as `Database`.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("login already exists")]
    DuplicateLogin,

    #[error("user not found")]
    UserNotFound,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Insert a new user. A unique violation on `login` maps to
    /// [`LedgerError::DuplicateLogin`].
    async fn create_user(&self, login: &str, hashed_password: &str) -> Result<(), LedgerError>;

    async fn select_user(&self, login: &str) -> Result<UserRecord, LedgerError>;

    async fn get_balance(&self, user_id: i64) -> Result<Balance, LedgerError>;

    /// Insert-or-fetch: if no row exists for `order_number`, insert with the
    /// supplied owner and return `(inserted, true)`; otherwise return the
    /// existing row untouched with `false`. Callers compare the returned
    /// owner against the requester.
    async fn create_order(
        &self,
        user_id: i64,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<(OrderRecord, bool), LedgerError>;

    async fn get_user_orders(&self, user_id: i64) -> Result<Vec<OrderRecord>, LedgerError>;

    async fn get_user_withdrawals(
        &self,
        user_id: i64,
    ) -> Result<Vec<WithdrawalRecord>, LedgerError>;

    /// Debit the balance and append the withdrawal row in one transaction.
    /// The store's balance floor maps to [`LedgerError::InsufficientFunds`].
    async fn withdraw(
        &self,
        user_id: i64,
        order_number: &str,
        sum: Decimal,
    ) -> Result<(), LedgerError>;

    /// Update the order's status and accrual, then credit the owner's
    /// balance by `accrual`, both in one transaction. Not idempotent on its
    /// own: the dispatcher's pending-only query is what prevents a terminal
    /// order from being applied twice.
    async fn apply_accrual(
        &self,
        order_number: &str,
        status: OrderStatus,
        accrual: Decimal,
    ) -> Result<(), LedgerError>;

    /// All orders in NEW or PROCESSING.
    async fn get_pending_orders(&self) -> Result<Vec<OrderRecord>, LedgerError>;

    async fn ping(&self) -> Result<(), LedgerError>;
}
