//! The user-visible operations, composed over the ledger.
//!
//! Every operation validates here and returns a semantic outcome; turning
//! those into HTTP status codes is the API layer's job alone.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::auth::{self, AuthConfig};
use crate::entities::{Balance, OrderRecord, OrderStatus, WithdrawalRecord};
use crate::luhn;
use crate::storage::{Ledger, LedgerError};

/// Result of submitting an order number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Order newly recorded for this user.
    Accepted,
    /// The caller already submitted this order earlier.
    AlreadyAccepted,
    /// Another user owns this order.
    OwnedByOther,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid order number")]
    InvalidOrderNumber,

    #[error("login already exists")]
    DuplicateLogin,

    #[error("invalid login or password")]
    InvalidCredentials,

    #[error("not enough bonuses")]
    InsufficientFunds,

    #[error("user has no orders")]
    NoOrders,

    #[error("user has no withdrawals")]
    NoWithdrawals,

    #[error("sum must be positive")]
    NonPositiveSum,

    #[error("failed to hash password: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("failed to sign token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Ledger(LedgerError),
}

impl From<LedgerError> for ServiceError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::DuplicateLogin => ServiceError::DuplicateLogin,
            LedgerError::InsufficientFunds => ServiceError::InsufficientFunds,
            other => ServiceError::Ledger(other),
        }
    }
}

pub struct Service {
    ledger: Arc<dyn Ledger>,
    auth: AuthConfig,
}

impl Service {
    pub fn new(ledger: Arc<dyn Ledger>, auth: AuthConfig) -> Self {
        Self { ledger, auth }
    }

    /// Create the user and immediately mint a token for the new session.
    pub async fn register(&self, login: &str, password: &str) -> Result<String, ServiceError> {
        let hashed = auth::hash_password(password)?;
        self.ledger.create_user(login, &hashed).await?;
        debug!(login, "user registered");
        self.authenticate(login, password).await
    }

    pub async fn authenticate(&self, login: &str, password: &str) -> Result<String, ServiceError> {
        let user = match self.ledger.select_user(login).await {
            Ok(user) => user,
            Err(LedgerError::UserNotFound) => return Err(ServiceError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        if !auth::verify_password(password, &user.hashed_password) {
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(auth::mint_token(&self.auth, user.id)?)
    }

    pub async fn submit_order(
        &self,
        user_id: i64,
        order_number: &str,
    ) -> Result<SubmitOutcome, ServiceError> {
        if !luhn::is_valid(order_number) {
            return Err(ServiceError::InvalidOrderNumber);
        }

        let (order, is_new) = self
            .ledger
            .create_order(user_id, order_number, OrderStatus::New)
            .await?;

        if is_new {
            debug!(user_id, order_number, "order accepted");
            Ok(SubmitOutcome::Accepted)
        } else if order.user_id == user_id {
            Ok(SubmitOutcome::AlreadyAccepted)
        } else {
            Ok(SubmitOutcome::OwnedByOther)
        }
    }

    pub async fn balance(&self, user_id: i64) -> Result<Balance, ServiceError> {
        Ok(self.ledger.get_balance(user_id).await?)
    }

    pub async fn orders(&self, user_id: i64) -> Result<Vec<OrderRecord>, ServiceError> {
        let orders = self.ledger.get_user_orders(user_id).await?;
        if orders.is_empty() {
            return Err(ServiceError::NoOrders);
        }
        Ok(orders)
    }

    pub async fn withdrawals(&self, user_id: i64) -> Result<Vec<WithdrawalRecord>, ServiceError> {
        let withdrawals = self.ledger.get_user_withdrawals(user_id).await?;
        if withdrawals.is_empty() {
            return Err(ServiceError::NoWithdrawals);
        }
        Ok(withdrawals)
    }

    pub async fn withdraw(
        &self,
        user_id: i64,
        order_number: &str,
        sum: Decimal,
    ) -> Result<(), ServiceError> {
        if !luhn::is_valid(order_number) {
            return Err(ServiceError::InvalidOrderNumber);
        }
        if sum <= Decimal::ZERO {
            return Err(ServiceError::NonPositiveSum);
        }

        self.ledger.withdraw(user_id, order_number, sum).await?;
        debug!(user_id, order_number, sum = %sum, "withdrawal processed");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(self.ledger.ping().await?)
    }
}
