//! PostgreSQL-backed ledger.

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{Ledger, LedgerError};
use crate::entities::{Balance, OrderRecord, OrderStatus, UserRecord, WithdrawalRecord};

const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";

pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn constraint_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

#[async_trait::async_trait]
impl Ledger for PostgresLedger {
    async fn create_user(&self, login: &str, hashed_password: &str) -> Result<(), LedgerError> {
        UserRecord::insert(&self.pool, login, hashed_password)
            .await
            .map_err(|e| {
                if constraint_code(&e).as_deref() == Some(UNIQUE_VIOLATION) {
                    LedgerError::DuplicateLogin
                } else {
                    LedgerError::Database(e)
                }
            })
    }

    async fn select_user(&self, login: &str) -> Result<UserRecord, LedgerError> {
        UserRecord::by_login(&self.pool, login)
            .await?
            .ok_or(LedgerError::UserNotFound)
    }

    async fn get_balance(&self, user_id: i64) -> Result<Balance, LedgerError> {
        UserRecord::balance(&self.pool, user_id)
            .await?
            .ok_or(LedgerError::UserNotFound)
    }

    async fn create_order(
        &self,
        user_id: i64,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<(OrderRecord, bool), LedgerError> {
        Ok(OrderRecord::insert_or_fetch(&self.pool, user_id, order_number, status).await?)
    }

    async fn get_user_orders(&self, user_id: i64) -> Result<Vec<OrderRecord>, LedgerError> {
        Ok(OrderRecord::for_user(&self.pool, user_id).await?)
    }

    async fn get_user_withdrawals(
        &self,
        user_id: i64,
    ) -> Result<Vec<WithdrawalRecord>, LedgerError> {
        Ok(WithdrawalRecord::for_user(&self.pool, user_id).await?)
    }

    async fn withdraw(
        &self,
        user_id: i64,
        order_number: &str,
        sum: Decimal,
    ) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await?;

        let rows = UserRecord::debit_tx(&mut tx, user_id, sum)
            .await
            .map_err(|e| {
                if constraint_code(&e).as_deref() == Some(CHECK_VIOLATION) {
                    LedgerError::InsufficientFunds
                } else {
                    LedgerError::Database(e)
                }
            })?;
        if rows == 0 {
            return Err(LedgerError::UserNotFound);
        }

        WithdrawalRecord::insert_tx(&mut tx, user_id, order_number, sum).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn apply_accrual(
        &self,
        order_number: &str,
        status: OrderStatus,
        accrual: Decimal,
    ) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await?;

        let Some(user_id) =
            OrderRecord::apply_accrual_tx(&mut tx, order_number, status, accrual).await?
        else {
            return Err(LedgerError::OrderNotFound(order_number.to_owned()));
        };

        UserRecord::credit_tx(&mut tx, user_id, accrual).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_pending_orders(&self) -> Result<Vec<OrderRecord>, LedgerError> {
        Ok(OrderRecord::pending(&self.pool).await?)
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
