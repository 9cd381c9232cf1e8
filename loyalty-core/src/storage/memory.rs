//! In-memory ledger with the same semantics as the PostgreSQL store.
//!
//! One mutex guards all tables, which gives every method the same
//! all-or-nothing atomicity the SQL transactions provide. Used by tests to
//! exercise the service facade and the reconciliation pipeline without a
//! database.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use super::{Ledger, LedgerError};
use crate::entities::{Balance, OrderRecord, OrderStatus, UserRecord, WithdrawalRecord};

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    orders: Vec<OrderRecord>,
    withdrawals: Vec<WithdrawalRecord>,
    order_index: HashMap<String, usize>,
    next_user_id: i64,
    next_order_id: i64,
    next_withdrawal_id: i64,
}

#[derive(Default)]
pub struct MemoryLedger {
    tables: Mutex<Tables>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn create_user(&self, login: &str, hashed_password: &str) -> Result<(), LedgerError> {
        let mut t = self.tables.lock().await;
        if t.users.iter().any(|u| u.login == login) {
            return Err(LedgerError::DuplicateLogin);
        }
        t.next_user_id += 1;
        let id = t.next_user_id;
        t.users.push(UserRecord {
            id,
            login: login.to_owned(),
            hashed_password: hashed_password.to_owned(),
            balance: Decimal::ZERO,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(())
    }

    async fn select_user(&self, login: &str) -> Result<UserRecord, LedgerError> {
        let t = self.tables.lock().await;
        t.users
            .iter()
            .find(|u| u.login == login)
            .cloned()
            .ok_or(LedgerError::UserNotFound)
    }

    async fn get_balance(&self, user_id: i64) -> Result<Balance, LedgerError> {
        let t = self.tables.lock().await;
        let user = t
            .users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or(LedgerError::UserNotFound)?;
        let withdrawn = t
            .withdrawals
            .iter()
            .filter(|w| w.user_id == user_id)
            .map(|w| w.sum)
            .sum();
        Ok(Balance {
            current: user.balance,
            withdrawn,
        })
    }

    async fn create_order(
        &self,
        user_id: i64,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<(OrderRecord, bool), LedgerError> {
        let mut t = self.tables.lock().await;
        if let Some(&idx) = t.order_index.get(order_number) {
            return Ok((t.orders[idx].clone(), false));
        }
        t.next_order_id += 1;
        let order = OrderRecord {
            id: t.next_order_id,
            user_id,
            order_number: order_number.to_owned(),
            status,
            accrual: Decimal::ZERO,
            uploaded_at: OffsetDateTime::now_utc(),
        };
        let idx = t.orders.len();
        t.orders.push(order.clone());
        t.order_index.insert(order_number.to_owned(), idx);
        Ok((order, true))
    }

    async fn get_user_orders(&self, user_id: i64) -> Result<Vec<OrderRecord>, LedgerError> {
        let t = self.tables.lock().await;
        let mut orders: Vec<_> = t
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.uploaded_at);
        Ok(orders)
    }

    async fn get_user_withdrawals(
        &self,
        user_id: i64,
    ) -> Result<Vec<WithdrawalRecord>, LedgerError> {
        let t = self.tables.lock().await;
        let mut withdrawals: Vec<_> = t
            .withdrawals
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        withdrawals.sort_by_key(|w| w.processed_at);
        Ok(withdrawals)
    }

    async fn withdraw(
        &self,
        user_id: i64,
        order_number: &str,
        sum: Decimal,
    ) -> Result<(), LedgerError> {
        let mut t = self.tables.lock().await;
        let user = t
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(LedgerError::UserNotFound)?;
        if user.balance - sum < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds);
        }
        user.balance -= sum;
        t.next_withdrawal_id += 1;
        let id = t.next_withdrawal_id;
        t.withdrawals.push(WithdrawalRecord {
            id,
            user_id,
            order_number: order_number.to_owned(),
            sum,
            processed_at: OffsetDateTime::now_utc(),
        });
        Ok(())
    }

    async fn apply_accrual(
        &self,
        order_number: &str,
        status: OrderStatus,
        accrual: Decimal,
    ) -> Result<(), LedgerError> {
        let mut t = self.tables.lock().await;
        let idx = *t
            .order_index
            .get(order_number)
            .ok_or_else(|| LedgerError::OrderNotFound(order_number.to_owned()))?;
        t.orders[idx].status = status;
        t.orders[idx].accrual = accrual;
        let user_id = t.orders[idx].user_id;
        let user = t
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(LedgerError::UserNotFound)?;
        user.balance += accrual;
        Ok(())
    }

    async fn get_pending_orders(&self) -> Result<Vec<OrderRecord>, LedgerError> {
        let t = self.tables.lock().await;
        Ok(t.orders
            .iter()
            .filter(|o| !o.status.is_terminal())
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        Ok(())
    }
}
