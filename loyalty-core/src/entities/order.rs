use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: i64,
    pub user_id: i64,
    pub order_number: String,
    pub status: OrderStatus,
    pub accrual: Decimal,
    pub uploaded_at: OffsetDateTime,
}

/// Order lifecycle state. NEW and PROCESSING orders are eligible for
/// polling; INVALID and PROCESSED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    New,
    Processing,
    Invalid,
    Processed,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Invalid | OrderStatus::Processed)
    }
}

#[derive(sqlx::FromRow)]
struct InsertOrFetchRow {
    id: i64,
    user_id: i64,
    order_number: String,
    status: OrderStatus,
    accrual: Decimal,
    uploaded_at: OffsetDateTime,
    is_new: bool,
}

impl OrderRecord {
    /// Insert-or-fetch in a single statement, so concurrent submitters of
    /// the same number cannot both observe "new". Returns the row and
    /// whether this call inserted it.
    #[tracing::instrument(skip_all, err, name = "SQL:CreateOrder")]
    pub async fn insert_or_fetch(
        pool: &PgPool,
        user_id: i64,
        order_number: &str,
        status: OrderStatus,
    ) -> Result<(Self, bool), sqlx::Error> {
        let row = sqlx::query_as::<_, InsertOrFetchRow>(
            r#"
            WITH ins AS (
                INSERT INTO orders (user_id, order_number, status)
                VALUES ($1, $2, $3)
                ON CONFLICT (order_number) DO NOTHING
                RETURNING id, user_id, order_number, status, accrual, uploaded_at,
                          TRUE AS is_new
            )
            SELECT id, user_id, order_number, status, accrual, uploaded_at, is_new
            FROM ins
            UNION ALL
            SELECT id, user_id, order_number, status, accrual, uploaded_at,
                   FALSE AS is_new
            FROM orders
            WHERE order_number = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(order_number)
        .bind(status)
        .fetch_one(pool)
        .await?;

        let is_new = row.is_new;
        Ok((
            Self {
                id: row.id,
                user_id: row.user_id,
                order_number: row.order_number,
                status: row.status,
                accrual: row.accrual,
                uploaded_at: row.uploaded_at,
            },
            is_new,
        ))
    }

    #[tracing::instrument(skip_all, err, name = "SQL:GetUserOrders")]
    pub async fn for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, user_id, order_number, status, accrual, uploaded_at
            FROM orders
            WHERE user_id = $1
            ORDER BY uploaded_at
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Orders still eligible for polling. Terminal orders never reappear
    /// here, which is what keeps them from being re-dispatched.
    #[tracing::instrument(skip_all, err, name = "SQL:GetPendingOrders")]
    pub async fn pending(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, user_id, order_number, status, accrual, uploaded_at
            FROM orders
            WHERE status IN ('NEW', 'PROCESSING')
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Update status and accrual inside an open transaction, returning the
    /// owner's id (`None` when no such order exists).
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateOrder")]
    pub async fn apply_accrual_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_number: &str,
        status: OrderStatus,
        accrual: Decimal,
    ) -> Result<Option<i64>, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE orders
            SET status = $1, accrual = $2
            WHERE order_number = $3
            RETURNING user_id
            "#,
        )
        .bind(status)
        .bind(accrual)
        .bind(order_number)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.map(|(user_id,)| user_id))
    }
}
