use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;

/// A single spend of bonus points. Rows are append-only; the referenced
/// order number is not required to exist in `orders`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct WithdrawalRecord {
    pub id: i64,
    pub user_id: i64,
    pub order_number: String,
    pub sum: Decimal,
    pub processed_at: OffsetDateTime,
}

impl WithdrawalRecord {
    #[tracing::instrument(skip_all, err, name = "SQL:CreateWithdrawal")]
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        order_number: &str,
        sum: Decimal,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO withdrawals (user_id, order_number, sum) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(order_number)
            .bind(sum)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip_all, err, name = "SQL:GetUserWithdrawals")]
    pub async fn for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, user_id, order_number, sum, processed_at
            FROM withdrawals
            WHERE user_id = $1
            ORDER BY processed_at
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
