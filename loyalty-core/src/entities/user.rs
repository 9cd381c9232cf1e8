use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub login: String,
    pub hashed_password: String,
    pub balance: Decimal,
    pub created_at: OffsetDateTime,
}

/// Derived balance pair: the live balance plus the all-time withdrawn sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct Balance {
    pub current: Decimal,
    pub withdrawn: Decimal,
}

impl UserRecord {
    #[tracing::instrument(skip_all, err, name = "SQL:CreateUser")]
    pub async fn insert(
        pool: &PgPool,
        login: &str,
        hashed_password: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO users (login, hashed_password) VALUES ($1, $2)")
            .bind(login)
            .bind(hashed_password)
            .execute(pool)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip_all, err, name = "SQL:SelectUser")]
    pub async fn by_login(pool: &PgPool, login: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, login, hashed_password, balance, created_at
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(pool)
        .await
    }

    #[tracing::instrument(skip_all, err, name = "SQL:GetUserBalance")]
    pub async fn balance(pool: &PgPool, user_id: i64) -> Result<Option<Balance>, sqlx::Error> {
        sqlx::query_as::<_, Balance>(
            r#"
            SELECT u.balance AS current,
                   (SELECT COALESCE(SUM(w.sum), 0)
                    FROM withdrawals w
                    WHERE w.user_id = u.id) AS withdrawn
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Debit inside an open transaction. The `balance >= 0` CHECK rejects
    /// overdrafts at the store; callers map that violation.
    #[tracing::instrument(skip_all, err, name = "SQL:DebitBalance")]
    pub async fn debit_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        sum: Decimal,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET balance = balance - $1 WHERE id = $2")
            .bind(sum)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip_all, err, name = "SQL:CreditBalance")]
    pub async fn credit_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        amount: Decimal,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET balance = balance + $1 WHERE id = $2")
            .bind(amount)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
