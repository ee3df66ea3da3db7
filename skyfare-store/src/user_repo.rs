use sqlx::PgConnection;

pub struct UserRepository;

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    password_hash: Vec<u8>,
    password_salt: Vec<u8>,
}

impl UserRepository {
    pub async fn exists(conn: &mut PgConnection, username: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&mut *conn)
            .await?;

        Ok(row.0)
    }

    pub async fn insert(
        conn: &mut PgConnection,
        username: &str,
        password_hash: &[u8],
        password_salt: &[u8],
        balance: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, password_salt, balance)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(password_salt)
        .bind(balance)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Stored hash and salt for a username, or None when the user does not
    /// exist. Callers decide how much of that distinction to reveal.
    pub async fn credentials(
        conn: &mut PgConnection,
        username: &str,
    ) -> Result<Option<(Vec<u8>, Vec<u8>)>, sqlx::Error> {
        let row: Option<CredentialRow> = sqlx::query_as(
            "SELECT password_hash, password_salt FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(|r| (r.password_hash, r.password_salt)))
    }

    pub async fn balance(conn: &mut PgConnection, username: &str) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT balance FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&mut *conn)
            .await?;

        Ok(row.0)
    }

    /// Applies a signed delta to the account balance. Debits pass a negative
    /// amount; the schema refuses to let a balance go below zero.
    pub async fn adjust_balance(
        conn: &mut PgConnection,
        username: &str,
        delta: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET balance = balance + $2 WHERE username = $1")
            .bind(username)
            .bind(delta)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
