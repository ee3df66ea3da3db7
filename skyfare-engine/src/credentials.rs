use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha1::Sha1;
use skyfare_core::Session;
use skyfare_store::retry::TxMode;
use skyfare_store::UserRepository;
use subtle::ConstantTimeEq;

use crate::error::EngineError;
use crate::{render_failure, ReservationEngine};

const SALT_LEN: usize = 16;
const KDF_ITERATIONS: u32 = 65_536;
const KDF_OUTPUT_LEN: usize = 16;

fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// PBKDF2-HMAC-SHA1 over the password and salt. Deliberately expensive;
/// always computed outside any open transaction.
fn derive_hash(password: &str, salt: &[u8]) -> [u8; KDF_OUTPUT_LEN] {
    let mut out = [0u8; KDF_OUTPUT_LEN];
    pbkdf2_hmac::<Sha1>(password.as_bytes(), salt, KDF_ITERATIONS, &mut out);
    out
}

/// Constant-time comparison of a candidate password against a stored digest.
fn verify_password(password: &str, salt: &[u8], expected: &[u8]) -> bool {
    let candidate = derive_hash(password, salt);
    candidate.ct_eq(expected).into()
}

impl ReservationEngine {
    /// Creates an account with a starting balance. Usernames are unique; a
    /// taken name, a negative balance, or any store fault all report the
    /// same generic failure.
    pub async fn create_user(&self, username: &str, password: &str, initial_balance: i64) -> String {
        match self
            .create_user_tx(username, password, initial_balance)
            .await
        {
            Ok(()) => format!("Created user {}\n", username),
            Err(err) => render_failure(err, "Failed to create user\n".to_string()),
        }
    }

    async fn create_user_tx(
        &self,
        username: &str,
        password: &str,
        initial_balance: i64,
    ) -> Result<(), EngineError> {
        if initial_balance < 0 {
            return Err(EngineError::InvalidSignupInput);
        }

        let salt = generate_salt();
        let hash = derive_hash(password, &salt);

        let result = self
            .transact(TxMode::ReadWrite, |conn| {
                let username = username.to_string();
                let hash = hash.to_vec();
                let salt = salt.to_vec();
                Box::pin(async move {
                    if UserRepository::exists(conn, &username).await? {
                        return Err(EngineError::InvalidSignupInput);
                    }
                    UserRepository::insert(conn, &username, &hash, &salt, initial_balance).await?;
                    Ok(())
                })
            })
            .await;

        // Two signups can race past the existence probe; the unique
        // constraint settles it, and the loser reads like any duplicate.
        match result {
            Err(EngineError::Store(err)) if err.is_unique_violation() => {
                Err(EngineError::InvalidSignupInput)
            }
            other => other,
        }
    }

    /// Authenticates the session. Unknown usernames and wrong passwords are
    /// indistinguishable from the outside.
    pub async fn login(&self, session: &mut Session, username: &str, password: &str) -> String {
        match self.login_tx(session, username, password).await {
            Ok(()) => format!("Logged in as {}\n", username),
            Err(err) => render_failure(err, "Login failed\n".to_string()),
        }
    }

    async fn login_tx(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> Result<(), EngineError> {
        if session.is_logged_in() {
            return Err(EngineError::AlreadyLoggedIn);
        }

        let stored = self
            .transact(TxMode::ReadOnly, |conn| {
                let username = username.to_string();
                Box::pin(async move { Ok(UserRepository::credentials(conn, &username).await?) })
            })
            .await?;

        // The transaction is already closed; only the digest work remains.
        let (hash, salt) = stored.ok_or(EngineError::AuthenticationFailed)?;
        if !verify_password(password, &salt, &hash) {
            return Err(EngineError::AuthenticationFailed);
        }

        session.log_in(username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::offline_engine;

    #[test]
    fn test_kdf_is_deterministic_per_salt() {
        let salt = [7u8; SALT_LEN];
        assert_eq!(derive_hash("secret", &salt), derive_hash("secret", &salt));
        assert_ne!(derive_hash("secret", &salt), derive_hash("Secret", &salt));
    }

    #[test]
    fn test_kdf_output_depends_on_salt() {
        let a = derive_hash("secret", &[1u8; SALT_LEN]);
        let b = derive_hash("secret", &[2u8; SALT_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_salts_differ() {
        // 16 random bytes colliding twice in a row would point at a broken
        // generator, not bad luck.
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn test_verify_password_accepts_only_the_original() {
        let salt = generate_salt();
        let hash = derive_hash("hunter2", &salt);
        assert!(verify_password("hunter2", &salt, &hash));
        assert!(!verify_password("hunter3", &salt, &hash));
        assert!(!verify_password("", &salt, &hash));
    }

    #[tokio::test]
    async fn test_negative_balance_is_rejected_before_the_store() {
        let engine = offline_engine();
        let reply = engine.create_user("alice", "secret", -1).await;
        assert_eq!(reply, "Failed to create user\n");
    }

    #[tokio::test]
    async fn test_second_login_is_rejected_before_the_store() {
        let engine = offline_engine();
        let mut session = Session::new();
        session.log_in("alice");

        let reply = engine.login(&mut session, "bob", "secret").await;
        assert_eq!(reply, "User already logged in\n");
        // The rejection leaves the existing login untouched.
        assert_eq!(session.username(), Some("alice"));
    }

    #[tokio::test]
    async fn test_login_against_dead_store_fails_generically() {
        let engine = offline_engine();
        let mut session = Session::new();
        let reply = engine.login(&mut session, "alice", "secret").await;
        assert_eq!(reply, "Login failed\n");
        assert!(!session.is_logged_in());
    }
}
