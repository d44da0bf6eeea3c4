use std::{future::Future, time::Duration};

use sqlx::{
    Connection,
    postgres::{PgConnectOptions, PgConnection},
};

use crate::{config::DbConfig, constants};

/// Bounded exponential backoff: after failed attempt n the caller waits base^n seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: constants::DB_CONNECT_MAX_ATTEMPTS,
            base_secs: constants::DB_CONNECT_BACKOFF_BASE_SECS,
        }
    }
}

impl RetryPolicy {
    /// Delay slept after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.base_secs.saturating_pow(attempt))
    }
}

/// Opens one connection, giving up after the per-attempt connect timeout.
pub async fn connect(db: &DbConfig) -> Result<PgConnection, sqlx::Error> {
    let options = PgConnectOptions::new()
        .host(&db.host)
        .port(db.port)
        .username(&db.user)
        .password(&db.password)
        .database(&db.name);

    match tokio::time::timeout(
        Duration::from_secs(constants::DB_CONNECT_TIMEOUT_SECS),
        PgConnection::connect_with(&options),
    )
    .await
    {
        Ok(conn) => conn,
        Err(_) => Err(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!(
                "connect to {}:{} timed out after {}s",
                db.host,
                db.port,
                constants::DB_CONNECT_TIMEOUT_SECS
            ),
        ))),
    }
}

/// Calls `connect` until it succeeds or the policy runs out of attempts.
/// Returns the last error together with the number of attempts made.
pub async fn connect_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut connect: F,
) -> Result<T, (u32, sqlx::Error)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 1;
    loop {
        match connect().await {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                log::warn!("Postgres connection attempt {} failed: {}", attempt, e);
                if attempt >= policy.max_attempts {
                    return Err((attempt, e));
                }
                tokio::time::sleep(policy.delay_after(attempt)).await;
                attempt += 1;
            }
        }
    }
}
