//! Remote procedure calls into server-side aggregation functions
//!
//! Every procedure takes a single `jsonb` argument and returns `jsonb`
//! (possibly null). See `migrations/` for their definitions.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::shared::validation::RPC_NAME_REGEX;

#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Invoke `procedure(args)`; `Value::Null` when it returns SQL NULL
    async fn call(&self, procedure: &str, args: Value) -> Result<Value>;
}

pub struct PgRpcClient {
    pool: PgPool,
}

impl PgRpcClient {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Reject anything that is not a bare lowercase identifier
pub fn ensure_procedure_name(procedure: &str) -> Result<()> {
    if RPC_NAME_REGEX.is_match(procedure) {
        Ok(())
    } else {
        Err(AppError::Internal(format!(
            "Refusing to call invalid procedure name '{}'",
            procedure
        )))
    }
}

#[async_trait]
impl RpcClient for PgRpcClient {
    async fn call(&self, procedure: &str, args: Value) -> Result<Value> {
        ensure_procedure_name(procedure)?;

        let started = Instant::now();
        let sql = format!("SELECT public.{}($1::jsonb)", procedure);

        let result: Option<Value> = sqlx::query_scalar(&sql)
            .bind(args)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(procedure, "RPC call failed: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::debug!(
            procedure,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "RPC call completed"
        );

        Ok(result.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedure_name_guard() {
        assert!(ensure_procedure_name("get_leaderboard").is_ok());
        assert!(ensure_procedure_name("get_leaderboard(); DROP TABLE users").is_err());
        assert!(ensure_procedure_name("").is_err());
    }
}
