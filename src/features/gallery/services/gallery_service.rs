use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, error};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::gallery::dtos::{GalleryItemDto, GalleryKind, GalleryPage, Leaderboard};
use crate::modules::rpc::RpcClient;
use crate::shared::relations::normalize_fields;
use crate::shared::types::PaginationQuery;

/// Relations embedded by the gallery procedures
const RELATION_FIELDS: &[&str] = &["owner", "club"];

/// Read-only gallery data served through aggregation procedures
pub struct GalleryService {
    rpc: Arc<dyn RpcClient>,
}

impl GalleryService {
    pub fn new(rpc: Arc<dyn RpcClient>) -> Self {
        Self { rpc }
    }

    /// One page of a gallery plus the collection total
    pub async fn list(
        &self,
        kind: GalleryKind,
        pagination: &PaginationQuery,
        upcoming: Option<bool>,
    ) -> Result<(Vec<GalleryItemDto>, i64)> {
        let mut args = json!({
            "limit": pagination.limit(),
            "offset": pagination.offset(),
        });
        if let Some(upcoming) = upcoming {
            args["upcoming"] = Value::Bool(upcoming);
        }

        let procedure = kind.list_procedure();
        let raw = self.rpc.call(procedure, args).await?;
        if raw.is_null() {
            return Ok((Vec::new(), 0));
        }

        let page: GalleryPage = serde_json::from_value(raw).map_err(|e| {
            error!(procedure, "Unexpected gallery payload: {}", e);
            AppError::Internal(format!("Malformed result from {}", procedure))
        })?;

        let items = page
            .items
            .into_iter()
            .map(|item| to_item(procedure, item))
            .collect::<Result<Vec<_>>>()?;

        debug!(procedure, count = items.len(), total = page.total, "Gallery page");
        Ok((items, page.total))
    }

    pub async fn detail(&self, kind: GalleryKind, id: Uuid) -> Result<GalleryItemDto> {
        let procedure = kind.detail_procedure();
        let raw = self.rpc.call(procedure, json!({ "id": id })).await?;

        if raw.is_null() {
            return Err(AppError::NotFound(kind.not_found_message().to_string()));
        }

        to_item(procedure, raw)
    }

    /// Top entries of `board`, ranked from 1 in procedure order
    pub async fn leaderboard(&self, board: Leaderboard, limit: i64) -> Result<Vec<GalleryItemDto>> {
        let procedure = "get_leaderboard";
        let raw = self
            .rpc
            .call(procedure, json!({ "board": board.as_str(), "limit": limit }))
            .await?;

        let entries = match raw {
            Value::Null => Vec::new(),
            Value::Array(entries) => entries,
            other => {
                error!(procedure, board = %board, "Leaderboard is not an array: {}", other);
                return Err(AppError::Internal(format!(
                    "Malformed result from {}",
                    procedure
                )));
            }
        };

        entries
            .into_iter()
            .take(limit.max(0) as usize)
            .enumerate()
            .map(|(index, entry)| {
                let mut item = to_item(procedure, entry)?;
                item.0.insert("rank".to_string(), json!(index as i64 + 1));
                Ok(item)
            })
            .collect()
    }
}

fn to_item(procedure: &str, value: Value) -> Result<GalleryItemDto> {
    match value {
        Value::Object(mut object) => {
            normalize_fields(&mut object, RELATION_FIELDS);
            Ok(GalleryItemDto(object))
        }
        other => {
            error!(procedure, "Expected an object, got: {}", other);
            Err(AppError::Internal(format!(
                "Malformed result from {}",
                procedure
            )))
        }
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::core::error::Result;
    use crate::modules::rpc::{ensure_procedure_name, RpcClient};

    /// Canned procedure results, recording every call
    #[derive(Default)]
    pub struct StubRpc {
        results: HashMap<String, Value>,
        pub calls: Mutex<Vec<(String, Value)>>,
    }

    impl StubRpc {
        pub fn returning(mut self, procedure: &str, result: Value) -> Self {
            self.results.insert(procedure.to_string(), result);
            self
        }

        pub fn last_args(&self) -> Option<Value> {
            self.calls.lock().unwrap().last().map(|(_, args)| args.clone())
        }
    }

    #[async_trait]
    impl RpcClient for StubRpc {
        async fn call(&self, procedure: &str, args: Value) -> Result<Value> {
            ensure_procedure_name(procedure)?;
            self.calls
                .lock()
                .unwrap()
                .push((procedure.to_string(), args));
            Ok(self.results.get(procedure).cloned().unwrap_or(Value::Null))
        }
    }
}
