//! Category discovery

use cdp_client::CdpConnection;
use cdp_types::domains::tracing::GetCategoriesResult;

use crate::error::{Result, SessionError};

/// Fetch the category names the endpoint is able to record
pub async fn list_categories(conn: &dyn CdpConnection) -> Result<Vec<String>> {
    let result = conn
        .issue_command("Tracing.getCategories", None)
        .await
        .map_err(|e| SessionError::command("Tracing.getCategories", e))?;
    let parsed: GetCategoriesResult = serde_json::from_value(result)
        .map_err(|e| SessionError::command("Tracing.getCategories", e.into()))?;
    Ok(parsed.categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cdp_client::{CdpClientError, EventStream};
    use serde_json::{json, Value};

    struct FixedConnection {
        response: Value,
    }

    #[async_trait]
    impl CdpConnection for FixedConnection {
        async fn issue_command(
            &self,
            method: &str,
            params: Option<Value>,
        ) -> std::result::Result<Value, CdpClientError> {
            assert_eq!(method, "Tracing.getCategories");
            assert!(params.is_none());
            Ok(self.response.clone())
        }

        async fn subscribe(&self, _method: &str) -> std::result::Result<EventStream, CdpClientError> {
            Err(CdpClientError::ConnectionClosed)
        }

        async fn close(&self) {}
    }

    #[tokio::test]
    async fn test_list_categories() {
        let conn = FixedConnection {
            response: json!({ "categories": ["blink", "v8", "disabled-by-default-memory-infra"] }),
        };
        let categories = list_categories(&conn).await.unwrap();
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[0], "blink");
    }

    #[tokio::test]
    async fn test_malformed_result_is_an_error() {
        let conn = FixedConnection {
            response: json!({ "unexpected": true }),
        };
        let result = list_categories(&conn).await;
        assert!(matches!(result, Err(SessionError::Command { .. })));
    }
}
