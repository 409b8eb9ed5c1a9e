use crate::commands::Out;
use crate::error::error_type;
use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{error, warn};

pub(super) fn to_content<T>(out: Out<T>) -> Vec<Content>
where
    T: Debug + Clone + Serialize,
{
    let mut content = vec![Content::text(out.message())];
    if let Some(object) = out.structure() {
        match Content::json(object) {
            Ok(json) => content.push(json),
            Err(e) => error!("Unable to serialize JSON output: {e}"),
        };
    }
    content
}

/// Renders an error as tool output text, prefixed with its kind, e.g. `[not_found] ...`.
pub(super) fn error_text(e: &crate::Error) -> String {
    match error_type(e) {
        Some(kind) => format!("[{kind}] {e:#}"),
        None => format!("{e:#}"),
    }
}

pub(super) fn tool_result<T>(result: crate::Result<Out<T>>) -> Result<CallToolResult, ErrorData>
where
    T: Debug + Clone + Serialize,
{
    Ok(match result {
        Ok(out) => CallToolResult::success(to_content(out)),
        Err(e) => {
            let text = error_text(&e);
            warn!("MCP: tool call failed: {text}");
            CallToolResult::error(vec![Content::text(text)])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{typed_error, ErrorType};
    use anyhow::{anyhow, Context};

    #[test]
    fn test_error_text_prefixes_kind() {
        let e = typed_error(ErrorType::NotFound, "Expense not found: abc");
        assert_eq!(error_text(&e), "[not_found] Expense not found: abc");
    }

    #[test]
    fn test_error_text_includes_context() {
        let e = typed_error(ErrorType::Validation, "Month must be between 1 and 12, got 13");
        let e = Err::<(), _>(e).context("Unable to build report").unwrap_err();
        assert_eq!(
            error_text(&e),
            "[validation] Unable to build report: Month must be between 1 and 12, got 13"
        );
    }

    #[test]
    fn test_error_text_untyped() {
        assert_eq!(error_text(&anyhow!("boom")), "boom");
    }

    #[test]
    fn test_tool_result_success_has_json() {
        let out = Out::new("Found 1 category", vec!["Food".to_string()]);
        let result = tool_result(Ok(out)).unwrap();
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(result.content.len(), 2);
    }
}
