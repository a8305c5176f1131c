//! Reconciliation of an agent's tool list against the fixed calendar set.

use serde_json::Value;

use crate::tools::CalendarTool;

/// Name of a tool entry, if it has one. Entries without a name are foreign
/// by definition.
fn tool_name(tool: &Value) -> Option<&str> {
    tool.get("name").and_then(Value::as_str)
}

/// Merge the desired calendar tools into an existing tool list.
///
/// Drops every existing entry whose name is one of the four calendar tool
/// names, keeps everything else in order, and appends the desired set.
/// Repeated application converges to exactly one definition per calendar
/// tool name, which is what makes registration idempotent.
pub fn reconcile(existing: Vec<Value>, desired: Vec<Value>) -> Vec<Value> {
    let mut merged: Vec<Value> = existing
        .into_iter()
        .filter(|t| tool_name(t).and_then(CalendarTool::from_name).is_none())
        .collect();
    merged.extend(desired);
    merged
}

/// Remove the four calendar tools, leaving foreign entries untouched.
pub fn strip_calendar_tools(existing: Vec<Value>) -> Vec<Value> {
    reconcile(existing, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::build_tool_definitions;
    use serde_json::json;

    #[test]
    fn test_reconcile_is_idempotent() {
        let desired = build_tool_definitions("https://app.example.com", "tok_a");
        let existing = vec![json!({ "type": "custom", "name": "other_tool" })];

        let once = reconcile(existing, desired.clone());
        let twice = reconcile(once.clone(), desired);

        assert_eq!(once.len(), 5);
        assert_eq!(twice.len(), 5);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reconcile_replaces_stale_token_urls() {
        let stale = build_tool_definitions("https://app.example.com", "tok_old");
        let fresh = build_tool_definitions("https://app.example.com", "tok_new");

        let merged = reconcile(stale, fresh);

        assert_eq!(merged.len(), 4);
        for tool in &merged {
            let url = tool["url"].as_str().unwrap();
            assert!(url.contains("token=tok_new"), "stale URL survived: {url}");
        }
    }

    #[test]
    fn test_strip_leaves_foreign_tools() {
        let mut tools = vec![
            json!({ "name": "transfer_call" }),
            json!({ "name": "end_call" }),
        ];
        tools.extend(build_tool_definitions("https://app.example.com", "tok"));

        let stripped = strip_calendar_tools(tools);

        let names: Vec<_> = stripped.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["transfer_call", "end_call"]);
    }

    #[test]
    fn test_unnamed_entries_are_preserved() {
        let tools = vec![json!({ "type": "end_call" })];
        let stripped = strip_calendar_tools(tools.clone());
        assert_eq!(stripped, tools);
    }
}
