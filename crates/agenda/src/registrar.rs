//! Tool registration and de-registration on a client's voice agent.
//!
//! Registration resolves the agent's Retell-LLM configuration, merges the
//! four calendar tools into its tool list, appends the agenda prompt
//! section, and writes everything back in a single update call. All merging
//! happens in memory first, so a failure anywhere leaves the agent exactly
//! as it was.

use database::{client, SqlitePool};
use retell::{LlmUpdate, RetellClient, RetellLlm};
use tracing::{debug, info};

use crate::error::{AgendaError, Result};
use crate::prompt::{append_agenda_section, remove_agenda_section};
use crate::reconcile::{reconcile, strip_calendar_tools};
use crate::tools::build_tool_definitions;

/// Everything registration needs from the client record.
struct RetellTarget {
    api_key: String,
    agent_id: String,
}

fn retell_target(record: &database::Client) -> Result<RetellTarget> {
    let api_key = record
        .retell_api_key
        .clone()
        .ok_or(AgendaError::Misconfigured {
            missing: "Retell API key",
        })?;
    let agent_id = record
        .retell_agent_id
        .clone()
        .ok_or(AgendaError::Misconfigured {
            missing: "Retell agent id",
        })?;

    Ok(RetellTarget { api_key, agent_id })
}

async fn fetch_llm(retell: &RetellClient, agent_id: &str) -> Result<RetellLlm> {
    let agent = retell.get_agent(agent_id).await?;
    let llm_id = agent
        .response_engine
        .llm_id
        .ok_or(AgendaError::Misconfigured {
            missing: "a retell-llm response engine",
        })?;

    Ok(retell.get_llm(&llm_id).await?)
}

/// Compute the update that registers the calendar tools on an LLM config.
///
/// Pure: the merged tool list replaces any stale calendar entries and the
/// prompt gains the agenda section at most once, so applying the plan
/// repeatedly converges.
pub fn registration_plan(llm: &RetellLlm, base_url: &str, webhook_token: &str) -> LlmUpdate {
    let existing = llm.general_tools.clone().unwrap_or_default();
    let desired = build_tool_definitions(base_url, webhook_token);

    LlmUpdate {
        general_prompt: append_agenda_section(llm.general_prompt.as_deref().unwrap_or_default()),
        general_tools: reconcile(existing, desired),
    }
}

/// Compute the update that removes the calendar tools from an LLM config.
/// Returns `None` when there is nothing to remove.
pub fn removal_plan(llm: &RetellLlm) -> Option<LlmUpdate> {
    let existing = llm.general_tools.clone().unwrap_or_default();
    let prompt = llm.general_prompt.clone().unwrap_or_default();

    let stripped = strip_calendar_tools(existing.clone());
    let cleaned = remove_agenda_section(&prompt);

    if stripped.len() == existing.len() && cleaned == prompt {
        return None;
    }

    Some(LlmUpdate {
        general_prompt: cleaned,
        general_tools: stripped,
    })
}

/// Register the four calendar tools on the client's agent.
///
/// Requires the client to have a Retell API key, an agent id, and a webhook
/// token; a missing precondition fails the whole operation before anything
/// is written. Safe to call repeatedly.
pub async fn register_calendar_tools(
    pool: &SqlitePool,
    retell_base: &str,
    public_base_url: &str,
    client_id: &str,
) -> Result<()> {
    let record = client::get_client(pool, client_id).await?;
    let target = retell_target(&record)?;
    let webhook_token = record.webhook_token.ok_or(AgendaError::Misconfigured {
        missing: "a webhook token",
    })?;

    let retell = RetellClient::with_base_url(target.api_key, retell_base);
    let llm = fetch_llm(&retell, &target.agent_id).await?;

    let update = registration_plan(&llm, public_base_url, &webhook_token);
    retell.update_llm(&llm.llm_id, &update).await?;

    info!(
        client_id,
        agent_id = %target.agent_id,
        tools = update.general_tools.len(),
        "Registered calendar tools"
    );
    Ok(())
}

/// Remove the calendar tools and prompt section from the client's agent.
///
/// Best-effort cleanup: a client with no Retell API key or agent configured
/// has nothing to clean up, so this silently succeeds. Calling it when the
/// tools were never registered is a no-op.
pub async fn unregister_calendar_tools(
    pool: &SqlitePool,
    retell_base: &str,
    client_id: &str,
) -> Result<()> {
    let record = client::get_client(pool, client_id).await?;
    let target = match retell_target(&record) {
        Ok(target) => target,
        Err(_) => {
            debug!(client_id, "No Retell agent configured; nothing to unregister");
            return Ok(());
        }
    };

    let retell = RetellClient::with_base_url(target.api_key, retell_base);
    let llm = fetch_llm(&retell, &target.agent_id).await?;

    match removal_plan(&llm) {
        Some(update) => {
            retell.update_llm(&llm.llm_id, &update).await?;
            info!(client_id, agent_id = %target.agent_id, "Unregistered calendar tools");
        }
        None => {
            debug!(client_id, "No calendar tools registered; nothing to remove");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::AGENDA_HEADING;
    use crate::tools::CalendarTool;
    use serde_json::json;

    fn llm_with(prompt: &str, tools: Vec<serde_json::Value>) -> RetellLlm {
        serde_json::from_value(json!({
            "llm_id": "llm_9",
            "general_prompt": prompt,
            "general_tools": tools,
        }))
        .unwrap()
    }

    #[test]
    fn test_end_to_end_registration_scenario() {
        let llm = llm_with("Be polite.", vec![json!({ "name": "other_tool" })]);

        let update = registration_plan(&llm, "https://app.example.com", "tok_123");

        // other_tool plus the four calendar tools
        assert_eq!(update.general_tools.len(), 5);
        assert_eq!(update.general_tools[0]["name"], "other_tool");
        for tool in &update.general_tools[1..] {
            let url = tool["url"].as_str().unwrap();
            assert!(url.contains("token=tok_123"), "missing token in {url}");
        }

        // prompt is the original followed by the agenda section, once
        assert!(update.general_prompt.starts_with("Be polite.\n\n## Gestión de Agenda"));
        assert_eq!(update.general_prompt.matches(AGENDA_HEADING).count(), 1);
    }

    #[test]
    fn test_registering_twice_yields_four_calendar_tools() {
        let llm = llm_with("Be polite.", vec![json!({ "name": "other_tool" })]);

        let first = registration_plan(&llm, "https://app.example.com", "tok_123");
        let after_first = llm_with(&first.general_prompt, first.general_tools);
        let second = registration_plan(&after_first, "https://app.example.com", "tok_123");

        let calendar_count = second
            .general_tools
            .iter()
            .filter(|t| {
                t["name"]
                    .as_str()
                    .and_then(CalendarTool::from_name)
                    .is_some()
            })
            .count();
        assert_eq!(calendar_count, 4);
        assert_eq!(second.general_tools.len(), 5);
        assert_eq!(second.general_prompt.matches(AGENDA_HEADING).count(), 1);
    }

    #[test]
    fn test_reregistration_picks_up_rotated_token() {
        let llm = llm_with("", vec![]);
        let first = registration_plan(&llm, "https://app.example.com", "tok_old");

        let after_first = llm_with(&first.general_prompt, first.general_tools);
        let second = registration_plan(&after_first, "https://app.example.com", "tok_new");

        assert_eq!(second.general_tools.len(), 4);
        for tool in &second.general_tools {
            assert!(tool["url"].as_str().unwrap().contains("token=tok_new"));
        }
    }

    #[test]
    fn test_removal_leaves_foreign_tools_and_prompt() {
        let llm = llm_with("Be polite.", vec![
            json!({ "name": "transfer_call" }),
            json!({ "name": "end_call" }),
        ]);
        let registered = registration_plan(&llm, "https://app.example.com", "tok_123");
        let after = llm_with(&registered.general_prompt, registered.general_tools);

        let update = removal_plan(&after).expect("calendar tools were registered");

        let names: Vec<_> = update
            .general_tools
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["transfer_call", "end_call"]);
        assert!(!update.general_prompt.contains(AGENDA_HEADING));
        assert_eq!(update.general_prompt, "Be polite.");
    }

    #[test]
    fn test_removal_plan_is_none_when_never_registered() {
        let llm = llm_with("Be polite.", vec![json!({ "name": "other_tool" })]);
        assert!(removal_plan(&llm).is_none());
    }

    #[test]
    fn test_misconfigured_client_names_missing_field() {
        let record: database::Client = serde_json::from_value(json!({
            "id": "c1",
            "name": "Test",
            "email": null,
            "retell_api_key": null,
            "retell_agent_id": "ag_1",
            "webhook_token": null,
            "created_at": "",
            "updated_at": "",
        }))
        .unwrap();

        match retell_target(&record) {
            Err(AgendaError::Misconfigured { missing }) => {
                assert_eq!(missing, "Retell API key")
            }
            Err(other) => panic!("expected Misconfigured, got {other:?}"),
            Ok(_) => panic!("expected Misconfigured, got Ok"),
        }
    }
}
