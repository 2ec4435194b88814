//! Compliance checks for agent cards and agent responses.
//!
//! Both validators work on raw JSON so that non-compliant payloads can still
//! be displayed alongside a list of human-readable problems. An empty list
//! means no problems were found.

use serde_json::{Map, Value};

const REQUIRED_CARD_FIELDS: [&str; 8] = [
    "name",
    "description",
    "url",
    "version",
    "capabilities",
    "defaultInputModes",
    "defaultOutputModes",
    "skills",
];

/// Check an agent card against the A2A required-field rules.
pub fn validate_agent_card(card: &Value) -> Vec<String> {
    let Some(card) = card.as_object() else {
        return vec!["Agent card must be a JSON object.".to_string()];
    };

    let mut errors: Vec<String> = REQUIRED_CARD_FIELDS
        .iter()
        .filter(|field| !card.contains_key(**field))
        .map(|field| format!("Required field is missing: '{field}'."))
        .collect();

    if let Some(url) = card.get("url") {
        let absolute = url
            .as_str()
            .is_some_and(|u| u.starts_with("http://") || u.starts_with("https://"));
        if !absolute {
            errors.push(
                "Field 'url' must be an absolute URL starting with http:// or https://."
                    .to_string(),
            );
        }
    }

    if let Some(capabilities) = card.get("capabilities") {
        if !capabilities.is_object() {
            errors.push("Field 'capabilities' must be an object.".to_string());
        }
    }

    for field in ["defaultInputModes", "defaultOutputModes"] {
        if let Some(modes) = card.get(field) {
            if !is_string_array(modes) {
                errors.push(format!("Field '{field}' must be an array of strings."));
            }
        }
    }

    match card.get("skills") {
        Some(Value::Array(skills)) if skills.is_empty() => errors.push(
            "Field 'skills' array is empty. Agent must have at least one skill if it performs actions."
                .to_string(),
        ),
        Some(Value::Array(_)) | None => {}
        Some(_) => errors.push("Field 'skills' must be an array of AgentSkill objects.".to_string()),
    }

    errors
}

/// Check one response payload (message, task, or stream update) from an agent.
pub fn validate_message(data: &Value) -> Vec<String> {
    let Some(obj) = data.as_object() else {
        return vec!["Response from agent must be a JSON object.".to_string()];
    };
    let Some(kind) = obj.get("kind") else {
        return vec!["Response from agent is missing required 'kind' field.".to_string()];
    };
    let kind = kind.as_str().unwrap_or_default();

    let mut errors = Vec::new();
    match kind {
        "task" => {
            if obj.get("id").map_or(true, Value::is_null) {
                errors.push("Task object missing required field: 'id'.".to_string());
            }
            if !has_status_state(obj) {
                errors.push("Task object missing required field: 'status.state'.".to_string());
            }
        }
        "status-update" => {
            if !has_status_state(obj) {
                errors.push(
                    "StatusUpdate object missing required field: 'status.state'.".to_string(),
                );
            }
        }
        "artifact-update" => match obj.get("artifact") {
            None => {
                errors.push("ArtifactUpdate object missing required field: 'artifact'.".to_string())
            }
            Some(artifact) => {
                if !has_parts(artifact) {
                    errors.push("Artifact object must have a non-empty 'parts' array.".to_string());
                }
            }
        },
        "message" => {
            if !has_parts(data) {
                errors.push("Message object must have a non-empty 'parts' array.".to_string());
            }
            if obj.get("role").and_then(Value::as_str) != Some("agent") {
                errors.push("Message from agent must have 'role' set to 'agent'.".to_string());
            }
        }
        other => errors.push(format!("Unknown message kind received: '{other}'.")),
    }
    errors
}

fn is_string_array(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(Value::is_string))
}

fn has_status_state(obj: &Map<String, Value>) -> bool {
    obj.get("status")
        .and_then(|status| status.get("state"))
        .is_some_and(|state| !state.is_null())
}

fn has_parts(value: &Value) -> bool {
    value
        .get("parts")
        .and_then(Value::as_array)
        .is_some_and(|parts| !parts.is_empty())
}
