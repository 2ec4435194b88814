//! Builders for the outbound user message.

use crate::types::{Message, SendMessageConfiguration, SendMessageParams};
use crate::utils::constants::ACCEPTED_OUTPUT_MODES;

/// Creates a user message containing a single text part.
///
/// # Example
///
/// ```
/// use a2a_inspector::utils::new_user_text_message;
///
/// let message = new_user_text_message("Hello", "req-1", Some("ctx-1".to_string()), None);
/// assert_eq!(message.role, a2a_inspector::types::Role::User);
/// assert_eq!(message.message_id, "req-1");
/// ```
pub fn new_user_text_message(
    text: impl Into<String>,
    message_id: impl Into<String>,
    context_id: Option<String>,
    metadata: Option<serde_json::Value>,
) -> Message {
    let mut message = Message::user(message_id, text);
    message.context_id = context_id;
    message.metadata = metadata;
    message
}

/// Wraps `message` in `message/send` parameters with the inspector's
/// accepted output modes.
pub fn new_send_params(message: Message) -> SendMessageParams {
    SendMessageParams {
        message,
        configuration: Some(SendMessageConfiguration {
            accepted_output_modes: Some(
                ACCEPTED_OUTPUT_MODES.iter().map(|m| m.to_string()).collect(),
            ),
            ..Default::default()
        }),
        metadata: None,
    }
}
