//! Completion collaborator seam: request shaping and reply handling.
//!
//! No network client ships here. A [`Completion`] implementation receives the prepared
//! request body and returns a [`Reply`]; the core stores it and renders it in the reply's format.

use serde_json::{Value, json};

use crate::core::history::{ChatStore, HistoryError, append_message};
use crate::core::message::{Format, Message, Role};
use crate::core::render::{MessageView, Renderer};

/// Appended to json-format prompts that do not already ask for JSON.
pub const JSON_INSTRUCTION: &str = " Please provide the response in JSON format.";

/// Prompt text actually sent for `input` under `format`.
pub fn prepare_prompt(input: &str, format: Format) -> String {
    if format == Format::Json && !input.to_lowercase().contains("json") {
        format!("{}{}", input, JSON_INSTRUCTION)
    } else {
        input.to_string()
    }
}

/// Chat-completions request body for a single user turn.
pub fn request_body(model: &str, input: &str, format: Format) -> Value {
    let response_type = match format {
        Format::Json => "json_object",
        _ => "text",
    };
    json!({
        "model": model,
        "messages": [{ "role": "user", "content": prepare_prompt(input, format) }],
        "response_format": { "type": response_type },
    })
}

/// Text returned by the provider and the format it should be rendered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub format: Format,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Request(String),
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Remote language-model call. `format` is the format the reply was requested in;
/// implementations usually tag the reply with it.
pub trait Completion: Send + Sync {
    fn complete(&self, body: &Value, format: Format) -> Result<Reply, CompletionError>;
}

/// One user turn: store and render the user message, ask `completion`, then store and
/// render the reply. The user message stays stored if the completion fails.
pub fn exchange(
    store: &dyn ChatStore,
    renderer: &Renderer,
    completion: &dyn Completion,
    model: &str,
    chat_id: &str,
    input: &str,
    format: Format,
) -> Result<(MessageView, MessageView), CompletionError> {
    let user = Message::new(chat_id, Role::User, input, Format::Text);
    append_message(store, &user)?;
    let user_view = renderer.render_message(&user);

    let body = request_body(model, input, format);
    log::debug!("Requesting {} completion from {}", format, model);
    let reply = completion.complete(&body, format)?;

    let assistant = Message::new(chat_id, Role::Assistant, &reply.content, reply.format);
    append_message(store, &assistant)?;
    let assistant_view = renderer.render_message(&assistant);
    Ok((user_view, assistant_view))
}
