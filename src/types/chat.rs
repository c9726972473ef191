//! Chat-completion request and response bodies.

use crate::types::function::{FunctionCall, FunctionDefinition};
use crate::types::message::Message;
use serde::{Deserialize, Serialize};

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            functions: Vec::new(),
            function_call: None,
            temperature: None,
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Declare `function` and pin `function_call` to it so the model cannot answer in prose.
    pub fn force_function(mut self, function: FunctionDefinition) -> Self {
        self.function_call = Some(FunctionChoice {
            name: function.name.clone(),
        });
        self.functions.push(function);
        self
    }

    pub fn temperature(mut self, t: f64) -> Self {
        self.temperature = Some(t);
        self
    }
}

/// Pinned `function_call` value (`{"name": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionChoice {
    pub name: String,
}

/// Response body of `/chat/completions`.
///
/// Every field defaults so that odd but well-formed JSON still decodes; the
/// caller then finds no function call and reports that instead.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub function_call: Option<FunctionCall>,
}

impl ChatCompletionResponse {
    /// Function call carried by the first choice, if any.
    pub fn first_function_call(&self) -> Option<&FunctionCall> {
        self.choices
            .first()?
            .message
            .as_ref()?
            .function_call
            .as_ref()
    }

    /// Non-empty argument text of the first choice's call to `function_name`.
    ///
    /// A call without a name is accepted since the name was pinned in the request.
    pub fn function_arguments(&self, function_name: &str) -> Option<&str> {
        let call = self.first_function_call()?;
        if call.name.as_deref().is_some_and(|n| n != function_name) {
            return None;
        }
        call.arguments_text().filter(|args| !args.is_empty())
    }

    /// Prose content of the first choice, used for diagnostics.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first()?.message.as_ref()?.content.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> ChatCompletionResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn extracts_arguments_from_first_choice() {
        let resp = decode(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "function_call": {
                        "name": "vikunja_request",
                        "arguments": "{\"method\":\"GET\",\"endpoint\":\"/projects\"}"
                    }
                },
                "finish_reason": "stop"
            }]
        }));
        assert_eq!(
            resp.function_arguments("vikunja_request"),
            Some("{\"method\":\"GET\",\"endpoint\":\"/projects\"}")
        );
    }

    #[test]
    fn prose_answer_has_no_arguments() {
        let resp = decode(json!({
            "choices": [{"message": {"role": "assistant", "content": "Sure!"}}]
        }));
        assert_eq!(resp.function_arguments("vikunja_request"), None);
        assert_eq!(resp.first_content(), Some("Sure!"));
    }

    #[test]
    fn other_function_or_empty_arguments_are_rejected() {
        let other = decode(json!({
            "choices": [{"message": {"function_call": {"name": "other", "arguments": "{}"}}}]
        }));
        assert_eq!(other.function_arguments("vikunja_request"), None);

        let empty = decode(json!({
            "choices": [{"message": {"function_call": {"name": "vikunja_request", "arguments": ""}}}]
        }));
        assert_eq!(empty.function_arguments("vikunja_request"), None);

        let non_string = decode(json!({
            "choices": [{"message": {"function_call": {"name": "vikunja_request", "arguments": {"method": "GET"}}}}]
        }));
        assert_eq!(non_string.function_arguments("vikunja_request"), None);
    }

    #[test]
    fn unexpected_shape_decodes_to_empty() {
        let resp = decode(json!({"object": "list", "data": []}));
        assert!(resp.choices.is_empty());
        assert_eq!(resp.function_arguments("vikunja_request"), None);
    }

    #[test]
    fn request_omits_unset_fields() {
        let body = serde_json::to_value(ChatCompletionRequest::new("m").message(Message::user("x"))).unwrap();
        assert!(body.get("functions").is_none());
        assert!(body.get("function_call").is_none());
        assert!(body.get("temperature").is_none());
    }
}
