use crate::items::into_items;
use crate::llm::FunctionCaller;
use crate::request::ParsedRequest;
use crate::schema::{self, ArgumentSchema};
use crate::translator::builder::TranslatorBuilder;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, FunctionCall, Message};
use crate::vikunja::RestExecutor;
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Natural-language to Vikunja REST translator.
///
/// Every failure is terminal for the invocation it happens in: there are no
/// partial results and nothing is rolled back. With `max_attempts > 1`,
/// unusable model output ([`Error::is_model_output_error`]) triggers a fresh
/// model call; transport and downstream errors never do.
///
/// The translator holds no mutable state, so one instance can serve any
/// number of concurrent invocations.
pub struct Translator {
    pub(crate) caller: Arc<dyn FunctionCaller>,
    pub(crate) executor: Arc<dyn RestExecutor>,
    pub(crate) schema: ArgumentSchema,
    pub(crate) model: String,
    pub(crate) temperature: Option<f64>,
    pub(crate) max_attempts: u32,
}

impl Translator {
    pub fn builder() -> TranslatorBuilder {
        TranslatorBuilder::new()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Translate `instruction` into a Vikunja call, perform it, and return the result items.
    pub async fn translate_and_execute(&self, instruction: &str) -> Result<Vec<Value>> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("translate", request_id = %request_id);
        async {
            let parsed = self.plan_with_id(instruction, &request_id).await?;
            self.execute_with_id(&parsed, &request_id).await
        }
        .instrument(span)
        .await
    }

    /// Ask the model for a request and validate it, without calling Vikunja.
    pub async fn plan(&self, instruction: &str) -> Result<ParsedRequest> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("plan", request_id = %request_id);
        self.plan_with_id(instruction, &request_id)
            .instrument(span)
            .await
    }

    /// Perform an already validated request and normalize its result.
    pub async fn execute(&self, request: &ParsedRequest) -> Result<Vec<Value>> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("execute", request_id = %request_id);
        self.execute_with_id(request, &request_id)
            .instrument(span)
            .await
    }

    /// The chat request for one attempt. `correction` is empty on the first attempt.
    pub fn chat_request(&self, instruction: &str, correction: Vec<Message>) -> ChatCompletionRequest {
        let mut messages = vec![Message::system(schema::SYSTEM_PROMPT), Message::user(instruction)];
        messages.extend(correction);

        let mut request = ChatCompletionRequest::new(self.model.clone())
            .messages(messages)
            .force_function(schema::vikunja_request_function());
        if let Some(t) = self.temperature {
            request = request.temperature(t);
        }
        request
    }

    /// Extract and validate the request carried by a model response.
    pub fn interpret(&self, response: &ChatCompletionResponse) -> Result<ParsedRequest> {
        let arguments = response
            .function_arguments(schema::FUNCTION_NAME)
            .ok_or(Error::MissingFunctionCall)?;
        ParsedRequest::from_arguments(arguments, &self.schema)
    }

    async fn plan_with_id(&self, instruction: &str, request_id: &str) -> Result<ParsedRequest> {
        let mut correction = Vec::new();
        let mut attempt = 1;
        loop {
            let request = self.chat_request(instruction, correction);
            debug!(attempt, model = %self.model, "requesting function call");
            let response = self.caller.complete(&request, request_id).await?;

            match self.interpret(&response) {
                Ok(parsed) => {
                    info!(attempt, method = %parsed.method, endpoint = %parsed.endpoint, "instruction translated");
                    return Ok(parsed);
                }
                Err(e) if e.is_model_output_error() && attempt < self.max_attempts => {
                    warn!(attempt, error = %e, "model output rejected, asking again");
                    correction = correction_messages(&response, &e);
                    attempt += 1;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "model output rejected");
                    return Err(e);
                }
            }
        }
    }

    async fn execute_with_id(&self, request: &ParsedRequest, request_id: &str) -> Result<Vec<Value>> {
        let value = self.executor.execute(request, request_id).await?;
        let items = into_items(value);
        info!(items = items.len(), "Vikunja call completed");
        Ok(items)
    }
}

/// Replays the rejected answer and says why it was rejected.
///
/// Only a call to the pinned function with string arguments is replayed as a
/// function call, rebuilt so that `name` and `arguments` are both strings.
/// Anything else is replayed as prose, or dropped when there is none.
fn correction_messages(response: &ChatCompletionResponse, error: &Error) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2);
    let replayable = response.first_function_call().and_then(|call| {
        let pinned = call.name.as_deref().map_or(true, |n| n == schema::FUNCTION_NAME);
        call.arguments_text().filter(|_| pinned)
    });
    match (replayable, response.first_content()) {
        (Some(arguments), _) => messages.push(Message::assistant_function_call(FunctionCall::new(
            schema::FUNCTION_NAME,
            arguments,
        ))),
        (None, Some(text)) if !text.is_empty() => messages.push(Message::assistant(text)),
        _ => {}
    }
    messages.push(Message::user(format!(
        "That answer was rejected: {}. Call {} again with a valid request.",
        error,
        schema::FUNCTION_NAME
    )));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Choice, ResponseMessage};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedCaller {
        responses: Mutex<VecDeque<ChatCompletionResponse>>,
        requests: Mutex<Vec<ChatCompletionRequest>>,
    }

    impl ScriptedCaller {
        fn new(responses: Vec<ChatCompletionResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl FunctionCaller for ScriptedCaller {
        async fn complete(
            &self,
            request: &ChatCompletionRequest,
            _request_id: &str,
        ) -> Result<ChatCompletionResponse> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.responses.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    struct RecordingExecutor {
        reply: Value,
        calls: Mutex<Vec<ParsedRequest>>,
    }

    #[async_trait]
    impl RestExecutor for RecordingExecutor {
        async fn execute(&self, request: &ParsedRequest, _request_id: &str) -> Result<Value> {
            self.calls.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn call(arguments: &str) -> ChatCompletionResponse {
        ChatCompletionResponse {
            choices: vec![Choice {
                message: Some(ResponseMessage {
                    role: Some("assistant".to_string()),
                    content: None,
                    function_call: Some(FunctionCall::new("vikunja_request", arguments)),
                }),
                ..Choice::default()
            }],
            ..ChatCompletionResponse::default()
        }
    }

    fn translator(
        caller: Arc<ScriptedCaller>,
        executor: Arc<RecordingExecutor>,
        max_attempts: u32,
    ) -> Translator {
        Translator::builder()
            .function_caller(caller)
            .rest_executor(executor)
            .max_attempts(max_attempts)
            .build()
            .unwrap()
    }

    fn executor(reply: Value) -> Arc<RecordingExecutor> {
        Arc::new(RecordingExecutor {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn chat_request_pins_the_function() {
        let t = translator(ScriptedCaller::new(vec![]), executor(json!({})), 1);
        let body = serde_json::to_value(t.chat_request("Create a project called Groceries", vec![])).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo-0613");
        assert_eq!(body["function_call"], json!({"name": "vikunja_request"}));
        assert_eq!(body["functions"][0]["name"], "vikunja_request");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], schema::SYSTEM_PROMPT);
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "Create a project called Groceries"}));
    }

    #[tokio::test]
    async fn reprompts_after_malformed_output() {
        let caller = ScriptedCaller::new(vec![
            call("not json"),
            call(r#"{"method":"GET","endpoint":"/projects"}"#),
        ]);
        let exec = executor(json!([{"id": 1}]));
        let t = translator(caller.clone(), exec.clone(), 2);

        let items = t.translate_and_execute("list my projects").await.unwrap();
        assert_eq!(items, vec![json!({"id": 1})]);

        let requests = caller.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let retry = &requests[1].messages;
        assert_eq!(retry.len(), 4);
        assert_eq!(
            retry[2].function_call.as_ref().and_then(|c| c.arguments_text()),
            Some("not json")
        );
        assert!(retry[3].text().contains("Failed to parse AI response"));
        assert_eq!(exec.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let caller = ScriptedCaller::new(vec![
            call(r#"{"method":"PATCH","endpoint":"/tasks/1"}"#),
            call(r#"{"method":"GET","endpoint":""}"#),
        ]);
        let exec = executor(json!({}));
        let t = translator(caller.clone(), exec.clone(), 2);

        let err = t.translate_and_execute("mark task 1 done").await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert_eq!(caller.requests.lock().unwrap().len(), 2);
        assert!(exec.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn single_shot_by_default() {
        let caller = ScriptedCaller::new(vec![ChatCompletionResponse::default()]);
        let exec = executor(json!({}));
        let t = translator(caller.clone(), exec.clone(), 1);

        let err = t.plan("anything").await.unwrap_err();
        assert!(matches!(err, Error::MissingFunctionCall));
        assert_eq!(caller.requests.lock().unwrap().len(), 1);
        assert!(exec.calls.lock().unwrap().is_empty());
    }

    fn answer(content: Option<&str>, function_call: Option<FunctionCall>) -> ChatCompletionResponse {
        ChatCompletionResponse {
            choices: vec![Choice {
                message: Some(ResponseMessage {
                    role: Some("assistant".to_string()),
                    content: content.map(str::to_string),
                    function_call,
                }),
                ..Choice::default()
            }],
            ..ChatCompletionResponse::default()
        }
    }

    fn replayed(response: &ChatCompletionResponse) -> Vec<Value> {
        correction_messages(response, &Error::MissingFunctionCall)
            .iter()
            .map(|m| serde_json::to_value(m).unwrap())
            .collect()
    }

    #[test]
    fn unnamed_call_is_replayed_under_the_pinned_name() {
        let unnamed = FunctionCall {
            name: None,
            arguments: Some(json!("not json")),
        };
        let messages = replayed(&answer(None, Some(unnamed)));
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0]["function_call"],
            json!({"name": "vikunja_request", "arguments": "not json"})
        );
        assert_eq!(messages[1]["role"], "user");
    }

    #[test]
    fn object_arguments_are_not_replayed_as_a_call() {
        let object_args = FunctionCall {
            name: Some("vikunja_request".to_string()),
            arguments: Some(json!({"method": "GET", "endpoint": "/projects"})),
        };
        let messages = replayed(&answer(None, Some(object_args)));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert!(messages[0].get("function_call").is_none());
    }

    #[test]
    fn undeclared_function_falls_back_to_prose() {
        let other = FunctionCall::new("delete_everything", "{}");
        let messages = replayed(&answer(Some("I will tidy up."), Some(other)));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], json!({"role": "assistant", "content": "I will tidy up."}));
        assert!(messages.iter().all(|m| m.get("function_call").map_or(true, |c| {
            c["name"].is_string() && c["arguments"].is_string()
        })));
    }
}
