use std::collections::HashMap;
use std::future::ready;
use std::time::Duration;

use agent_builder_model::{ErrorKind, ExecutionParams, Message, Role, Usage};
use agent_builder_test_model::{PresetResponse, TestModelProvider};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::decoder::{ErrorKind as DecodeErrorKind, JsonSchemaDecoder};
use crate::prompt::PromptTemplate;
use crate::retry::RetryConfig;
use crate::tool::{Tool, ToolResult};
use crate::{AgentBuilder, Error};

#[derive(Debug, PartialEq, Deserialize, JsonSchema)]
struct Person {
    name: String,
    age: u32,
}

#[derive(Deserialize)]
struct AddInput {
    a: i64,
    b: i64,
}

struct AddTool {
    schema: Value,
}

impl AddTool {
    fn new() -> Self {
        Self {
            schema: json!({
                "type": "object",
                "properties": {
                    "a": { "type": "integer" },
                    "b": { "type": "integer" }
                },
                "required": ["a", "b"]
            }),
        }
    }
}

impl Tool for AddTool {
    type Input = AddInput;

    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Adds two integers"
    }

    fn parameter_schema(&self) -> &Value {
        &self.schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok((input.a + input.b).to_string()))
    }
}

fn provider_with(responses: &[&str]) -> TestModelProvider {
    let mut provider = TestModelProvider::default();
    for response in responses {
        provider.add_response(PresetResponse::with_text(*response));
    }
    provider
}

#[tokio::test]
async fn test_json_output() {
    let provider = provider_with(&["```json\n{\"name\":\"Ann\",\"age\":5}\n```"]);
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_decoder(JsonSchemaDecoder::<Person>::for_type().unwrap())
        .build()
        .unwrap();

    let output = agent
        .execute(vec![Message::user("Who is Ann?")], None)
        .await
        .unwrap();
    assert_eq!(
        output.data,
        Person {
            name: "Ann".to_owned(),
            age: 5
        }
    );
    assert_eq!(output.metadata.decoder, "json-schema");
    assert!(output.metadata.tool.is_none());
    assert!(output.metadata.start_time <= output.metadata.end_time);

    let metadata = serde_json::to_value(&output.metadata).unwrap();
    assert!(metadata.get("toolName").is_none());
    assert_eq!(metadata["decoderName"], "json-schema");

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    let system = &requests[0].messages[0];
    assert_eq!(system.role, Role::System);
    assert!(system.content.contains("JSON Schema"));
}

#[tokio::test]
async fn test_system_only_conversation() {
    let provider = provider_with(&["{\"name\":\"Ann\",\"age\":5}"]);
    let decoder = JsonSchemaDecoder::<Value>::new(json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "age": { "type": "integer", "minimum": 0 }
        },
        "required": ["name", "age"]
    }))
    .unwrap();
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_decoder(decoder)
        .build()
        .unwrap();

    let output = agent
        .execute(vec![Message::system("You generate JSON")], None)
        .await
        .unwrap();
    assert_eq!(output.data, json!({ "name": "Ann", "age": 5 }));
    assert!(output.metadata.tool.is_none());

    let messages = &provider.requests()[0].messages;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].content.starts_with("You generate JSON\n"));
}

#[tokio::test]
async fn test_passthrough() {
    let mut provider = TestModelProvider::default();
    provider.add_response(PresetResponse::with_text("Hello!").with_usage(
        Usage {
            model: "test".to_owned(),
            input_tokens: 3,
            output_tokens: 1,
            total_tokens: 4,
        },
    ));
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .build()
        .unwrap();
    assert_eq!(agent.instructions(), "");

    let input = vec![Message::user("Hi")];
    let output = agent.execute(input.clone(), None).await.unwrap();
    assert_eq!(output.data, "Hello!");
    assert_eq!(output.generated, Message::assistant("Hello!"));
    assert_eq!(output.usage.unwrap().total_tokens, 4);
    assert_eq!(output.metadata.decoder, "plain-text");

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages, input);
}

#[tokio::test]
async fn test_tool_round() {
    let provider = provider_with(&[
        "Let me compute.\n/tool add\n/args {\"a\": 1, \"b\": 2}",
        "The answer is 3.",
    ]);
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_tool(AddTool::new())
        .build()
        .unwrap();

    let output = agent
        .execute(vec![Message::user("What is 1 + 2?")], None)
        .await
        .unwrap();
    assert_eq!(output.data, "The answer is 3.");
    assert_eq!(output.metadata.tool.as_deref(), Some("add"));

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    let second = &requests[1].messages;
    assert_eq!(second.len(), 4);
    assert_eq!(second[2].role, Role::Assistant);
    assert!(second[2].content.contains("/tool add"));
    assert_eq!(second[3], Message::tool("3"));
}

#[tokio::test]
async fn test_unknown_tool() {
    let provider =
        provider_with(&["/tool subtract\n/args {\"a\": 1}", "I cannot."]);
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_tool(AddTool::new())
        .build()
        .unwrap();

    let output = agent
        .execute(vec![Message::user("What is 1 - 2?")], None)
        .await
        .unwrap();
    assert_eq!(output.data, "I cannot.");
    assert!(output.metadata.tool.is_none());

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1].messages[3],
        Message::tool("Error: Tool 'subtract' not found")
    );
}

#[tokio::test]
async fn test_invalid_tool_arguments() {
    let provider =
        provider_with(&["/tool add\n/args {\"a\": \"one\"}", "Oops."]);
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_tool(AddTool::new())
        .build()
        .unwrap();

    let output = agent
        .execute(vec![Message::user("Add")], None)
        .await
        .unwrap();
    assert_eq!(output.metadata.tool.as_deref(), Some("add"));

    let tool_msg = &provider.requests()[1].messages[3];
    assert_eq!(tool_msg.role, Role::Tool);
    assert!(tool_msg.content.starts_with("Error: Error at "));
}

#[tokio::test]
async fn test_instruction_injection() {
    let provider = provider_with(&["Done."]);
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_tool(AddTool::new())
        .with_decoder(JsonSchemaDecoder::<Value>::new(json!({})).unwrap())
        .build()
        .unwrap();

    let tool_pos = agent.instructions().find("Tool: add").unwrap();
    let schema_pos = agent.instructions().find("JSON Schema").unwrap();
    assert!(tool_pos < schema_pos);

    let input = vec![Message::system("Be brief."), Message::user("Hi")];
    // "Done." is not JSON, both calls fail at decoding.
    for _ in 0..2 {
        let err = agent.execute(input.clone(), None).await.unwrap_err();
        assert_eq!(err.decode_kind(), Some(DecodeErrorKind::Malformed));
    }

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].messages, requests[1].messages);
    let messages = &requests[0].messages;
    assert_eq!(messages.len(), 2);
    let systems: Vec<_> =
        messages.iter().filter(|m| m.role == Role::System).collect();
    assert_eq!(systems.len(), 1);
    assert_eq!(
        systems[0].content,
        format!("Be brief.\n{}", agent.instructions())
    );
}

#[tokio::test]
async fn test_retry_success() {
    let mut provider = TestModelProvider::default();
    provider.add_response(
        PresetResponse::with_text("Recovered.")
            .with_failures(2)
            .with_failure_kind(ErrorKind::Connection),
    );
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_retry_config(
            RetryConfig::new(3).with_delay(Duration::from_millis(1)),
        )
        .build()
        .unwrap();

    let output = agent
        .execute(vec![Message::user("Hi")], None)
        .await
        .unwrap();
    assert_eq!(output.data, "Recovered.");
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_retry_exhausted() {
    let mut provider = TestModelProvider::default();
    provider.add_response(PresetResponse::with_text("never").with_failures(0));
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_retry_config(RetryConfig::new(3))
        .build()
        .unwrap();

    let err = agent
        .execute(vec![Message::user("Hi")], None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Internal { attempts: 3, .. }));
    assert_eq!(err.provider_kind(), Some(ErrorKind::RateLimitExceeded));
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_single_attempt_error() {
    let mut provider = TestModelProvider::default();
    provider.add_response(
        PresetResponse::with_text("never")
            .with_failures(0)
            .with_failure_kind(ErrorKind::InvalidCredentials),
    );
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .build()
        .unwrap();

    let err = agent
        .execute(vec![Message::user("Hi")], None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Provider {
            kind: ErrorKind::InvalidCredentials,
            ..
        }
    ));
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_invalid_conversation() {
    let provider = provider_with(&["unused"]);
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .build()
        .unwrap();

    let err = agent.execute(Vec::<Message>::new(), None).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = agent
        .execute(vec![Message::user("")], None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_invalid_builder() {
    let err = AgentBuilder::with_model_provider(TestModelProvider::default())
        .with_retry_config(RetryConfig::new(0))
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, Error::Validation(_)));

    let err = AgentBuilder::with_model_provider(TestModelProvider::default())
        .with_tool(AddTool::new())
        .with_tool(AddTool::new())
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_template_input() {
    let provider = provider_with(&["Hello, Ann!"]);
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .build()
        .unwrap();

    let template = PromptTemplate::new(vec![
        Message::system("You greet people {{ style }}."),
        Message::user("My name is {{name}}."),
    ]);
    let variables = HashMap::from([
        ("style".to_owned(), "politely".to_owned()),
        ("name".to_owned(), "Ann".to_owned()),
    ]);
    agent
        .execute(template.bind(variables), None)
        .await
        .unwrap();

    let messages = &provider.requests()[0].messages;
    assert_eq!(messages[0].content, "You greet people politely.");
    assert_eq!(messages[1].content, "My name is Ann.");
}

#[tokio::test]
async fn test_params_forwarded() {
    let provider = provider_with(&["ok"]);
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .build()
        .unwrap();

    let params = ExecutionParams::with_context_id("ctx-1");
    agent
        .execute(vec![Message::user("Hi")], Some(&params))
        .await
        .unwrap();
    assert_eq!(provider.requests()[0].params, Some(params));
}

#[tokio::test]
async fn test_decode_error() {
    let provider = provider_with(&["{\"name\": \"Ann\"}"]);
    let agent = AgentBuilder::with_model_provider(provider)
        .with_decoder(JsonSchemaDecoder::<Person>::for_type().unwrap())
        .build()
        .unwrap();

    let err = agent
        .execute(vec![Message::user("Who?")], None)
        .await
        .unwrap_err();
    assert_eq!(err.decode_kind(), Some(DecodeErrorKind::SchemaViolation));
}

#[tokio::test]
async fn test_concurrent_execute() {
    let provider = provider_with(&["pong"]);
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_tool(AddTool::new())
        .build()
        .unwrap();

    let first = agent.execute(vec![Message::user("ping 1")], None);
    let second = agent.execute(vec![Message::user("ping 2")], None);
    let (first, second) = tokio::join!(first, second);
    assert_eq!(first.unwrap().data, "pong");
    assert_eq!(second.unwrap().data, "pong");

    let mut users: Vec<_> = provider
        .requests()
        .into_iter()
        .map(|r| r.messages[1].content.clone())
        .collect();
    users.sort();
    assert_eq!(users, ["ping 1", "ping 2"]);
}

#[tokio::test]
async fn test_retry_discards_tool_round() {
    let mut provider = TestModelProvider::default();
    provider.add_response(PresetResponse::with_text(
        "/tool add\n/args {\"a\": 2, \"b\": 2}",
    ));
    provider.add_response(
        PresetResponse::with_text("It is 4.")
            .with_failures(1)
            .with_failure_kind(ErrorKind::Connection),
    );
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_tool(AddTool::new())
        .with_retry_config(RetryConfig::new(2))
        .build()
        .unwrap();

    let input = vec![Message::user("What is 2 + 2?")];
    let output = agent.execute(input, None).await.unwrap();
    assert_eq!(output.data, "It is 4.");
    assert_eq!(output.metadata.tool.as_deref(), Some("add"));

    let requests = provider.requests();
    assert_eq!(requests.len(), 4);
    // The second attempt starts over from the original conversation.
    assert_eq!(requests[2].messages, requests[0].messages);
    assert_eq!(requests[2].messages.len(), 2);
    assert!(
        requests[2]
            .messages
            .iter()
            .all(|m| m.role != Role::Assistant && m.role != Role::Tool)
    );
    assert_eq!(requests[3].messages, requests[1].messages);
    assert_eq!(requests[3].messages.len(), 4);
}

struct FaultyTool {
    schema: Value,
}

impl Tool for FaultyTool {
    type Input = Value;

    fn name(&self) -> &str {
        "faulty"
    }

    fn description(&self) -> &str {
        "Fails while preparing its work"
    }

    fn parameter_schema(&self) -> &Value {
        &self.schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let values: Vec<i64> = input
            .as_array()
            .map(|items| items.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();
        ready(Ok(values[3].to_string()))
    }
}

#[tokio::test]
async fn test_tool_panic_is_reported() {
    let provider = provider_with(&["/tool faulty\n/args {}", "Something broke."]);
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_tool(FaultyTool {
            schema: json!({ "type": "object" }),
        })
        .build()
        .unwrap();

    let output = agent
        .execute(vec![Message::user("Try the faulty tool")], None)
        .await
        .unwrap();
    assert_eq!(output.data, "Something broke.");
    assert_eq!(output.metadata.tool.as_deref(), Some("faulty"));
    assert_eq!(
        provider.requests()[1].messages[3],
        Message::tool("Error: An internal error occurred while executing the tool")
    );
}
