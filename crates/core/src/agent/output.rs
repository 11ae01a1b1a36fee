use agent_builder_model::{Message, Usage};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The result of an exchange.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOutput<T> {
    /// The final generated message.
    pub generated: Message,
    /// Usage reported for the final generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// The decoded value.
    pub data: T,
    /// Facts about the execution.
    #[serde(rename = "agentMetadata")]
    pub metadata: AgentMetadata,
}

/// Facts about one execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetadata {
    /// The name of the decoder that produced the data.
    #[serde(rename = "decoderName")]
    pub decoder: String,
    /// The tool that ran during the exchange, if any.
    #[serde(rename = "toolName", skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// When the execution started, before the first attempt.
    pub start_time: DateTime<Utc>,
    /// When the execution finished, after the last attempt.
    pub end_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serialized_names() {
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let output = AgentOutput {
            generated: Message::assistant("3"),
            usage: None,
            data: 3,
            metadata: AgentMetadata {
                decoder: "plain-text".to_owned(),
                tool: Some("add".to_owned()),
                start_time: time,
                end_time: time,
            },
        };
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "generated": { "role": "assistant", "content": "3" },
                "data": 3,
                "agentMetadata": {
                    "decoderName": "plain-text",
                    "toolName": "add",
                    "startTime": "2024-01-02T03:04:05Z",
                    "endTime": "2024-01-02T03:04:05Z"
                }
            })
        );

        let mut metadata = output.metadata;
        metadata.tool = None;
        let value = serde_json::to_value(&metadata).unwrap();
        assert!(value.get("toolName").is_none());
    }
}
