use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use jsonschema::Validator;
use serde_json::Value;
use tracing::Instrument;

use crate::Error as AgentError;
use crate::schema::{clean_json, compile, violations};
use crate::tool::{ToolCallSyntax, ToolInvocation, ToolObject};

/// The outcome of a tool round.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolRound {
    /// The name of the tool that ran. `None` if the requested tool is not
    /// registered.
    pub tool_name: Option<String>,
    /// The tool output, or an `Error: ` prefixed description of what went
    /// wrong.
    pub output: String,
}

struct RegisteredTool {
    object: Box<dyn ToolObject>,
    validator: Validator,
}

/// An executor that detects tool invocations in generated text and runs
/// them.
///
/// The tool set is fixed at construction and only read afterwards.
pub struct Executor {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
    syntax: Box<dyn ToolCallSyntax>,
}

impl Executor {
    /// Registers the tools, compiling each parameter schema up front.
    pub fn with_tools(
        tools: Vec<Box<dyn ToolObject>>,
        syntax: Box<dyn ToolCallSyntax>,
    ) -> Result<Self, AgentError> {
        let mut registered = Vec::with_capacity(tools.len());
        let mut index = HashMap::with_capacity(tools.len());
        for tool in tools {
            let name = tool.name().to_owned();
            if index.contains_key(&name) {
                return Err(AgentError::Validation(format!(
                    "tool `{name}` is registered more than once"
                )));
            }
            let validator =
                compile(tool.parameter_schema()).map_err(|err| match err {
                    AgentError::SchemaCompilation(reason) => {
                        AgentError::SchemaCompilation(format!(
                            "tool `{name}`: {reason}"
                        ))
                    }
                    other => other,
                })?;
            index.insert(name, registered.len());
            registered.push(RegisteredTool {
                object: tool,
                validator,
            });
        }
        Ok(Self {
            tools: registered,
            index,
            syntax,
        })
    }

    /// Returns the instructions that describe the protocol and every
    /// registered tool. Empty if no tool is registered.
    pub fn instructions(&self) -> String {
        if self.tools.is_empty() {
            return String::new();
        }

        let mut instructions = vec![
            "You have access to the tools listed below. Use one only when it \
             helps you answer."
                .to_owned(),
            self.syntax.usage(),
            "Available tools:".to_owned(),
        ];
        for tool in &self.tools {
            let object = &tool.object;
            let schema = serde_json::to_string_pretty(object.parameter_schema())
                .unwrap_or_else(|_| object.parameter_schema().to_string());
            instructions.push(format!(
                "Tool: {}\nDescription: {}\nArguments schema:\n{}",
                object.name(),
                object.description().trim(),
                schema
            ));
        }
        instructions.join("\n")
    }

    /// Runs a tool round over the generated text.
    ///
    /// Returns `None` if the text requests no tool. Otherwise exactly one
    /// tool is looked up, validated and executed, and every failure along
    /// the way is turned into the round's output.
    pub async fn run(&self, text: &str) -> Option<ToolRound> {
        let ToolInvocation { name, arguments } = self.syntax.parse(text)?;

        let span = debug_span!("tool round", tool = %name);
        async move {
            let Some(&idx) = self.index.get(&name) else {
                warn!("tool not found: {name}");
                return Some(ToolRound {
                    tool_name: None,
                    output: format!("Error: Tool '{name}' not found"),
                });
            };
            let tool = &self.tools[idx];

            let arguments = clean_json(&arguments);
            trace!("got arguments: {arguments}");
            let arguments: Value = match serde_json::from_str(&arguments) {
                Ok(arguments) => arguments,
                Err(err) => {
                    warn!("failed to parse arguments: {err}");
                    return Some(ToolRound {
                        tool_name: Some(name),
                        output: format!(
                            "Error: Failed to parse arguments: {err}"
                        ),
                    });
                }
            };

            if let Some(report) = violations(&tool.validator, &arguments) {
                warn!("arguments rejected by schema:\n{report}");
                return Some(ToolRound {
                    tool_name: Some(name),
                    output: format!("Error: {report}"),
                });
            }

            let output = execute(tool.object.as_ref(), arguments).await;
            Some(ToolRound {
                tool_name: Some(name),
                output,
            })
        }
        .instrument(span)
        .await
    }
}

const INTERNAL_ERROR: &str =
    "Error: An internal error occurred while executing the tool";

async fn execute(tool: &dyn ToolObject, arguments: Value) -> String {
    // Tools may do their work before returning the future.
    let fut = match panic::catch_unwind(AssertUnwindSafe(|| {
        tool.execute(arguments)
    })) {
        Ok(fut) => fut,
        Err(_) => {
            error!("tool `{}` panicked while starting", tool.name());
            return INTERNAL_ERROR.to_owned();
        }
    };
    // A panic inside the future surfaces as a join error.
    let joined = tokio::spawn(fut.instrument(debug_span!("tool execute"))).await;
    match joined {
        Ok(Ok(output)) => {
            debug!("tool succeeded");
            output
        }
        Ok(Err(err)) => {
            warn!("tool `{}` failed: {err}", tool.name());
            format!("Error: {}", err.reason())
        }
        Err(err) => {
            error!("tool `{}` task failed: {err}", tool.name());
            INTERNAL_ERROR.to_owned()
        }
    }
}
