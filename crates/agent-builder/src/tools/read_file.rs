use std::fs::File;
use std::io::{BufRead, BufReader, Read};

use agent_builder_core::tool::{Error as ToolError, Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use tokio::task::spawn_blocking;

const MAX_LINES: usize = 50;

#[derive(Deserialize, JsonSchema)]
pub struct ReadFileParameters {
    #[schemars(description = "Path to the file.")]
    path: String,
    #[schemars(description = "1-based start line to read from, default to 1.")]
    start_line: Option<usize>,
}

/// A tool for reading file content with line numbers.
///
/// Returns at most 50 lines per call; the model can ask for the next chunk
/// with a later start line.
pub struct ReadFileTool {
    parameter_schema: Value,
}

impl ReadFileTool {
    /// Creates a new read file tool.
    #[inline]
    pub fn new() -> Self {
        ReadFileTool {
            parameter_schema: schema_for!(ReadFileParameters).to_value(),
        }
    }
}

impl Default for ReadFileTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ReadFileTool {
    type Input = ReadFileParameters;

    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Reads a file and returns up to 50 lines starting at `start_line`, \
         each prefixed with its line number."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: ReadFileParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        async move {
            let start_line = input.start_line.unwrap_or(1);
            if start_line == 0 {
                return Err(ToolError::invalid_input()
                    .with_reason("`start_line` must be 1-based"));
            }

            spawn_blocking(move || read_file_section(&input.path, start_line))
                .await
                .map_err(|_| {
                    ToolError::execution_error()
                        .with_reason("Failed to read file")
                })?
        }
    }
}

fn read_file_section(
    path: &str,
    start_line: usize,
) -> Result<String, ToolError> {
    let file = File::open(path).map_err(|err| {
        ToolError::execution_error().with_reason(format!("{path}: {err}"))
    })?;
    format_reader_section(path, file, start_line)
}

fn format_reader_section<R: Read>(
    path: &str,
    reader: R,
    start_line: usize,
) -> Result<String, ToolError> {
    let lines = BufReader::new(reader)
        .lines()
        .skip(start_line - 1)
        .take(MAX_LINES)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| {
            ToolError::execution_error().with_reason(err.to_string())
        })?;

    let mut result = format!("==> {path} <==\n");
    let last_line_no = start_line + lines.len().saturating_sub(1);
    let width = last_line_no.to_string().len();
    for (line_no, line) in (start_line..).zip(lines) {
        result.push_str(&format!("{line_no:>width$}: {line}\n"));
    }
    Ok(result)
}
