//! JSON helpers shared by tool arguments and decoders.

use std::sync::LazyLock;

use jsonschema::Validator;
use regex::Regex;
use serde_json::Value;

use crate::Error;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```")
        .expect("code fence pattern is valid")
});

/// Strips markdown code fences that models like to wrap JSON in.
///
/// When the text holds fenced blocks, the trimmed contents of all blocks
/// are concatenated. Otherwise the trimmed text is returned as is.
pub fn clean_json(text: &str) -> String {
    let mut result = String::new();
    for caps in CODE_FENCE.captures_iter(text) {
        if let Some(content) = caps.get(1) {
            result.push_str(content.as_str().trim());
        }
    }
    if result.is_empty() {
        text.trim().to_owned()
    } else {
        result
    }
}

/// Compiles a JSON schema.
pub(crate) fn compile(schema: &Value) -> Result<Validator, Error> {
    Validator::new(schema)
        .map_err(|err| Error::SchemaCompilation(err.to_string()))
}

/// Validates `value`, returning one line per violated constraint.
pub(crate) fn violations(validator: &Validator, value: &Value) -> Option<String> {
    if validator.is_valid(value) {
        return None;
    }
    let lines: Vec<String> = validator
        .iter_errors(value)
        .map(|err| format!("Error at {}: {}", err.instance_path, err))
        .collect();
    Some(lines.join("\n"))
}
