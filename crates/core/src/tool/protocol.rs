use std::sync::LazyLock;

use regex::Regex;

static TOOL_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/tool[ \t]+(\w+)").expect("tool marker pattern is valid")
});

static ARGS_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)/args[ \t]+(```.*?```|[^\n]*)")
        .expect("args marker pattern is valid")
});

/// A tool invocation found in a generated text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolInvocation {
    /// The requested tool name.
    pub name: String,
    /// The raw arguments, possibly wrapped in a code fence. Empty if the
    /// model did not write any.
    pub arguments: String,
}

/// The syntax a model uses to request a tool in plain text.
///
/// This is the only place that knows how invocations are spelled, so a
/// different marker syntax can be plugged into an agent without touching
/// the rest of the tool round.
pub trait ToolCallSyntax: Send + Sync + 'static {
    /// Looks for an invocation in the text. Returns `None` if the text
    /// does not request any tool.
    fn parse(&self, text: &str) -> Option<ToolInvocation>;

    /// Returns instructions that teach the model this syntax.
    fn usage(&self) -> String;
}

/// The default syntax: a `/tool <name>` line followed by an
/// `/args <json>` line.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlashCommandSyntax;

impl ToolCallSyntax for SlashCommandSyntax {
    fn parse(&self, text: &str) -> Option<ToolInvocation> {
        let name = TOOL_MARKER.captures(text)?.get(1)?.as_str().to_owned();
        let arguments = ARGS_MARKER
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_owned())
            .unwrap_or_default();
        Some(ToolInvocation { name, arguments })
    }

    fn usage(&self) -> String {
        r#"To use a tool, reply with exactly these two lines and nothing else:
/tool <tool name>
/args <arguments as a single-line JSON object>
You can call at most one tool per reply. The tool output will be sent back to you in a message from the "tool" role, then you can give your final answer.
Example:
/tool calculator
/args {"expression": "2 + 2 * 2"}"#
            .to_owned()
    }
}
