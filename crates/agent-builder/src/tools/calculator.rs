use std::future::ready;
use std::iter::Peekable;
use std::str::Chars;

use agent_builder_core::tool::{Error as ToolError, Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, JsonSchema)]
pub struct CalculatorParameters {
    #[schemars(
        description = "The arithmetic expression to evaluate, e.g. `2 + 2 * 2`."
    )]
    expression: String,
}

/// A tool for evaluating arithmetic expressions.
///
/// Supports `+`, `-`, `*`, `/`, `%`, parentheses, unary minus and decimal
/// numbers, with the usual precedence.
pub struct CalculatorTool {
    parameter_schema: Value,
}

impl CalculatorTool {
    /// Creates a new calculator tool.
    #[inline]
    pub fn new() -> Self {
        CalculatorTool {
            parameter_schema: schema_for!(CalculatorParameters).to_value(),
        }
    }
}

impl Default for CalculatorTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for CalculatorTool {
    type Input = CalculatorParameters;

    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluates an arithmetic expression and returns the result. Useful \
         for answering mathematical questions."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: CalculatorParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        trace!("evaluating: {}", input.expression);
        ready(evaluate(&input.expression).map(format_number))
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn evaluate(expression: &str) -> Result<f64, ToolError> {
    let mut parser = Parser {
        chars: expression.chars().peekable(),
    };
    let value = parser.expr()?;
    parser.skip_whitespace();
    if let Some(c) = parser.chars.peek() {
        return Err(invalid(format!("unexpected character `{c}`")));
    }
    if !value.is_finite() {
        return Err(ToolError::execution_error()
            .with_reason("the result is not a finite number"));
    }
    Ok(value)
}

#[inline]
fn invalid(reason: String) -> ToolError {
    ToolError::invalid_input().with_reason(reason)
}

/// Recursive descent over:
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := factor (('*' | '/' | '%') factor)*
/// factor := '-' factor | '(' expr ')' | number
/// ```
struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn next_op(&mut self, ops: &[char]) -> Option<char> {
        self.skip_whitespace();
        self.chars.next_if(|c| ops.contains(c))
    }

    fn expr(&mut self) -> Result<f64, ToolError> {
        let mut value = self.term()?;
        while let Some(op) = self.next_op(&['+', '-']) {
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ToolError> {
        let mut value = self.factor()?;
        while let Some(op) = self.next_op(&['*', '/', '%']) {
            let rhs = self.factor()?;
            value = match op {
                '*' => value * rhs,
                _ if rhs == 0.0 => {
                    return Err(ToolError::execution_error()
                        .with_reason("division by zero"));
                }
                '/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ToolError> {
        self.skip_whitespace();
        match self.chars.peek().copied() {
            Some('-') => {
                self.chars.next();
                Ok(-self.factor()?)
            }
            Some('(') => {
                self.chars.next();
                let value = self.expr()?;
                if self.next_op(&[')']).is_none() {
                    return Err(invalid("missing closing parenthesis".to_owned()));
                }
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(invalid(format!("unexpected character `{c}`"))),
            None => Err(invalid("unexpected end of expression".to_owned())),
        }
    }

    fn number(&mut self) -> Result<f64, ToolError> {
        let mut literal = String::new();
        while let Some(c) =
            self.chars.next_if(|c| c.is_ascii_digit() || *c == '.')
        {
            literal.push(c);
        }
        literal
            .parse()
            .map_err(|_| invalid(format!("invalid number `{literal}`")))
    }
}

#[cfg(test)]
mod tests {
    use agent_builder_core::tool::ErrorKind;

    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("4 + 4 * 4").unwrap(), 20.0);
        assert_eq!(evaluate("(4 + 4) * 4").unwrap(), 32.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("17 % 5 * 2").unwrap(), 4.0);
    }

    #[test]
    fn test_unary_and_decimals() {
        assert_eq!(evaluate("-3 + 5").unwrap(), 2.0);
        assert_eq!(evaluate("2 * -(1.5 + 0.5)").unwrap(), -4.0);
        assert_eq!(evaluate(".5 / 2").unwrap(), 0.25);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(-4.0), "-4");
        assert_eq!(format_number(0.25), "0.25");
    }

    #[test]
    fn test_invalid_expressions() {
        for expression in ["", "2 +", "(1 + 2", "1 + 2)", "1..2", "2 ^ 3"] {
            let err = evaluate(expression).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{expression}");
        }
    }

    #[test]
    fn test_division_by_zero() {
        let err = evaluate("1 / (2 - 2)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExecutionError);
        assert_eq!(err.reason(), "division by zero");
    }

    #[tokio::test]
    async fn test_execute() {
        let tool = CalculatorTool::new();
        let output = tool
            .execute(CalculatorParameters {
                expression: "4 + 4 * 4".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(output, "20");
    }
}
