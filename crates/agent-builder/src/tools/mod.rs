//! A set of built-in tools that models can use.

mod calculator;
mod read_file;

pub use calculator::CalculatorTool;
pub use read_file::ReadFileTool;
