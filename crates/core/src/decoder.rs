//! Decoders that turn the final generation into typed data.

mod error;
mod json_schema;
mod plain_text;

pub use error::{Error, ErrorKind};
pub use json_schema::JsonSchemaDecoder;
pub use plain_text::PlainTextDecoder;

/// Converts the text of the final generation into a typed value.
///
/// Decoding must be deterministic for the same text. A decoder fails with
/// [`ErrorKind::Malformed`] when the text is not valid for its format, and
/// with [`ErrorKind::SchemaViolation`] when it is well-formed but does not
/// conform to what the decoder expects.
pub trait Decoder: Send + Sync + 'static {
    /// The decoded value.
    type Output: Send + 'static;

    /// Returns the name of the decoder, recorded in the agent metadata.
    fn name(&self) -> &str;

    /// Returns text describing the expected output format, which is merged
    /// into the system instructions.
    fn instructions(&self) -> Option<String> {
        None
    }

    /// Decodes the text.
    fn decode(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Self::Output, Error>> + Send;
}
