use std::fmt::{self, Debug};
use std::future::ready;
use std::marker::PhantomData;

use jsonschema::Validator;
use schemars::{JsonSchema, schema_for};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Decoder, Error};
use crate::schema::{clean_json, compile, violations};

/// A decoder that parses JSON, validates it against a JSON schema and
/// deserializes it into `T`.
///
/// The schema is compiled when the decoder is created, so a malformed
/// schema is reported before any model is called.
pub struct JsonSchemaDecoder<T> {
    schema: Value,
    validator: Validator,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> JsonSchemaDecoder<T> {
    /// Creates a decoder for the given schema.
    pub fn new(schema: Value) -> Result<Self, crate::Error> {
        let validator = compile(&schema)?;
        Ok(Self {
            schema,
            validator,
            _marker: PhantomData,
        })
    }

    /// Returns the schema the output is validated against.
    #[inline]
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    fn decode_now(&self, text: &str) -> Result<T, Error> {
        let text = clean_json(text);
        let value: Value = serde_json::from_str(&text).map_err(|err| {
            Error::malformed(format!("failed to parse JSON response: {err}"))
        })?;
        if let Some(report) = violations(&self.validator, &value) {
            return Err(Error::schema_violation(report));
        }
        serde_json::from_value(value)
            .map_err(|err| Error::schema_violation(err.to_string()))
    }
}

impl<T: DeserializeOwned + JsonSchema> JsonSchemaDecoder<T> {
    /// Creates a decoder whose schema is derived from `T`.
    #[inline]
    pub fn for_type() -> Result<Self, crate::Error> {
        Self::new(schema_for!(T).to_value())
    }
}

impl<T> Debug for JsonSchemaDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaDecoder")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl<T> Decoder for JsonSchemaDecoder<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn name(&self) -> &str {
        "json-schema"
    }

    fn instructions(&self) -> Option<String> {
        Some(format!(
            "Your answer must be a single JSON value that conforms to the \
             following JSON Schema. Reply with the JSON only, without any \
             explanation:\n{}",
            self.schema
        ))
    }

    fn decode(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Self::Output, Error>> + Send {
        ready(self.decode_now(text))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::decoder::ErrorKind;

    #[derive(Debug, PartialEq, Deserialize, JsonSchema)]
    struct Person {
        name: String,
        age: u32,
    }

    fn person_schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer", "minimum": 0 }
            },
            "required": ["name", "age"]
        })
    }

    #[tokio::test]
    async fn test_decode() {
        let decoder = JsonSchemaDecoder::<Person>::new(person_schema()).unwrap();
        let person = decoder
            .decode("```json\n{\"name\": \"Ann\", \"age\": 5}\n```")
            .await
            .unwrap();
        assert_eq!(
            person,
            Person {
                name: "Ann".to_owned(),
                age: 5
            }
        );
    }

    #[tokio::test]
    async fn test_malformed() {
        let decoder = JsonSchemaDecoder::<Person>::new(person_schema()).unwrap();
        let err = decoder.decode("Ann is five").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[tokio::test]
    async fn test_schema_violation() {
        let decoder = JsonSchemaDecoder::<Person>::new(person_schema()).unwrap();
        let err = decoder.decode(r#"{"name": "Ann"}"#).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert!(err.reason().contains("\"age\""));

        let err = decoder
            .decode(r#"{"name": "Ann", "age": -3}"#)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert!(err.reason().starts_with("Error at /age"));
    }

    #[tokio::test]
    async fn test_derived_schema() {
        let decoder = JsonSchemaDecoder::<Person>::for_type().unwrap();
        assert!(decoder.instructions().unwrap().contains("\"age\""));

        let person = decoder.decode(r#"{"name": "Bo", "age": 7}"#).await.unwrap();
        assert_eq!(person.age, 7);
    }

    #[test]
    fn test_invalid_schema() {
        let err = JsonSchemaDecoder::<Person>::new(json!({ "type": 12 }))
            .unwrap_err();
        assert!(matches!(err, crate::Error::SchemaCompilation(_)));
    }
}
