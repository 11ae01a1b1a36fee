use std::future::ready;

use super::{Decoder, Error};

/// A decoder that hands back the generated text unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTextDecoder;

impl Decoder for PlainTextDecoder {
    type Output = String;

    fn name(&self) -> &str {
        "plain-text"
    }

    fn decode(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Self::Output, Error>> + Send {
        ready(Ok(text.to_owned()))
    }
}
