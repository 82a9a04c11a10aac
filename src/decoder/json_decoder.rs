use serde::de::DeserializeOwned;

use crate::decoder::date::{DateDecodingStrategy, with_date_strategy};

/// Decodes JSON bodies, applying a fixed [`DateDecodingStrategy`] to every
/// [`Date`](crate::decoder::date::Date) in the target type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonDecoder {
    date_strategy: DateDecodingStrategy,
}

impl JsonDecoder {
    pub fn new(date_strategy: DateDecodingStrategy) -> Self {
        Self { date_strategy }
    }

    pub fn date_strategy(&self) -> &DateDecodingStrategy {
        &self.date_strategy
    }

    pub fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, serde_json::Error> {
        with_date_strategy(&self.date_strategy, || serde_json::from_slice(data))
    }
}
