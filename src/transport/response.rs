use bytes::Bytes;

use crate::transport::request::Headers;

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMetadata {
    pub status: u16,
    pub headers: Headers,
}

/// What a transport hands back when it did not fail.
///
/// Both parts are optional: a transport may complete without response
/// metadata, and a response may carry no body at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub metadata: Option<ResponseMetadata>,
    pub body: Option<Bytes>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            metadata: Some(ResponseMetadata {
                status,
                headers: Headers::default(),
            }),
            body: Some(body.into()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.metadata.as_ref().map(|metadata| metadata.status)
    }
}
