use bytes::Bytes;

use crate::transport::request::{Headers, RequestMethod};

/// Payload attached to an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointBody {
    /// Serialized as JSON; implies `content-type: application/json`.
    Json(serde_json::Value),
    Raw(Bytes),
}

/// Describes where a request goes and what it carries, before it has been
/// resolved into a concrete [`Request`](crate::transport::request::Request).
pub trait Endpoint: Send + Sync {
    fn scheme(&self) -> &str {
        "https"
    }

    fn host(&self) -> &str;

    fn path(&self) -> &str;

    fn method(&self) -> RequestMethod {
        RequestMethod::Get
    }

    fn headers(&self) -> Headers {
        Headers::default()
    }

    /// Query items, appended in order.
    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn body(&self) -> Option<EndpointBody> {
        None
    }
}
