use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::transport::{
    error::{TransportError, TransportErrorChecker},
    request::{Headers, Request, RequestMethod},
    response::{Response, ResponseMetadata},
    transport::Transport,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::from)?;

        Ok(Self { client })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to build reqwest client"),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: Request) -> Result<Response, TransportError> {
        debug!("Sending {} {}", request.method, request.url);

        let reqwest_builder = self
            .client
            .request(request.method.into(), request.url)
            .headers(request.headers.into())
            .body(request.body);

        let reqwest_response = reqwest_builder.send().await.map_err(|error| {
            warn!("Transport failure: {}", error);
            TransportError::from(error)
        })?;

        let status = reqwest_response.status().as_u16();

        let headers: Headers = reqwest_response.headers().into();

        let body = reqwest_response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        debug!("Received status {} with {} bytes", status, body.len());

        Ok(Response {
            metadata: Some(ResponseMetadata { status, headers }),
            body: Some(body),
        })
    }
}

impl TransportErrorChecker for reqwest::Error {
    fn is_timeout(&self) -> bool {
        self.is_timeout()
    }

    fn is_connect(&self) -> bool {
        self.is_connect()
    }

    fn is_request(&self) -> bool {
        self.is_request()
    }

    fn error_string(&self) -> String {
        self.to_string()
    }
}

impl From<&HeaderMap> for Headers {
    fn from(headers: &HeaderMap) -> Self {
        headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|val| (k.to_string(), val.to_string())))
            .collect()
    }
}

impl From<Headers> for HeaderMap {
    fn from(h: Headers) -> Self {
        let mut header_map = HeaderMap::new();
        for (k, v) in h.iter() {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                header_map.insert(name, value);
            }
        }
        header_map
    }
}

impl From<RequestMethod> for reqwest::Method {
    fn from(value: RequestMethod) -> Self {
        match value {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Delete => reqwest::Method::DELETE,
            RequestMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, HeaderName, HeaderValue, Method};

    use crate::transport::request::{Headers, RequestMethod};

    #[test]
    fn extracts_only_valid_headers_from_header_map() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            HeaderName::from_static("x-custom-header"),
            HeaderValue::from_static("custom-value"),
        );
        headers.insert(
            HeaderName::from_static("invalid-header"),
            HeaderValue::from_bytes(&[0xFF, 0xFE]).unwrap(),
        );

        let result: Headers = (&headers).into();

        assert_eq!(result.len(), 2);
        assert_eq!(
            result.get("content-type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(
            result.get("x-custom-header"),
            Some(&"custom-value".to_string())
        );
        assert_eq!(result.get("invalid-header"), None);
    }

    #[test]
    fn builds_header_map_skipping_invalid_names() {
        let mut headers = Headers::default();
        headers.insert("content-type".to_string(), "application/json".to_string());
        headers.insert("bad header".to_string(), "value".to_string());

        let result: HeaderMap = headers.into();

        assert_eq!(result.len(), 1);
        assert_eq!(
            result.get("content-type"),
            Some(&HeaderValue::from_static("application/json"))
        );
    }

    #[test]
    fn converts_domain_http_methods_into_http_methods() {
        assert_eq!(Method::from(RequestMethod::Get), Method::GET);
        assert_eq!(Method::from(RequestMethod::Post), Method::POST);
        assert_eq!(Method::from(RequestMethod::Put), Method::PUT);
        assert_eq!(Method::from(RequestMethod::Delete), Method::DELETE);
        assert_eq!(Method::from(RequestMethod::Patch), Method::PATCH);
    }
}
