use bytes::Bytes;
use tracing::debug;
use url::Url;

use crate::{
    endpoint::endpoint::{Endpoint, EndpointBody},
    request_builder::{error::ConstructionError, request_builder::RequestBuilder},
    transport::request::Request,
};

const CONTENT_TYPE: &str = "content-type";
const APPLICATION_JSON: &str = "application/json";

/// Resolves an [`Endpoint`] into a [`Request`] by composing
/// `scheme://host`, the path and the query items.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlRequestBuilder;

impl UrlRequestBuilder {
    fn base_url(endpoint: &dyn Endpoint) -> Result<Url, ConstructionError> {
        let host = endpoint.host();
        let host_error = || ConstructionError::CouldNotConstructUrlFromHost {
            host: host.to_string(),
        };

        let url = Url::parse(&format!("{}://{}", endpoint.scheme(), host))
            .map_err(|_| host_error())?;

        // The host must not smuggle in a path, query or fragment.
        if url.host_str().is_none()
            || url.path() != "/"
            || url.query().is_some()
            || url.fragment().is_some()
        {
            return Err(host_error());
        }

        Ok(url)
    }
}

impl RequestBuilder for UrlRequestBuilder {
    fn build(&self, endpoint: &dyn Endpoint) -> Result<Request, ConstructionError> {
        let mut url = Self::base_url(endpoint)?;

        let path = endpoint.path();
        if !path.is_empty() && !path.starts_with('/') {
            return Err(ConstructionError::CouldNotConstructUrlComponents {
                url: url.to_string(),
            });
        }
        url.set_path(path);

        let query = endpoint.query();
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        let mut headers = endpoint.headers();
        let body = match endpoint.body() {
            Some(EndpointBody::Json(value)) => {
                if headers.get_ignore_case(CONTENT_TYPE).is_none() {
                    headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
                }
                Bytes::from(value.to_string())
            }
            Some(EndpointBody::Raw(bytes)) => bytes,
            None => Bytes::new(),
        };

        debug!("Built {} {}", endpoint.method(), url);

        Ok(Request {
            method: endpoint.method(),
            url,
            headers,
            body,
        })
    }
}
