use crate::{
    endpoint::endpoint::{Endpoint, EndpointBody},
    transport::request::{Headers, RequestMethod},
};

/// Plain-data [`Endpoint`] for call sites that do not want their own type.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpEndpoint {
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub method: RequestMethod,
    pub headers: Headers,
    pub query: Vec<(String, String)>,
    pub body: Option<EndpointBody>,
}

impl HttpEndpoint {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            scheme: "https".to_string(),
            host: host.into(),
            path: path.into(),
            method: RequestMethod::Get,
            headers: Headers::default(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query_item(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: EndpointBody) -> Self {
        self.body = Some(body);
        self
    }
}

impl Endpoint for HttpEndpoint {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> RequestMethod {
        self.method
    }

    fn headers(&self) -> Headers {
        self.headers.clone()
    }

    fn query(&self) -> Vec<(String, String)> {
        self.query.clone()
    }

    fn body(&self) -> Option<EndpointBody> {
        self.body.clone()
    }
}
