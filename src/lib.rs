pub mod decoder;
pub mod dispatcher;
pub mod endpoint;
pub mod request_builder;
pub mod transport;

pub use decoder::date::{Date, DateDecodingStrategy};
pub use dispatcher::{dispatcher::Dispatcher, error::DispatchError, status_error::StatusError};
pub use endpoint::{
    endpoint::{Endpoint, EndpointBody},
    http_endpoint::HttpEndpoint,
};
pub use request_builder::error::ConstructionError;
pub use transport::{
    error::TransportError,
    request::{Headers, Request, RequestMethod},
    reqwest_transport::ReqwestTransport,
    response::{Response, ResponseMetadata},
    transport::Transport,
};
