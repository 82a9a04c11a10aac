use async_trait::async_trait;

use crate::transport::{error::TransportError, request::Request, response::Response};

/// Performs the network I/O for a single request.
///
/// The dispatcher never talks to the network itself; production code plugs in
/// [`ReqwestTransport`](crate::transport::reqwest_transport::ReqwestTransport)
/// and tests substitute a fake. A failed request carries no status or body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response, TransportError>;
}
