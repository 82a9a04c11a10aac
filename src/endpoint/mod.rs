#[allow(clippy::module_inception)]
pub mod endpoint;
pub mod http_endpoint;
