pub mod error;
pub mod request;
pub mod reqwest_transport;
pub mod response;
#[allow(clippy::module_inception)]
pub mod transport;
