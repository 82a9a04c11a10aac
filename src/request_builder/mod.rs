pub mod error;
#[allow(clippy::module_inception)]
pub mod request_builder;
pub mod url_request_builder;
