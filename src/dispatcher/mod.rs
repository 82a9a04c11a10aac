#[allow(clippy::module_inception)]
pub mod dispatcher;
pub mod error;
pub mod status_error;
