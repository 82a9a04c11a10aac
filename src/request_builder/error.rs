/// An endpoint could not be turned into a valid request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("Could not construct URL from host {host:?}")]
    CouldNotConstructUrlFromHost { host: String },

    #[error("Could not construct URL components from {url}")]
    CouldNotConstructUrlComponents { url: String },
}
