use crate::{
    endpoint::endpoint::Endpoint, request_builder::error::ConstructionError,
    transport::request::Request,
};

pub trait RequestBuilder: Send + Sync {
    fn build(&self, endpoint: &dyn Endpoint) -> Result<Request, ConstructionError>;
}
