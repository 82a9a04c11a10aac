use std::{
    collections::HashMap,
    fmt::{self, Display},
    ops::{Deref, DerefMut},
    str::FromStr,
};

use bytes::Bytes;
use url::Url;

/// A fully resolved request, ready to be handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: RequestMethod,
    pub url: Url,
    pub headers: Headers,
    pub body: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers(pub HashMap<String, String>);

impl Headers {
    /// Case-insensitive lookup, as header names are.
    pub fn get_ignore_case(&self, name: &str) -> Option<&String> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

impl Deref for Headers {
    type Target = HashMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Headers {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const N: usize> From<[(String, String); N]> for Headers {
    fn from(arr: [(String, String); N]) -> Self {
        let map = arr.into_iter().collect();
        Headers(map)
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Headers(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Patch => "PATCH",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for RequestMethod {
    type Err = RequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Ok(RequestMethod::Get),
            "POST" => Ok(RequestMethod::Post),
            "PUT" => Ok(RequestMethod::Put),
            "DELETE" => Ok(RequestMethod::Delete),
            "PATCH" => Ok(RequestMethod::Patch),
            _ => Err(RequestError::UnsupportedMethod(value.to_string())),
        }
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("HTTP method {0} is not supported")]
    UnsupportedMethod(String),
}
