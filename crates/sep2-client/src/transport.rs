// crates/sep2-client/src/transport.rs

use crate::error::Sep2Error;
use crate::log::{client_info, client_warn};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// HTTP verbs used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed exchange, as seen by the interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub method: Method,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    pub fn new(method: Method, url: impl Into<String>, status: u16) -> Self {
        Self {
            method,
            url: url.into(),
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Any status below 400.
    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    /// Resource id from the `location` header.
    pub fn resource_id(&self) -> Result<u64, Sep2Error> {
        trailing_resource_id(self)
    }
}

/// Parses the id of a created resource from the final segment of `location`.
///
/// # Errors
/// `MissingLocation` when the header is absent, `InvalidLocation` when the
/// trailing segment is not an integer.
pub fn trailing_resource_id(response: &Response) -> Result<u64, Sep2Error> {
    let location = response.location().ok_or(Sep2Error::MissingLocation)?;
    let segment = location.rsplit('/').next().unwrap_or(location);
    segment
        .trim()
        .parse::<u64>()
        .map_err(|_| Sep2Error::InvalidLocation(location.to_string()))
}

/// Logs a completed exchange: statuses above 201 at warn level, the rest at info.
pub fn log_response(response: &Response) {
    if response.status > 201 {
        client_warn!(
            "{} {} returned status {}",
            response.method,
            response.url,
            response.status
        );
    } else {
        client_info!(
            "{} {} returned status {}",
            response.method,
            response.url,
            response.status
        );
    }
}

/// A blocking request/response channel to a 2030.5 server.
///
/// Paths are relative to the server base (`/edev`, `/edev/3/der`); bodies are
/// XML fragments sent as `application/xml`. Implementations own connection
/// setup and authentication.
pub trait Transport {
    /// Prepares the transport. Calling it on a connected transport is a no-op.
    fn connect(&mut self) -> Result<(), Sep2Error>;

    fn is_connected(&self) -> bool;

    fn get(&mut self, path: &str) -> Result<Response, Sep2Error>;

    fn post(&mut self, path: &str, document: &str) -> Result<Response, Sep2Error>;

    fn put(&mut self, path: &str, document: &str) -> Result<Response, Sep2Error>;

    fn close(&mut self) -> Result<(), Sep2Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(location: &str) -> Response {
        Response::new(Method::Post, "https://server/edev", 201).with_header("Location", location)
    }

    #[test]
    fn test_resource_id_from_location() {
        assert_eq!(created("/edev/42").resource_id().unwrap(), 42);
        assert_eq!(created("https://server/edev/3/der/5").resource_id().unwrap(), 5);
    }

    #[test]
    fn test_missing_location_is_an_error() {
        let response = Response::new(Method::Post, "/edev", 201);
        assert!(matches!(
            response.resource_id(),
            Err(Sep2Error::MissingLocation)
        ));
    }

    #[test]
    fn test_non_integer_location_is_an_error() {
        assert!(matches!(
            created("/edev/abc").resource_id(),
            Err(Sep2Error::InvalidLocation(loc)) if loc == "/edev/abc"
        ));
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let response = created("/edev/1");
        assert_eq!(response.header("LOCATION"), Some("/edev/1"));
        assert!(response.is_success());
        assert!(!Response::new(Method::Get, "/edev/9", 404).is_success());
    }
}
