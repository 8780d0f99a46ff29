// crates/sep2-client/tests/simulator/mod.rs

use sep2_client::{Method, Response, Sep2Error, Transport};
use std::collections::{HashMap, VecDeque};

/// A request as seen by the simulated server.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

/// A scripted 2030.5 server.
///
/// Responses are queued per (method, path) and consumed in order. A request
/// with nothing queued answers 404.
#[derive(Default)]
pub struct MockServer {
    routes: HashMap<(Method, String), VecDeque<Response>>,
    connected: bool,
    /// Every request received, in order.
    pub requests: Vec<Request>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with an optional `location` header.
    pub fn respond(&mut self, method: Method, path: &str, status: u16, location: Option<&str>) -> &mut Self {
        let mut response = Response::new(method, format!("https://server{}", path), status);
        if let Some(location) = location {
            response = response.with_header("Location", location);
        }
        self.push(method, path, response)
    }

    pub fn respond_with_body(&mut self, method: Method, path: &str, status: u16, body: &str) -> &mut Self {
        let response = Response::new(method, format!("https://server{}", path), status).with_body(body);
        self.push(method, path, response)
    }

    fn push(&mut self, method: Method, path: &str, response: Response) -> &mut Self {
        self.routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    /// "METHOD path" of every request received.
    pub fn request_lines(&self) -> Vec<String> {
        self.requests
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    fn handle(&mut self, method: Method, path: &str, body: Option<&str>) -> Response {
        self.requests.push(Request {
            method,
            path: path.to_string(),
            body: body.map(str::to_string),
        });
        self.routes
            .get_mut(&(method, path.to_string()))
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Response::new(method, format!("https://server{}", path), 404))
    }
}

impl Transport for MockServer {
    fn connect(&mut self) -> Result<(), Sep2Error> {
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn get(&mut self, path: &str) -> Result<Response, Sep2Error> {
        Ok(self.handle(Method::Get, path, None))
    }

    fn post(&mut self, path: &str, document: &str) -> Result<Response, Sep2Error> {
        Ok(self.handle(Method::Post, path, Some(document)))
    }

    fn put(&mut self, path: &str, document: &str) -> Result<Response, Sep2Error> {
        Ok(self.handle(Method::Put, path, Some(document)))
    }
}
