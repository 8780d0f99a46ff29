// crates/sep2-client-http/src/lib.rs

//! Blocking HTTP transport for `sep2-client`, with client certificate or
//! X-Token authentication and environment based configuration.

mod auth;
mod config;

pub use auth::{ClientCertificateAuth, LocalModeXTokenAuth, SessionAuth};
pub use config::{ClientConfig, ConfigError, ENV_FILE, ENV_PREFIX, create_client};

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use sep2_client::{Method, Response, Sep2Error, Transport, log_response};

fn transport_error(e: reqwest::Error) -> Sep2Error {
    Sep2Error::Transport(e.to_string())
}

/// A [`Transport`] over a blocking `reqwest` client.
///
/// Request paths are resolved against the base URL the way a browser resolves
/// links: `/edev` replaces the base path, `edev` is appended to it.
pub struct HttpTransport {
    base_url: Url,
    auth: Option<Box<dyn SessionAuth>>,
    client: Option<Client>,
}

impl HttpTransport {
    pub fn new(base_url: &str, auth: Option<Box<dyn SessionAuth>>) -> Result<Self, Sep2Error> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Sep2Error::Transport(format!("Invalid server URL '{}': {}", base_url, e)))?;
        Ok(Self {
            base_url,
            auth,
            client: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of `path`.
    pub fn url(&self, path: &str) -> Result<Url, Sep2Error> {
        self.base_url
            .join(path)
            .map_err(|e| Sep2Error::Transport(format!("Invalid path '{}': {}", path, e)))
    }

    fn send(&mut self, method: Method, path: &str, document: Option<&str>) -> Result<Response, Sep2Error> {
        let url = self.url(path)?;
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| Sep2Error::Transport("HttpTransport is not connected".to_string()))?;

        let request = match method {
            Method::Get => client.get(url),
            Method::Post => client.post(url),
            Method::Put => client.put(url),
        };
        let request = match document {
            Some(document) => request.body(document.to_string()),
            None => request,
        };
        let reply = request.send().map_err(transport_error)?;

        let status = reply.status().as_u16();
        let url = reply.url().to_string();
        let headers = reply
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = reply.text().map_err(transport_error)?;

        let response = Response {
            method,
            url,
            status,
            headers,
            body,
        };
        log_response(&response);
        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn connect(&mut self) -> Result<(), Sep2Error> {
        if self.client.is_some() {
            log::info!("HttpTransport is already connected");
            return Ok(());
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));
        let mut builder = Client::builder();
        if let Some(auth) = &self.auth {
            headers.extend(auth.headers()?);
            if let Some(identity) = auth.identity()? {
                builder = builder.identity(identity);
            }
        }

        let client = builder
            .default_headers(headers)
            .build()
            .map_err(transport_error)?;
        log::debug!("Connected to {}", self.base_url);
        self.client = Some(client);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    fn get(&mut self, path: &str) -> Result<Response, Sep2Error> {
        self.send(Method::Get, path, None)
    }

    fn post(&mut self, path: &str, document: &str) -> Result<Response, Sep2Error> {
        self.send(Method::Post, path, Some(document))
    }

    fn put(&mut self, path: &str, document: &str) -> Result<Response, Sep2Error> {
        self.send(Method::Put, path, Some(document))
    }

    fn close(&mut self) -> Result<(), Sep2Error> {
        self.client = None;
        Ok(())
    }
}
