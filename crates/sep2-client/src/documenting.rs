// crates/sep2-client/src/documenting.rs

//! A transport that documents requests instead of sending them.
//!
//! Useful to produce example exchanges for integration guides and to dry-run
//! a registration without a server.

use crate::error::Sep2Error;
use crate::identity::IdGenerator;
use crate::log::{client_debug, client_info};
use crate::model::EndDevice;
use crate::resource::{Mode, encode_document};
use crate::transport::{Method, Response, Transport, log_response};
use crate::types::{DeviceCategory, Lfdi};
use crate::xml::{parse_document, write_document_pretty};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// LFDI of the device returned for simulated `GET /edev/{id}` requests.
const CANNED_DEVICE_LFDI: &str = "0x3497623952";

/// Renders every request to the log and an in-memory transcript.
///
/// POST answers 201 and PUT answers 200, both with a `location` whose
/// trailing id comes from the injected [`IdGenerator`]. GET of an EndDevice
/// answers with a fixed device in show mode; any other GET is a 404.
#[derive(Debug, Clone)]
pub struct DocumentingTransport {
    base_url: String,
    ids: IdGenerator,
    connected: bool,
    transcript: Vec<String>,
}

impl DocumentingTransport {
    pub fn new(base_url: impl Into<String>, ids: IdGenerator) -> Self {
        Self {
            base_url: base_url.into(),
            ids,
            connected: false,
            transcript: Vec::new(),
        }
    }

    /// Rendered requests, oldest first.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn record(&mut self, method: Method, path: &str, document: Option<&str>) -> Result<String, Sep2Error> {
        let url = self.url(path);
        let mut entry = format!("{} {}\n", method, url);
        if let Some(document) = document {
            entry.push_str("Content-Type: application/xml\n\n");
            entry.push_str(&write_document_pretty(&parse_document(document)?)?);
        }
        client_debug!("Documented request:\n{}", entry);
        self.transcript.push(entry);
        Ok(url)
    }

    fn created(&mut self, method: Method, path: &str, url: String, status: u16) -> Response {
        let location = format!("{}/{}", path.trim_end_matches('/'), self.ids.next_id());
        let response = Response::new(method, url, status).with_header("location", location);
        log_response(&response);
        response
    }

    fn canned_device(path: &str) -> Result<Option<String>, Sep2Error> {
        let is_device = path
            .strip_prefix("/edev/")
            .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()));
        if !is_device {
            return Ok(None);
        }
        let mut device = EndDevice::new(
            Lfdi::new(CANNED_DEVICE_LFDI)?,
            DeviceCategory::CombinedPvAndStorage,
        )?;
        device.href = Some(path.to_string());
        encode_document(&device, Mode::Show).map(Some)
    }
}

impl Transport for DocumentingTransport {
    fn connect(&mut self) -> Result<(), Sep2Error> {
        if self.connected {
            client_info!("DocumentingTransport is already connected");
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn get(&mut self, path: &str) -> Result<Response, Sep2Error> {
        let url = self.record(Method::Get, path, None)?;
        let response = match Self::canned_device(path)? {
            Some(body) => Response::new(Method::Get, url, 200).with_body(body),
            None => Response::new(Method::Get, url, 404),
        };
        log_response(&response);
        Ok(response)
    }

    fn post(&mut self, path: &str, document: &str) -> Result<Response, Sep2Error> {
        let url = self.record(Method::Post, path, Some(document))?;
        Ok(self.created(Method::Post, path, url, 201))
    }

    fn put(&mut self, path: &str, document: &str) -> Result<Response, Sep2Error> {
        let url = self.record(Method::Put, path, Some(document))?;
        Ok(self.created(Method::Put, path, url, 200))
    }

    fn close(&mut self) -> Result<(), Sep2Error> {
        self.connected = false;
        Ok(())
    }
}
