// crates/sep2-client-http/src/auth.rs

//! Session authentication for [`HttpTransport`](crate::HttpTransport).

use reqwest::Identity;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use sep2_client::{Lfdi, Sep2Error};
use std::fs;
use std::path::{Path, PathBuf};

/// Credentials applied to every request of a session.
pub trait SessionAuth {
    /// Headers added to the session defaults.
    fn headers(&self) -> Result<HeaderMap, Sep2Error> {
        Ok(HeaderMap::new())
    }

    /// TLS client identity, if the scheme uses one.
    fn identity(&self) -> Result<Option<Identity>, Sep2Error> {
        Ok(None)
    }
}

/// Mutual TLS with a client certificate issued by the utility's CA.
#[derive(Debug, Clone)]
pub struct ClientCertificateAuth {
    cert_path: PathBuf,
    key_path: PathBuf,
}

impl ClientCertificateAuth {
    pub fn new(cert_path: impl AsRef<Path>, key_path: impl AsRef<Path>) -> Self {
        Self {
            cert_path: cert_path.as_ref().to_path_buf(),
            key_path: key_path.as_ref().to_path_buf(),
        }
    }
}

impl SessionAuth for ClientCertificateAuth {
    fn identity(&self) -> Result<Option<Identity>, Sep2Error> {
        let mut pem = read_pem(&self.cert_path)?;
        pem.extend(read_pem(&self.key_path)?);
        Identity::from_pem(&pem)
            .map(Some)
            .map_err(|e| Sep2Error::Transport(format!("Invalid client identity: {}", e)))
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, Sep2Error> {
    fs::read(path).map_err(|e| Sep2Error::Transport(format!("Failed to read {:?}: {}", path, e)))
}

/// Local-mode authentication: the server trusts an `X-Token` header carrying
/// the client LFDI as a decimal integer.
#[derive(Debug, Clone)]
pub struct LocalModeXTokenAuth {
    lfdi: Lfdi,
}

impl LocalModeXTokenAuth {
    pub fn new(lfdi: Lfdi) -> Self {
        Self { lfdi }
    }
}

impl SessionAuth for LocalModeXTokenAuth {
    fn headers(&self) -> Result<HeaderMap, Sep2Error> {
        let token = HeaderValue::from_str(&self.lfdi.to_decimal_string())
            .map_err(|e| Sep2Error::Transport(e.to_string()))?;
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-token"), token);
        // Must be present, even empty, for the server to accept local auth.
        headers.insert(
            HeaderName::from_static("x-forwarded-client-cert"),
            HeaderValue::from_static(""),
        );
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_token_is_decimal_lfdi() {
        let auth = LocalModeXTokenAuth::new(Lfdi::new("0x21352135135").unwrap());
        let headers = auth.headers().unwrap();
        assert_eq!(headers.get("x-token").unwrap(), "2282004631861");
        assert_eq!(headers.get("x-forwarded-client-cert").unwrap(), "");
        assert!(auth.identity().unwrap().is_none());
    }

    #[test]
    fn test_missing_certificate_is_a_transport_error() {
        let auth = ClientCertificateAuth::new("/nonexistent/client.pem", "/nonexistent/client.key");
        assert!(matches!(auth.identity(), Err(Sep2Error::Transport(_))));
        assert!(auth.headers().unwrap().is_empty());
    }
}
