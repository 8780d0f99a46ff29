// crates/sep2-client/src/error.rs

use alloc::string::String;
use core::fmt;
use hex::FromHexError;
use quick_xml::escape::EscapeError;
use quick_xml::events::attributes::AttrError;
use quick_xml::Error as XmlError;

/// Errors raised while mapping 2030.5 resources or talking to the server.
#[derive(Debug)]
pub enum Sep2Error {
    /// An error from the underlying `quick-xml` reader or writer.
    XmlParsing(XmlError),

    /// An element carried a malformed attribute.
    XmlAttribute(AttrError),

    /// Text or an attribute value contained an invalid escape sequence.
    XmlEscape(EscapeError),

    /// A hex string (LFDI, label) could not be decoded.
    HexParsing(FromHexError),

    /// The document was not well formed (unbalanced tags, no root, ...).
    MalformedDocument(&'static str),

    /// A required XML element was missing.
    MissingElement { element: &'static str },

    /// A field was present but its text could not be converted.
    InvalidValue { field: &'static str, value: String },

    /// The LFDI has fewer significant bits than the SFDI truncation needs.
    LfdiTooShort { bits: u64 },

    /// A create/update response had no `location` header.
    MissingLocation,

    /// The trailing segment of a `location` header is not an integer id.
    InvalidLocation(String),

    /// The server answered a mandatory request with an unexpected status.
    UnexpectedStatus { status: u16, body: String },

    /// The transport failed to complete an exchange.
    Transport(String),
}

impl From<XmlError> for Sep2Error {
    fn from(e: XmlError) -> Self {
        Sep2Error::XmlParsing(e)
    }
}

impl From<AttrError> for Sep2Error {
    fn from(e: AttrError) -> Self {
        Sep2Error::XmlAttribute(e)
    }
}

impl From<EscapeError> for Sep2Error {
    fn from(e: EscapeError) -> Self {
        Sep2Error::XmlEscape(e)
    }
}

impl From<FromHexError> for Sep2Error {
    fn from(e: FromHexError) -> Self {
        Sep2Error::HexParsing(e)
    }
}

impl fmt::Display for Sep2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sep2Error::XmlParsing(e) => write!(f, "XML parsing error: {}", e),
            Sep2Error::XmlAttribute(e) => write!(f, "XML attribute error: {}", e),
            Sep2Error::XmlEscape(e) => write!(f, "XML escape error: {}", e),
            Sep2Error::HexParsing(e) => write!(f, "Hex parsing error: {}", e),
            Sep2Error::MalformedDocument(msg) => write!(f, "Malformed XML document: {}", msg),
            Sep2Error::MissingElement { element } => {
                write!(f, "Missing required XML element: {}", element)
            }
            Sep2Error::InvalidValue { field, value } => {
                write!(f, "Invalid value for {}: {:?}", field, value)
            }
            Sep2Error::LfdiTooShort { bits } => write!(
                f,
                "LFDI has {} significant bits, at least 36 are needed to derive an SFDI",
                bits
            ),
            Sep2Error::MissingLocation => write!(f, "Response object has no location resource"),
            Sep2Error::InvalidLocation(loc) => {
                write!(f, "Location does not end in a resource id: {}", loc)
            }
            Sep2Error::UnexpectedStatus { status, body } => {
                write!(f, "Server returned {}: {}", status, body)
            }
            Sep2Error::Transport(msg) => write!(f, "Transport error: {}", msg),
        }
    }
}

impl core::error::Error for Sep2Error {}
