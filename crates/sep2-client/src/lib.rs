// src/lib.rs

#![no_std]
#![doc = "An IEEE 2030.5 (Smart Energy Profile 2.0) aggregator client."]
#![doc = ""]
#![doc = "This `no_std + alloc` library registers an aggregator's downstream devices"]
#![doc = "with a 2030.5 server. It provides:"]
#![doc = "- Device identity: SFDI derivation from an LFDI, label encoding, mRID generation."]
#![doc = "- Typed resources (`EndDevice`, `DERCapability`, `MirrorUsagePoint`, ...) with"]
#![doc = "  create/link/show serialization modes and include/exclude field filtering."]
#![doc = "- `EndDeviceInterface`: the EndDevice and MirrorUsagePoint operations, paged"]
#![doc = "  listing and the device registration sequence over any `Transport`."]
#![doc = "- `DocumentingTransport`: a transport that records requests for dry runs."]

extern crate alloc;

// --- Crate Modules ---

mod documenting;
mod error;
pub mod identity;
mod interface;
mod list;
mod log;
pub mod model;
mod resource;
mod transport;
pub mod types;
pub mod xml;

// --- Public API Re-exports ---

pub use documenting::DocumentingTransport;
pub use error::Sep2Error;
pub use identity::{IdGenerator, compute_sfdi, generate_mrid, lfdi_from_label, label_from_lfdi, sfdi_from_lfdi};
pub use interface::{EndDeviceInterface, PagedResources};
pub use list::{EndDeviceList, ListItem, MirrorUsagePointList, ResourceList};
pub use crate::log::{LogContext, LogMetadata};
pub use resource::{
    Field, FieldPolicy, FieldReader, Mode, Selection, WireValue, XmlResource, decode_document,
    decode_value, encode, encode_document, encode_filtered,
};
pub use transport::{Method, Response, Transport, log_response, trailing_resource_id};
pub use types::{Lfdi, Sfdi};
