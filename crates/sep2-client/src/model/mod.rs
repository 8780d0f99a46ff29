// crates/sep2-client/src/model/mod.rs

//! Typed 2030.5 resources.
//!
//! Field names follow Rust conventions; the wire names (`lFDI`,
//! `deviceCategory`, `DERCapability`, ...) are declared next to each field in
//! the `XmlResource` implementations.

mod common;
mod der;
mod edev;
mod metering;

pub use common::{ActivePower, DateTimeInterval, GpsLocation, Link, ReactivePower, UnitValue, ValueWithMultiplier};
pub use der::{Der, DerCapability};
pub use edev::{ConnectionPoint, DeviceInformation, EndDevice};
pub use metering::{MirrorMeterReading, MirrorReadingSet, MirrorUsagePoint, Reading, ReadingType};
