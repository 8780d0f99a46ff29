// crates/sep2-client/src/model/common.rs

//! Small value resources shared by the device and metering models.

use crate::error::Sep2Error;
use crate::resource::{Field, FieldPolicy, FieldReader, Mode, XmlResource};
use crate::types::{PowerOfTenMultiplier, UomType};
use crate::xml::XmlMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// A mantissa scaled by a power of ten: `value * 10^multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValueWithMultiplier {
    pub multiplier: PowerOfTenMultiplier,
    pub value: i64,
}

/// Active power in W.
pub type ActivePower = ValueWithMultiplier;
/// Reactive power in var.
pub type ReactivePower = ValueWithMultiplier;

impl ValueWithMultiplier {
    pub fn new(value: i64) -> Self {
        Self {
            multiplier: PowerOfTenMultiplier::default(),
            value,
        }
    }

    pub fn with_multiplier(value: i64, multiplier: PowerOfTenMultiplier) -> Self {
        Self { multiplier, value }
    }

    pub fn as_f64(&self) -> f64 {
        self.multiplier.apply(self.value)
    }
}

impl XmlResource for ValueWithMultiplier {
    const ELEMENT: &'static str = "ValueWithMultiplier";

    fn field_policy(_mode: Mode) -> FieldPolicy {
        FieldPolicy::Include(&["multiplier", "value"])
    }

    fn fields(&self, _mode: Mode) -> Vec<Field> {
        vec![
            Field::value("multiplier", "multiplier", Some(&self.multiplier)),
            Field::value("value", "value", Some(&self.value)),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            multiplier: reader.or_default("multiplier", "multiplier", PowerOfTenMultiplier::default())?,
            value: reader.required("value", "value")?,
        })
    }
}

/// A value with its unit of measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitValue {
    pub multiplier: PowerOfTenMultiplier,
    pub unit: UomType,
    pub value: i64,
}

impl XmlResource for UnitValue {
    const ELEMENT: &'static str = "UnitValue";

    fn fields(&self, _mode: Mode) -> Vec<Field> {
        vec![
            Field::value("multiplier", "multiplier", Some(&self.multiplier)),
            Field::value("unit", "unit", Some(&self.unit)),
            Field::value("value", "value", Some(&self.value)),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            multiplier: reader.required("multiplier", "multiplier")?,
            unit: reader.required("unit", "unit")?,
            value: reader.required("value", "value")?,
        })
    }
}

/// A span of time: start (seconds since epoch) and duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeInterval {
    pub duration: u32,
    pub start: i64,
}

impl DateTimeInterval {
    /// The interval from `start` to `end`. An `end` before `start` gives a zero duration.
    pub fn between(start: i64, end: i64) -> Self {
        let duration = end.saturating_sub(start).clamp(0, i64::from(u32::MAX));
        Self {
            duration: duration as u32,
            start,
        }
    }

    /// End of the interval, saturating at `i64::MAX`.
    pub fn end(&self) -> i64 {
        self.start.saturating_add(i64::from(self.duration))
    }
}

impl XmlResource for DateTimeInterval {
    const ELEMENT: &'static str = "DateTimeInterval";

    fn fields(&self, _mode: Mode) -> Vec<Field> {
        vec![
            Field::value("duration", "duration", Some(&self.duration)),
            Field::value("start", "start", Some(&self.start)),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            duration: reader.required("duration", "duration")?,
            start: reader.required("start", "start")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsLocation {
    pub lat: f64,
    pub lon: f64,
}

impl XmlResource for GpsLocation {
    const ELEMENT: &'static str = "GPSLocation";

    fn fields(&self, _mode: Mode) -> Vec<Field> {
        vec![
            Field::value("lat", "lat", Some(&self.lat)),
            Field::value("lon", "lon", Some(&self.lon)),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            lat: reader.required("lat", "lat")?,
            lon: reader.required("lon", "lon")?,
        })
    }
}

/// Reference to another resource. `all` is set on list links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub all: Option<u32>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            all: None,
        }
    }
}

impl XmlResource for Link {
    const ELEMENT: &'static str = "Link";

    fn fields(&self, _mode: Mode) -> Vec<Field> {
        vec![
            Field::value("href", "@href", Some(&self.href)),
            Field::value("all", "@all", self.all.as_ref()),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            href: reader.required("href", "@href")?,
            all: reader.optional("all", "@all")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{decode_document, encode_document};

    #[test]
    fn test_value_with_multiplier_always_writes_multiplier() {
        let power = ActivePower::new(5000);
        assert_eq!(
            encode_document(&power, Mode::Create).unwrap(),
            "<ValueWithMultiplier><multiplier>0</multiplier><value>5000</value></ValueWithMultiplier>"
        );
        assert_eq!(power.as_f64(), 5000.0);
    }

    #[test]
    fn test_value_with_multiplier_rejects_out_of_range_exponent() {
        let xml = "<ValueWithMultiplier><multiplier>12</multiplier><value>1</value></ValueWithMultiplier>";
        assert!(decode_document::<ValueWithMultiplier>(xml).is_err());

        let xml = "<ValueWithMultiplier><multiplier>3</multiplier><value>7</value></ValueWithMultiplier>";
        let decoded = decode_document::<ValueWithMultiplier>(xml).unwrap();
        assert_eq!(decoded.as_f64(), 7000.0);
    }

    #[test]
    fn test_interval_between() {
        let interval = DateTimeInterval::between(1_000, 1_300);
        assert_eq!(interval.duration, 300);
        assert_eq!(interval.end(), 1_300);
        assert_eq!(DateTimeInterval::between(50, 10).duration, 0);
    }

    #[test]
    fn test_interval_end_saturates() {
        let interval = DateTimeInterval {
            duration: u32::MAX,
            start: i64::MAX - 10,
        };
        assert_eq!(interval.end(), i64::MAX);
    }

    #[test]
    fn test_link_href_is_an_attribute() {
        let link = Link {
            href: "/edev/3/der".into(),
            all: Some(2),
        };
        assert_eq!(
            encode_document(&link, Mode::Link).unwrap(),
            r#"<Link href="/edev/3/der" all="2"></Link>"#
        );
        assert_eq!(decode_document::<Link>(r#"<Link href="/x"/>"#).unwrap(), Link::new("/x"));
    }
}
