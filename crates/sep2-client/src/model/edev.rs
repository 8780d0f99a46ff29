// crates/sep2-client/src/model/edev.rs

use super::common::{GpsLocation, Link};
use super::der::Der;
use crate::error::Sep2Error;
use crate::list::ListItem;
use crate::resource::{Field, FieldPolicy, FieldReader, Mode, XmlResource};
use crate::types::{DeviceCategory, FunctionsImplemented, Lfdi, PowerSource, Sfdi};
use crate::xml::XmlMap;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

/// A device registered with the server.
///
/// The SFDI is derived from the LFDI at construction; a device decoded with
/// an explicit `sFDI` keeps it as given.
#[derive(Debug, Clone, PartialEq)]
pub struct EndDevice {
    pub href: Option<String>,
    pub device_category: DeviceCategory,
    pub lfdi: Lfdi,
    pub sfdi: Sfdi,
    pub changed_time: i64,
    pub enabled: bool,
    pub post_rate: u32,
    pub der_list_link: Option<Link>,
    pub device_information_link: Option<Link>,
    pub der: Vec<Der>,
    pub device_information: Option<DeviceInformation>,
    pub connection_point: Option<ConnectionPoint>,
}

impl EndDevice {
    /// A new device with its SFDI derived from `lfdi`.
    ///
    /// # Errors
    /// `LfdiTooShort` when the LFDI cannot yield an SFDI.
    pub fn new(lfdi: Lfdi, device_category: DeviceCategory) -> Result<Self, Sep2Error> {
        let sfdi = lfdi.sfdi()?;
        Ok(Self::with_sfdi(lfdi, sfdi, device_category))
    }

    /// A new device with a caller-supplied SFDI, used as-is.
    pub fn with_sfdi(lfdi: Lfdi, sfdi: Sfdi, device_category: DeviceCategory) -> Self {
        Self {
            href: None,
            device_category,
            lfdi,
            sfdi,
            changed_time: 0,
            enabled: true,
            post_rate: 0,
            der_list_link: None,
            device_information_link: None,
            der: Vec::new(),
            device_information: None,
            connection_point: None,
        }
    }

    pub fn with_device_information(mut self, info: DeviceInformation) -> Self {
        self.device_information = Some(info);
        self
    }

    pub fn with_der(mut self, der: Der) -> Self {
        self.der.push(der);
        self
    }

    pub fn with_connection_point(mut self, connection_point: ConnectionPoint) -> Self {
        self.connection_point = Some(connection_point);
        self
    }

    /// Server id parsed from the trailing segment of `href`.
    pub fn edev_id(&self) -> Option<u64> {
        self.href
            .as_deref()?
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse().ok())
    }
}

impl XmlResource for EndDevice {
    const ELEMENT: &'static str = "EndDevice";

    fn field_policy(mode: Mode) -> FieldPolicy {
        match mode {
            Mode::Create => FieldPolicy::Include(&[
                "device_category",
                "lfdi",
                "sfdi",
                "changed_time",
                "enabled",
                "post_rate",
            ]),
            Mode::Link => FieldPolicy::Include(&[
                "href",
                "der_list_link",
                "device_category",
                "device_information_link",
                "lfdi",
                "sfdi",
            ]),
            Mode::Show => FieldPolicy::Include(&[
                "device_category",
                "lfdi",
                "sfdi",
                "der",
                "device_information",
            ]),
        }
    }

    fn fields(&self, mode: Mode) -> Vec<Field> {
        vec![
            Field::value("href", "@href", self.href.as_ref()),
            Field::nested("der_list_link", "DERListLink", self.der_list_link.as_ref(), mode),
            Field::value("device_category", "deviceCategory", Some(&self.device_category)),
            Field::nested(
                "device_information_link",
                "DeviceInformationLink",
                self.device_information_link.as_ref(),
                mode,
            ),
            Field::value("lfdi", "lFDI", Some(&self.lfdi)),
            Field::value("sfdi", "sFDI", Some(&self.sfdi)),
            Field::value("changed_time", "changedTime", Some(&self.changed_time)),
            Field::value("enabled", "enabled", Some(&self.enabled)),
            Field::value("post_rate", "postRate", Some(&self.post_rate)),
            Field::nested_list("der", "DER", &self.der, mode),
            Field::nested(
                "device_information",
                "deviceInformation",
                self.device_information.as_ref(),
                mode,
            ),
            Field::nested(
                "connection_point",
                "connectionPoint",
                self.connection_point.as_ref(),
                mode,
            ),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        let lfdi: Lfdi = reader.required("lfdi", "lFDI")?;
        let sfdi = match reader.optional("sfdi", "sFDI")? {
            Some(sfdi) => sfdi,
            None => lfdi.sfdi()?,
        };
        Ok(Self {
            href: reader.optional("href", "@href")?,
            device_category: reader.required("device_category", "deviceCategory")?,
            lfdi,
            sfdi,
            changed_time: reader.or_default("changed_time", "changedTime", 0)?,
            enabled: reader.or_default("enabled", "enabled", true)?,
            post_rate: reader.or_default("post_rate", "postRate", 0)?,
            der_list_link: reader.nested("der_list_link", "DERListLink")?,
            device_information_link: reader
                .nested("device_information_link", "DeviceInformationLink")?,
            der: reader.list("der", "DER")?,
            device_information: reader.nested("device_information", "deviceInformation")?,
            connection_point: reader.nested("connection_point", "connectionPoint")?,
        })
    }
}

impl ListItem for EndDevice {
    const LIST_ELEMENT: &'static str = "EndDeviceList";
    const LIST_FIELD: &'static str = "end_device";

    fn lfdi(&self) -> Option<&Lfdi> {
        Some(&self.lfdi)
    }
}

/// Version text used when a device does not report one.
const NOT_AVAILABLE: &str = "NA";

/// Manufacturer and firmware details of a device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInformation {
    pub functions_implemented: Option<FunctionsImplemented>,
    pub gps_location: Option<GpsLocation>,
    pub lfdi: Lfdi,
    pub mf_date: i64,
    pub mf_hw_ver: String,
    /// IANA Private Enterprise Number of the manufacturer.
    pub mf_id: Option<u32>,
    pub mf_info: Option<String>,
    pub mf_model: Option<String>,
    pub mf_ser_num: Option<String>,
    pub primary_power: PowerSource,
    pub secondary_power: PowerSource,
    pub sw_act_time: i64,
    pub sw_ver: String,
}

impl DeviceInformation {
    pub fn new(lfdi: Lfdi) -> Self {
        Self {
            functions_implemented: None,
            gps_location: None,
            lfdi,
            mf_date: 0,
            mf_hw_ver: NOT_AVAILABLE.to_string(),
            mf_id: None,
            mf_info: None,
            mf_model: None,
            mf_ser_num: None,
            primary_power: PowerSource::None,
            secondary_power: PowerSource::None,
            sw_act_time: 0,
            sw_ver: NOT_AVAILABLE.to_string(),
        }
    }
}

impl XmlResource for DeviceInformation {
    const ELEMENT: &'static str = "DeviceInformation";

    fn fields(&self, mode: Mode) -> Vec<Field> {
        vec![
            Field::value(
                "functions_implemented",
                "functionsImplemented",
                self.functions_implemented.as_ref(),
            ),
            Field::nested("gps_location", "gpsLocation", self.gps_location.as_ref(), mode),
            Field::value("lfdi", "lFDI", Some(&self.lfdi)),
            Field::value("mf_date", "mfDate", Some(&self.mf_date)),
            Field::value("mf_hw_ver", "mfHwVer", Some(&self.mf_hw_ver)),
            Field::value("mf_id", "mfID", self.mf_id.as_ref()),
            Field::value("mf_info", "mfInfo", self.mf_info.as_ref()),
            Field::value("mf_model", "mfModel", self.mf_model.as_ref()),
            Field::value("mf_ser_num", "mfSerNum", self.mf_ser_num.as_ref()),
            Field::value("primary_power", "primaryPower", Some(&self.primary_power)),
            Field::value("secondary_power", "secondaryPower", Some(&self.secondary_power)),
            Field::value("sw_act_time", "swActTime", Some(&self.sw_act_time)),
            Field::value("sw_ver", "swVer", Some(&self.sw_ver)),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            functions_implemented: reader
                .optional("functions_implemented", "functionsImplemented")?,
            gps_location: reader.nested("gps_location", "gpsLocation")?,
            lfdi: reader.required("lfdi", "lFDI")?,
            mf_date: reader.or_default("mf_date", "mfDate", 0)?,
            mf_hw_ver: reader.or_default("mf_hw_ver", "mfHwVer", NOT_AVAILABLE.to_string())?,
            mf_id: reader.optional("mf_id", "mfID")?,
            mf_info: reader.optional("mf_info", "mfInfo")?,
            mf_model: reader.optional("mf_model", "mfModel")?,
            mf_ser_num: reader.optional("mf_ser_num", "mfSerNum")?,
            primary_power: reader.or_default("primary_power", "primaryPower", PowerSource::None)?,
            secondary_power: reader.or_default(
                "secondary_power",
                "secondaryPower",
                PowerSource::None,
            )?,
            sw_act_time: reader.or_default("sw_act_time", "swActTime", 0)?,
            sw_ver: reader.or_default("sw_ver", "swVer", NOT_AVAILABLE.to_string())?,
        })
    }
}

/// Where a device connects to the network. Aggregator extension to 2030.5.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionPoint {
    pub connection_point_id: Option<String>,
    /// National Meter Identifier.
    pub meter_id: Option<String>,
}

impl XmlResource for ConnectionPoint {
    const ELEMENT: &'static str = "ConnectionPoint";

    fn field_policy(_mode: Mode) -> FieldPolicy {
        FieldPolicy::Include(&["connection_point_id", "meter_id"])
    }

    fn fields(&self, _mode: Mode) -> Vec<Field> {
        vec![
            Field::value(
                "connection_point_id",
                "connectionPointID",
                self.connection_point_id.as_ref(),
            ),
            Field::value("meter_id", "meterID", self.meter_id.as_ref()),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            connection_point_id: reader.optional("connection_point_id", "connectionPointID")?,
            meter_id: reader.optional("meter_id", "meterID")?,
        })
    }
}
