// crates/sep2-client/src/types.rs

use crate::error::Sep2Error;
use crate::identity;
use crate::resource::WireValue;
use alloc::string::{String, ToString};
use bitflags::bitflags;
use core::convert::TryFrom;
use core::fmt;
use core::str::FromStr;
use num::BigUint;

// --- Identifiers ---

/// Long-form device identifier: a hex string of up to 160 bits.
///
/// The text as given is kept for the wire (`0x` prefix and leading zeros
/// included); equality compares the numeric value.
#[derive(Debug, Clone)]
pub struct Lfdi {
    text: String,
    value: BigUint,
}

impl Lfdi {
    /// Parses a hex LFDI with an optional `0x` prefix.
    pub fn new(text: impl Into<String>) -> Result<Self, Sep2Error> {
        let text = text.into();
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let value = if digits.is_empty() {
            None
        } else {
            BigUint::parse_bytes(digits.as_bytes(), 16)
        };
        match value {
            Some(value) => Ok(Self {
                text: trimmed.to_string(),
                value,
            }),
            None => Err(Sep2Error::InvalidValue {
                field: "lFDI",
                value: text,
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Number of significant bits.
    pub fn bits(&self) -> u64 {
        self.value.bits()
    }

    /// Decimal rendering, as used by the local X-Token authentication.
    pub fn to_decimal_string(&self) -> String {
        self.value.to_string()
    }

    /// Derives the short-form identifier.
    pub fn sfdi(&self) -> Result<Sfdi, Sep2Error> {
        identity::sfdi_from_lfdi(self)
    }
}

impl PartialEq for Lfdi {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Lfdi {}

impl fmt::Display for Lfdi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Lfdi {
    type Err = Sep2Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lfdi::new(s)
    }
}

impl WireValue for Lfdi {
    fn to_wire(&self) -> String {
        self.text.clone()
    }

    fn from_wire(field: &'static str, text: &str) -> Result<Self, Sep2Error> {
        Lfdi::new(text).map_err(|_| Sep2Error::InvalidValue {
            field,
            value: text.to_string(),
        })
    }
}

/// Short-form device identifier: the truncated LFDI followed by its checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sfdi(pub u64);

impl fmt::Display for Sfdi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl WireValue for Sfdi {
    fn to_wire(&self) -> String {
        self.0.to_string()
    }

    fn from_wire(field: &'static str, text: &str) -> Result<Self, Sep2Error> {
        u64::from_wire(field, text).map(Sfdi)
    }
}

/// Power-of-ten exponent, restricted to nano (-9) through giga (9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PowerOfTenMultiplier(i8);

impl PowerOfTenMultiplier {
    pub const MIN: i8 = -9;
    pub const MAX: i8 = 9;

    pub fn new(exponent: i8) -> Result<Self, Sep2Error> {
        Self::try_from(i64::from(exponent))
    }

    pub fn exponent(self) -> i8 {
        self.0
    }

    /// Scales `mantissa` by this power of ten.
    pub fn apply(self, mantissa: i64) -> f64 {
        let mut scaled = mantissa as f64;
        for _ in 0..self.0.unsigned_abs() {
            if self.0 > 0 {
                scaled *= 10.0;
            } else {
                scaled /= 10.0;
            }
        }
        scaled
    }
}

impl TryFrom<i64> for PowerOfTenMultiplier {
    type Error = Sep2Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as i8))
        } else {
            Err(Sep2Error::InvalidValue {
                field: "multiplier",
                value: value.to_string(),
            })
        }
    }
}

impl WireValue for PowerOfTenMultiplier {
    fn to_wire(&self) -> String {
        self.0.to_string()
    }

    fn from_wire(field: &'static str, text: &str) -> Result<Self, Sep2Error> {
        let value = i64::from_wire(field, text)?;
        Self::try_from(value).map_err(|_| Sep2Error::InvalidValue {
            field,
            value: text.to_string(),
        })
    }
}

// --- Enumerations ---

/// Declares a wire enumeration: a `repr` enum serialized as its integer.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $repr:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr($repr)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $name {
            /// The integer carried on the wire.
            pub const fn value(self) -> $repr {
                self as $repr
            }
        }

        impl TryFrom<$repr> for $name {
            type Error = Sep2Error;

            fn try_from(value: $repr) -> Result<Self, Self::Error> {
                $(
                    if value == $name::$variant as $repr {
                        return Ok($name::$variant);
                    }
                )+
                Err(Sep2Error::InvalidValue {
                    field: stringify!($name),
                    value: value.to_string(),
                })
            }
        }

        impl WireValue for $name {
            fn to_wire(&self) -> String {
                self.value().to_string()
            }

            fn from_wire(field: &'static str, text: &str) -> Result<Self, Sep2Error> {
                text.trim()
                    .parse::<$repr>()
                    .ok()
                    .and_then(|value| $name::try_from(value).ok())
                    .ok_or_else(|| Sep2Error::InvalidValue {
                        field,
                        value: text.to_string(),
                    })
            }
        }
    };
}

wire_enum! {
    /// Kind of device behind an EndDevice (2030.5 DeviceCategoryType).
    pub enum DeviceCategory: u32 {
        ElectricVehicle = 65536,
        Evse = 131072,
        VirtualOrMixedDer = 262144,
        ReciprocatingEngine = 524288,
        FuelCell = 1048576,
        PhotovoltaicSystem = 2097152,
        CombinedHeatAndPower = 4194304,
        CombinedPvAndStorage = 8388608,
        OtherGenerationSystem = 16777216,
        OtherStorageSystem = 33554432,
    }
}

wire_enum! {
    /// DER type reported in a DERCapability.
    pub enum DerType: u8 {
        NotApplicable = 0,
        VirtualOrMixedDer = 1,
        ReciprocatingEngine = 2,
        FuelCell = 3,
        PhotovoltaicSystem = 4,
        CombinedHeatAndPower = 5,
        OtherGeneration = 6,
        OtherStorage = 80,
        ElectricVehicle = 81,
        Evse = 82,
        CombinedPvAndStorage = 83,
    }
}

wire_enum! {
    pub enum PowerSource: u8 {
        None = 0,
        Mains = 1,
        Battery = 2,
        LocalGeneration = 3,
        Emergency = 4,
        Unknown = 5,
    }
}

wire_enum! {
    /// Service category of a usage point.
    pub enum ServiceKind: u8 {
        Electricity = 0,
        Gas = 1,
        Water = 2,
        Time = 3,
        Pressure = 4,
        Heat = 5,
        Cooling = 6,
    }
}

wire_enum! {
    /// Unit of measure.
    pub enum UomType: u8 {
        NotApplicable = 0,
        Amperes = 5,
        Kelvin = 6,
        DegreesCelsius = 23,
        Voltage = 29,
        Joule = 31,
        Hertz = 33,
        Watts = 38,
        CubicMeters = 42,
        VoltAmperes = 61,
        VoltAmperesReactive = 63,
        CosTheta = 65,
        VoltsSquared = 67,
        AmperesSquared = 69,
        VoltAmpereHours = 71,
        WattHours = 72,
        VoltAmpereReactiveHours = 73,
        AmpereHours = 106,
        CubicFeet = 119,
        CubicFeetPerHour = 122,
        CubicMetersPerHour = 125,
        UsGallons = 128,
        UsGallonsPerHour = 129,
        ImperialGallons = 130,
        ImperialGallonsPerHour = 131,
        BritishThermalUnits = 132,
        BritishThermalUnitsPerHour = 133,
        Liter = 134,
        LitersPerHour = 137,
        PascalGauge = 140,
        PascalAbsolute = 155,
        Therm = 169,
    }
}

wire_enum! {
    /// Phases a reading applies to.
    pub enum PhaseCode: u8 {
        NotApplicable = 0,
        PhaseC = 32,
        PhaseCN = 33,
        PhaseCA = 40,
        PhaseB = 64,
        PhaseBN = 65,
        PhaseBC = 66,
        PhaseA = 128,
        PhaseAN = 129,
        PhaseAB = 132,
        PhaseABC = 224,
    }
}

wire_enum! {
    pub enum KindType: u8 {
        NotApplicable = 0,
        Currency = 3,
        Demand = 4,
        Energy = 12,
        Power = 37,
    }
}

wire_enum! {
    pub enum CommodityType: u8 {
        NotApplicable = 0,
        ElectricitySecondaryMetered = 1,
        ElectricityPrimaryMetered = 2,
        Air = 4,
        NaturalGas = 7,
        Propane = 8,
        PotableWater = 9,
        Steam = 10,
        WasteWater = 11,
        HeatingFluid = 12,
        CoolingFluid = 13,
    }
}

wire_enum! {
    pub enum FlowDirection: u8 {
        NotApplicable = 0,
        /// Delivered to the customer.
        Forward = 1,
        /// Received from the customer.
        Reverse = 19,
    }
}

wire_enum! {
    pub enum AccumulationBehaviour: u8 {
        NotApplicable = 0,
        Cumulative = 3,
        DeltaData = 4,
        Indicating = 6,
        Summation = 9,
        Instantaneous = 12,
    }
}

wire_enum! {
    pub enum DataQualifier: u8 {
        NotApplicable = 0,
        Average = 2,
        Maximum = 8,
        Minimum = 9,
        Normal = 12,
        StandardDeviationOfPopulation = 29,
        StandardDeviationOfSample = 30,
    }
}

wire_enum! {
    /// Whether a resource supports subscriptions.
    pub enum Subscribable: u8 {
        None = 0,
        NonConditional = 1,
        Conditional = 2,
        Both = 3,
    }
}

// --- Bitmaps ---

bitflags! {
    /// Role of a mirror usage point.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RoleFlags: u16 {
        const IS_MIRROR = 1 << 0;
        const IS_PREMISES_AGGREGATION_POINT = 1 << 1;
        const IS_PEV = 1 << 2;
        const IS_DER = 1 << 3;
        const IS_REVENUE_QUALITY = 1 << 4;
        const IS_DC = 1 << 5;
        const IS_SUBMETER = 1 << 6;
    }
}

bitflags! {
    /// Function sets a device implements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionsImplemented: u32 {
        const DEVICE_CAPABILITY = 1 << 0;
        const SELF_DEVICE = 1 << 1;
        const END_DEVICE = 1 << 2;
        const FUNCTION_SET_ASSIGNMENTS = 1 << 3;
        const SUBSCRIPTION_NOTIFICATION = 1 << 4;
        const RESPONSE = 1 << 5;
        const TIME = 1 << 6;
        const DEVICE_INFORMATION = 1 << 7;
        const POWER_STATUS = 1 << 8;
        const NETWORK_STATUS = 1 << 9;
        const LOG_EVENT = 1 << 10;
        const CONFIGURATION = 1 << 11;
        const SOFTWARE_DOWNLOAD = 1 << 12;
        const DRLC = 1 << 13;
        const METERING = 1 << 14;
        const PRICING = 1 << 15;
        const MESSAGING = 1 << 16;
        const BILLING = 1 << 17;
        const PREPAYMENT = 1 << 18;
        const FLOW_RESERVATION = 1 << 19;
        const DER_CONTROL = 1 << 20;
    }
}

bitflags! {
    /// Quality of a reading value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct QualityFlags: u16 {
        const VALID = 1 << 0;
        const MANUALLY_EDITED = 1 << 1;
        const ESTIMATED_USING_REFERENCE_DAY = 1 << 2;
        const ESTIMATED_USING_LINEAR_INTERPOLATION = 1 << 3;
        const QUESTIONABLE = 1 << 4;
        const DERIVED = 1 << 5;
        const PROJECTED = 1 << 6;
    }
}

/// Flag sets travel as their integer bit pattern; unknown bits are rejected.
macro_rules! wire_flags {
    ($($name:ident: $repr:ty),+) => {
        $(
            impl WireValue for $name {
                fn to_wire(&self) -> String {
                    self.bits().to_string()
                }

                fn from_wire(field: &'static str, text: &str) -> Result<Self, Sep2Error> {
                    text.trim()
                        .parse::<$repr>()
                        .ok()
                        .and_then($name::from_bits)
                        .ok_or_else(|| Sep2Error::InvalidValue {
                            field,
                            value: text.to_string(),
                        })
                }
            }
        )+
    };
}

wire_flags!(RoleFlags: u16, FunctionsImplemented: u32, QualityFlags: u16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfdi_parsing_and_equality() {
        let a = Lfdi::new("0x222099d639e").unwrap();
        let b = Lfdi::new("222099D639E").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0x222099d639e");
        assert_eq!(a.bits(), 42);

        assert!(Lfdi::new("0x").is_err());
        assert!(Lfdi::new("not-hex").is_err());
    }

    #[test]
    fn test_lfdi_decimal_rendering() {
        let lfdi = Lfdi::new("0xff").unwrap();
        assert_eq!(lfdi.to_decimal_string(), "255");
    }

    #[test]
    fn test_power_of_ten_range() {
        assert!(PowerOfTenMultiplier::new(9).is_ok());
        assert!(PowerOfTenMultiplier::new(-9).is_ok());
        assert!(PowerOfTenMultiplier::new(10).is_err());
        assert!(PowerOfTenMultiplier::from_wire("multiplier", "-10").is_err());
        assert_eq!(PowerOfTenMultiplier::new(3).unwrap().apply(5), 5000.0);
        assert_eq!(PowerOfTenMultiplier::new(-1).unwrap().apply(25), 2.5);
    }

    #[test]
    fn test_enums_travel_as_integers() {
        assert_eq!(DeviceCategory::VirtualOrMixedDer.to_wire(), "262144");
        assert_eq!(
            DerType::from_wire("type", "83").unwrap(),
            DerType::CombinedPvAndStorage
        );
        assert!(DerType::from_wire("type", "7").is_err());
        assert_eq!(UomType::try_from(38).unwrap(), UomType::Watts);
        assert_eq!(PhaseCode::PhaseABC.value(), 224);
    }

    #[test]
    fn test_flags_travel_as_bit_patterns() {
        let roles = RoleFlags::IS_MIRROR | RoleFlags::IS_DER;
        assert_eq!(roles.to_wire(), "9");
        assert_eq!(RoleFlags::from_wire("roleFlags", "9").unwrap(), roles);
        assert!(RoleFlags::from_wire("roleFlags", "128").is_err());
        assert_eq!(FunctionsImplemented::DER_CONTROL.bits(), 1 << 20);
    }
}
