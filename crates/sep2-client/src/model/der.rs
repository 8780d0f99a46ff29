// crates/sep2-client/src/model/der.rs

use super::common::{Link, ValueWithMultiplier};
use crate::error::Sep2Error;
use crate::resource::{Field, FieldPolicy, FieldReader, Mode, XmlResource};
use crate::types::DerType;
use crate::xml::XmlMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// Container for the resources of one distributed energy resource.
///
/// Created empty with a POST; the capability is then PUT against the id the
/// server assigned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Der {
    pub href: Option<String>,
    pub der_capability_link: Option<Link>,
    pub der_capability: Option<DerCapability>,
}

impl Der {
    pub fn new(capability: DerCapability) -> Self {
        Self {
            der_capability: Some(capability),
            ..Self::default()
        }
    }
}

impl XmlResource for Der {
    const ELEMENT: &'static str = "DER";

    fn field_policy(mode: Mode) -> FieldPolicy {
        match mode {
            Mode::Create => FieldPolicy::Include(&[]),
            Mode::Link | Mode::Show => FieldPolicy::ExcludeUnset,
        }
    }

    fn fields(&self, mode: Mode) -> Vec<Field> {
        vec![
            Field::value("href", "@href", self.href.as_ref()),
            Field::nested(
                "der_capability_link",
                "DERCapabilityLink",
                self.der_capability_link.as_ref(),
                mode,
            ),
            Field::nested(
                "der_capability",
                "DERCapability",
                self.der_capability.as_ref(),
                mode,
            ),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            href: reader.optional("href", "@href")?,
            der_capability_link: reader.nested("der_capability_link", "DERCapabilityLink")?,
            der_capability: reader.nested("der_capability", "DERCapability")?,
        })
    }
}

/// Nameplate ratings of a DER.
#[derive(Debug, Clone, PartialEq)]
pub struct DerCapability {
    pub modes_supported: Option<u32>,
    pub rtg_max_a: Option<ValueWithMultiplier>,
    pub rtg_max_ah: Option<ValueWithMultiplier>,
    pub rtg_max_charge_rate_va: Option<ValueWithMultiplier>,
    pub rtg_max_charge_rate_w: Option<ValueWithMultiplier>,
    pub rtg_max_discharge_rate_va: Option<ValueWithMultiplier>,
    pub rtg_max_discharge_rate_w: Option<ValueWithMultiplier>,
    pub rtg_max_var: Option<ValueWithMultiplier>,
    pub rtg_max_w: Option<ValueWithMultiplier>,
    pub rtg_max_wh: Option<ValueWithMultiplier>,
    pub der_type: DerType,
}

impl DerCapability {
    pub fn new(der_type: DerType) -> Self {
        Self {
            modes_supported: None,
            rtg_max_a: None,
            rtg_max_ah: None,
            rtg_max_charge_rate_va: None,
            rtg_max_charge_rate_w: None,
            rtg_max_discharge_rate_va: None,
            rtg_max_discharge_rate_w: None,
            rtg_max_var: None,
            rtg_max_w: None,
            rtg_max_wh: None,
            der_type,
        }
    }

    /// Bitmap of supported control modes. Defaults to 1.
    pub fn modes_supported(&self) -> u32 {
        self.modes_supported.unwrap_or(1)
    }
}

impl XmlResource for DerCapability {
    const ELEMENT: &'static str = "DERCapability";

    fn field_policy(_mode: Mode) -> FieldPolicy {
        FieldPolicy::ExcludeUnset
    }

    fn fields(&self, mode: Mode) -> Vec<Field> {
        let rating = |name, alias, value: &Option<ValueWithMultiplier>| {
            Field::nested(name, alias, value.as_ref(), mode)
        };
        vec![
            Field::with_default("modes_supported", "modesSupported", self.modes_supported.as_ref(), 1u32),
            rating("rtg_max_a", "rtgMaxA", &self.rtg_max_a),
            rating("rtg_max_ah", "rtgMaxAh", &self.rtg_max_ah),
            rating("rtg_max_charge_rate_va", "rtgMaxChargeRateVA", &self.rtg_max_charge_rate_va),
            rating("rtg_max_charge_rate_w", "rtgMaxChargeRateW", &self.rtg_max_charge_rate_w),
            rating(
                "rtg_max_discharge_rate_va",
                "rtgMaxDischargeRateVA",
                &self.rtg_max_discharge_rate_va,
            ),
            rating(
                "rtg_max_discharge_rate_w",
                "rtgMaxDischargeRateW",
                &self.rtg_max_discharge_rate_w,
            ),
            rating("rtg_max_var", "rtgMaxVar", &self.rtg_max_var),
            rating("rtg_max_w", "rtgMaxW", &self.rtg_max_w),
            rating("rtg_max_wh", "rtgMaxWh", &self.rtg_max_wh),
            Field::value("der_type", "type", Some(&self.der_type)),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            modes_supported: reader.optional("modes_supported", "modesSupported")?,
            rtg_max_a: reader.nested("rtg_max_a", "rtgMaxA")?,
            rtg_max_ah: reader.nested("rtg_max_ah", "rtgMaxAh")?,
            rtg_max_charge_rate_va: reader.nested("rtg_max_charge_rate_va", "rtgMaxChargeRateVA")?,
            rtg_max_charge_rate_w: reader.nested("rtg_max_charge_rate_w", "rtgMaxChargeRateW")?,
            rtg_max_discharge_rate_va: reader
                .nested("rtg_max_discharge_rate_va", "rtgMaxDischargeRateVA")?,
            rtg_max_discharge_rate_w: reader
                .nested("rtg_max_discharge_rate_w", "rtgMaxDischargeRateW")?,
            rtg_max_var: reader.nested("rtg_max_var", "rtgMaxVar")?,
            rtg_max_w: reader.nested("rtg_max_w", "rtgMaxW")?,
            rtg_max_wh: reader.nested("rtg_max_wh", "rtgMaxWh")?,
            der_type: reader.required("der_type", "type")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{decode_document, encode_document};
    use crate::types::PowerOfTenMultiplier;

    fn capability() -> DerCapability {
        DerCapability {
            rtg_max_w: Some(ValueWithMultiplier::new(5000)),
            rtg_max_wh: Some(ValueWithMultiplier::with_multiplier(
                13,
                PowerOfTenMultiplier::new(3).unwrap(),
            )),
            ..DerCapability::new(DerType::CombinedPvAndStorage)
        }
    }

    #[test]
    fn test_der_create_body_is_empty() {
        let der = Der::new(capability());
        assert_eq!(encode_document(&der, Mode::Create).unwrap(), "<DER></DER>");
    }

    #[test]
    fn test_capability_omits_unset_ratings() {
        let xml = encode_document(&capability(), Mode::Create).unwrap();
        assert_eq!(
            xml,
            "<DERCapability>\
             <rtgMaxW><multiplier>0</multiplier><value>5000</value></rtgMaxW>\
             <rtgMaxWh><multiplier>3</multiplier><value>13</value></rtgMaxWh>\
             <type>83</type></DERCapability>"
        );
    }

    #[test]
    fn test_capability_round_trip() {
        let mut cap = capability();
        cap.modes_supported = Some(3);
        for mode in [Mode::Create, Mode::Link, Mode::Show] {
            let xml = encode_document(&cap, mode).unwrap();
            assert_eq!(decode_document::<DerCapability>(&xml).unwrap(), cap, "{} mode", mode);
        }

        let unset = capability();
        let xml = encode_document(&unset, Mode::Show).unwrap();
        assert!(!xml.contains("modesSupported"));
        assert_eq!(decode_document::<DerCapability>(&xml).unwrap(), unset);
    }

    #[test]
    fn test_capability_requires_type() {
        let err = decode_document::<DerCapability>("<DERCapability><modesSupported>1</modesSupported></DERCapability>")
            .unwrap_err();
        assert!(matches!(err, Sep2Error::MissingElement { element: "type" }));
    }

    #[test]
    fn test_der_show_mode_nests_capability() {
        let der = Der {
            href: Some("/edev/3/der/5".into()),
            ..Der::new(capability())
        };
        let xml = encode_document(&der, Mode::Show).unwrap();
        assert!(xml.starts_with(r#"<DER href="/edev/3/der/5"><DERCapability>"#));
        let decoded: Der = decode_document(&xml).unwrap();
        assert_eq!(decoded.der_capability.map(|c| c.der_type), Some(DerType::CombinedPvAndStorage));
        assert_eq!(Der::default().der_capability, None);
    }
}
