// crates/sep2-client/src/model/metering.rs

//! Metering mirror resources: a usage point mirrored by the client and the
//! readings posted under it.

use super::common::{DateTimeInterval, UnitValue};
use crate::error::Sep2Error;
use crate::list::ListItem;
use crate::resource::{Field, FieldPolicy, FieldReader, Mode, XmlResource};
use crate::types::{
    AccumulationBehaviour, CommodityType, DataQualifier, FlowDirection, KindType, Lfdi,
    PhaseCode, PowerOfTenMultiplier, QualityFlags, RoleFlags, ServiceKind, Subscribable, UomType,
};
use crate::xml::XmlMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

#[derive(Debug, Clone, PartialEq)]
pub struct MirrorUsagePoint {
    pub href: Option<String>,
    pub mrid: String,
    pub description: Option<String>,
    pub version: Option<u16>,
    pub role_flags: RoleFlags,
    pub service_category_kind: ServiceKind,
    pub status: u8,
    pub device_lfdi: Lfdi,
}

impl MirrorUsagePoint {
    pub fn new(
        mrid: impl Into<String>,
        role_flags: RoleFlags,
        service_category_kind: ServiceKind,
        device_lfdi: Lfdi,
    ) -> Self {
        Self {
            href: None,
            mrid: mrid.into(),
            description: None,
            version: None,
            role_flags,
            service_category_kind,
            status: 0,
            device_lfdi,
        }
    }
}

impl XmlResource for MirrorUsagePoint {
    const ELEMENT: &'static str = "MirrorUsagePoint";

    fn field_policy(_mode: Mode) -> FieldPolicy {
        FieldPolicy::ExcludeUnset
    }

    fn fields(&self, _mode: Mode) -> Vec<Field> {
        vec![
            Field::value("href", "@href", self.href.as_ref()),
            Field::value("mrid", "mRID", Some(&self.mrid)),
            Field::value("description", "description", self.description.as_ref()),
            Field::value("version", "version", self.version.as_ref()),
            Field::value("role_flags", "roleFlags", Some(&self.role_flags)),
            Field::value(
                "service_category_kind",
                "serviceCategoryKind",
                Some(&self.service_category_kind),
            ),
            Field::value("status", "status", Some(&self.status)),
            Field::value("device_lfdi", "deviceLFDI", Some(&self.device_lfdi)),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            href: reader.optional("href", "@href")?,
            mrid: reader.required("mrid", "mRID")?,
            description: reader.optional("description", "description")?,
            version: reader.optional("version", "version")?,
            role_flags: reader.required("role_flags", "roleFlags")?,
            service_category_kind: reader.required("service_category_kind", "serviceCategoryKind")?,
            status: reader.required("status", "status")?,
            device_lfdi: reader.required("device_lfdi", "deviceLFDI")?,
        })
    }
}

impl ListItem for MirrorUsagePoint {
    const LIST_ELEMENT: &'static str = "MirrorUsagePointList";
    const LIST_FIELD: &'static str = "mirror_usage_point";
}

/// A stream of readings of one reading type, posted under a usage point.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorMeterReading {
    pub mrid: String,
    pub description: Option<String>,
    pub version: Option<u16>,
    pub last_update_time: Option<i64>,
    pub mirror_reading_set: Vec<MirrorReadingSet>,
    pub next_update_time: Option<i64>,
    pub reading: Option<Reading>,
    pub reading_type: Option<ReadingType>,
}

impl MirrorMeterReading {
    pub fn new(mrid: impl Into<String>) -> Self {
        Self {
            mrid: mrid.into(),
            description: None,
            version: None,
            last_update_time: None,
            mirror_reading_set: Vec::new(),
            next_update_time: None,
            reading: None,
            reading_type: None,
        }
    }
}

impl XmlResource for MirrorMeterReading {
    const ELEMENT: &'static str = "MirrorMeterReading";

    fn field_policy(_mode: Mode) -> FieldPolicy {
        FieldPolicy::ExcludeUnset
    }

    fn fields(&self, mode: Mode) -> Vec<Field> {
        vec![
            Field::value("mrid", "mRID", Some(&self.mrid)),
            Field::value("description", "description", self.description.as_ref()),
            Field::value("version", "version", self.version.as_ref()),
            Field::value("last_update_time", "lastUpdateTime", self.last_update_time.as_ref()),
            Field::nested_list(
                "mirror_reading_set",
                "MirrorReadingSet",
                &self.mirror_reading_set,
                mode,
            ),
            Field::value("next_update_time", "nextUpdateTime", self.next_update_time.as_ref()),
            Field::nested("reading", "Reading", self.reading.as_ref(), mode),
            Field::nested("reading_type", "ReadingType", self.reading_type.as_ref(), mode),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            mrid: reader.required("mrid", "mRID")?,
            description: reader.optional("description", "description")?,
            version: reader.optional("version", "version")?,
            last_update_time: reader.optional("last_update_time", "lastUpdateTime")?,
            mirror_reading_set: reader.list("mirror_reading_set", "MirrorReadingSet")?,
            next_update_time: reader.optional("next_update_time", "nextUpdateTime")?,
            reading: reader.nested("reading", "Reading")?,
            reading_type: reader.nested("reading_type", "ReadingType")?,
        })
    }
}

/// Readings over one time period.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorReadingSet {
    pub mrid: String,
    pub description: Option<String>,
    pub version: Option<u16>,
    pub time_period: DateTimeInterval,
    pub readings: Vec<Reading>,
}

impl MirrorReadingSet {
    pub fn new(mrid: impl Into<String>, time_period: DateTimeInterval) -> Self {
        Self {
            mrid: mrid.into(),
            description: None,
            version: None,
            time_period,
            readings: Vec::new(),
        }
    }
}

impl XmlResource for MirrorReadingSet {
    const ELEMENT: &'static str = "MirrorReadingSet";

    fn field_policy(_mode: Mode) -> FieldPolicy {
        FieldPolicy::ExcludeUnset
    }

    fn fields(&self, mode: Mode) -> Vec<Field> {
        vec![
            Field::value("mrid", "mRID", Some(&self.mrid)),
            Field::value("description", "description", self.description.as_ref()),
            Field::value("version", "version", self.version.as_ref()),
            Field::nested("time_period", "timePeriod", Some(&self.time_period), mode),
            Field::nested_list("readings", "Reading", &self.readings, mode),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            mrid: reader.required("mrid", "mRID")?,
            description: reader.optional("description", "description")?,
            version: reader.optional("version", "version")?,
            time_period: reader.required_nested("time_period", "timePeriod")?,
            readings: reader.list("readings", "Reading")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reading {
    pub subscribable: Option<Subscribable>,
    pub consumption_block: Option<u8>,
    pub quality_flags: Option<QualityFlags>,
    pub time_period: Option<DateTimeInterval>,
    pub tou_tier: Option<u8>,
    pub value: Option<i64>,
    pub local_id: Option<u16>,
}

impl Reading {
    pub fn new(value: i64) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }
}

impl XmlResource for Reading {
    const ELEMENT: &'static str = "Reading";

    fn field_policy(_mode: Mode) -> FieldPolicy {
        FieldPolicy::ExcludeUnset
    }

    fn fields(&self, mode: Mode) -> Vec<Field> {
        vec![
            Field::value("subscribable", "@subscribable", self.subscribable.as_ref()),
            Field::value("consumption_block", "consumptionBlock", self.consumption_block.as_ref()),
            Field::value("quality_flags", "qualityFlags", self.quality_flags.as_ref()),
            Field::nested("time_period", "timePeriod", self.time_period.as_ref(), mode),
            Field::value("tou_tier", "touTier", self.tou_tier.as_ref()),
            Field::value("value", "value", self.value.as_ref()),
            Field::value("local_id", "localID", self.local_id.as_ref()),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            subscribable: reader.optional("subscribable", "@subscribable")?,
            consumption_block: reader.optional("consumption_block", "consumptionBlock")?,
            quality_flags: reader.optional("quality_flags", "qualityFlags")?,
            time_period: reader.nested("time_period", "timePeriod")?,
            tou_tier: reader.optional("tou_tier", "touTier")?,
            value: reader.optional("value", "value")?,
            local_id: reader.optional("local_id", "localID")?,
        })
    }
}

/// How the values of a meter reading are to be interpreted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadingType {
    pub accumulation_behaviour: Option<AccumulationBehaviour>,
    pub calorific_value: Option<UnitValue>,
    pub commodity: Option<CommodityType>,
    pub conversion_factor: Option<UnitValue>,
    pub data_qualifier: Option<DataQualifier>,
    pub flow_direction: Option<FlowDirection>,
    pub interval_length: Option<u32>,
    pub kind: Option<KindType>,
    pub max_number_of_intervals: Option<u8>,
    pub number_of_consumption_blocks: Option<u8>,
    pub number_of_tou_tiers: Option<u8>,
    pub phase: Option<PhaseCode>,
    pub power_of_ten_multiplier: Option<PowerOfTenMultiplier>,
    pub sub_interval_length: Option<u32>,
    pub supply_limit: Option<u64>,
    pub tiered_consumption_blocks: Option<bool>,
    pub uom: Option<UomType>,
}

impl XmlResource for ReadingType {
    const ELEMENT: &'static str = "ReadingType";

    fn field_policy(_mode: Mode) -> FieldPolicy {
        FieldPolicy::ExcludeUnset
    }

    fn fields(&self, mode: Mode) -> Vec<Field> {
        vec![
            Field::value(
                "accumulation_behaviour",
                "accumulationBehaviour",
                self.accumulation_behaviour.as_ref(),
            ),
            Field::nested("calorific_value", "calorificValue", self.calorific_value.as_ref(), mode),
            Field::value("commodity", "commodity", self.commodity.as_ref()),
            Field::nested(
                "conversion_factor",
                "conversionFactor",
                self.conversion_factor.as_ref(),
                mode,
            ),
            Field::value("data_qualifier", "dataQualifier", self.data_qualifier.as_ref()),
            Field::value("flow_direction", "flowDirection", self.flow_direction.as_ref()),
            Field::value("interval_length", "intervalLength", self.interval_length.as_ref()),
            Field::value("kind", "kind", self.kind.as_ref()),
            Field::value(
                "max_number_of_intervals",
                "maxNumberOfIntervals",
                self.max_number_of_intervals.as_ref(),
            ),
            Field::value(
                "number_of_consumption_blocks",
                "numberOfConsumptionBlocks",
                self.number_of_consumption_blocks.as_ref(),
            ),
            Field::value("number_of_tou_tiers", "numberOfTouTiers", self.number_of_tou_tiers.as_ref()),
            Field::value("phase", "phase", self.phase.as_ref()),
            Field::value(
                "power_of_ten_multiplier",
                "powerOfTenMultiplier",
                self.power_of_ten_multiplier.as_ref(),
            ),
            Field::value("sub_interval_length", "subIntervalLength", self.sub_interval_length.as_ref()),
            Field::value("supply_limit", "supplyLimit", self.supply_limit.as_ref()),
            Field::value(
                "tiered_consumption_blocks",
                "tieredConsumptionBlocks",
                self.tiered_consumption_blocks.as_ref(),
            ),
            Field::value("uom", "uom", self.uom.as_ref()),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            accumulation_behaviour: reader.optional("accumulation_behaviour", "accumulationBehaviour")?,
            calorific_value: reader.nested("calorific_value", "calorificValue")?,
            commodity: reader.optional("commodity", "commodity")?,
            conversion_factor: reader.nested("conversion_factor", "conversionFactor")?,
            data_qualifier: reader.optional("data_qualifier", "dataQualifier")?,
            flow_direction: reader.optional("flow_direction", "flowDirection")?,
            interval_length: reader.optional("interval_length", "intervalLength")?,
            kind: reader.optional("kind", "kind")?,
            max_number_of_intervals: reader
                .optional("max_number_of_intervals", "maxNumberOfIntervals")?,
            number_of_consumption_blocks: reader
                .optional("number_of_consumption_blocks", "numberOfConsumptionBlocks")?,
            number_of_tou_tiers: reader.optional("number_of_tou_tiers", "numberOfTouTiers")?,
            phase: reader.optional("phase", "phase")?,
            power_of_ten_multiplier: reader
                .optional("power_of_ten_multiplier", "powerOfTenMultiplier")?,
            sub_interval_length: reader.optional("sub_interval_length", "subIntervalLength")?,
            supply_limit: reader.optional("supply_limit", "supplyLimit")?,
            tiered_consumption_blocks: reader
                .optional("tiered_consumption_blocks", "tieredConsumptionBlocks")?,
            uom: reader.optional("uom", "uom")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{decode_document, encode_document};

    fn lfdi() -> Lfdi {
        Lfdi::new("0x222099d639e").unwrap()
    }

    #[test]
    fn test_mirror_usage_point_body() {
        let mup = MirrorUsagePoint::new(
            "0x100001234",
            RoleFlags::IS_MIRROR | RoleFlags::IS_DER,
            ServiceKind::Electricity,
            lfdi(),
        );
        assert_eq!(
            encode_document(&mup, Mode::Create).unwrap(),
            "<MirrorUsagePoint><mRID>0x100001234</mRID><roleFlags>9</roleFlags>\
             <serviceCategoryKind>0</serviceCategoryKind><status>0</status>\
             <deviceLFDI>0x222099d639e</deviceLFDI></MirrorUsagePoint>"
        );
    }

    #[test]
    fn test_meter_reading_with_sets_round_trips() {
        let mut set = MirrorReadingSet::new("0x200001234", DateTimeInterval::between(1_000, 1_300));
        set.readings.push(Reading::new(2301));
        set.readings.push(Reading {
            quality_flags: Some(QualityFlags::VALID),
            ..Reading::new(2299)
        });

        let mut mmr = MirrorMeterReading::new("0x300001234");
        mmr.reading_type = Some(ReadingType {
            uom: Some(UomType::Voltage),
            phase: Some(PhaseCode::PhaseAN),
            power_of_ten_multiplier: Some(PowerOfTenMultiplier::new(-1).unwrap()),
            ..ReadingType::default()
        });
        mmr.mirror_reading_set.push(set);

        let xml = encode_document(&mmr, Mode::Create).unwrap();
        assert!(xml.contains("<timePeriod><duration>300</duration><start>1000</start></timePeriod>"));
        assert!(xml.contains("<ReadingType><phase>129</phase><powerOfTenMultiplier>-1</powerOfTenMultiplier><uom>29</uom></ReadingType>"));

        let decoded: MirrorMeterReading = decode_document(&xml).unwrap();
        assert_eq!(decoded, mmr);
    }

    #[test]
    fn test_single_reading_decodes_as_one_element_list() {
        let xml = "<MirrorReadingSet><mRID>1</mRID><timePeriod><duration>60</duration><start>0</start></timePeriod>\
                   <Reading><value>5</value></Reading></MirrorReadingSet>";
        let set: MirrorReadingSet = decode_document(xml).unwrap();
        assert_eq!(set.readings, vec![Reading::new(5)]);
    }

    #[test]
    fn test_reading_subscribable_is_an_attribute() {
        let reading = Reading {
            subscribable: Some(Subscribable::Both),
            ..Reading::new(1)
        };
        assert_eq!(
            encode_document(&reading, Mode::Create).unwrap(),
            r#"<Reading subscribable="3"><value>1</value></Reading>"#
        );
    }
}
