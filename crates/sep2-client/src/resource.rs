// crates/sep2-client/src/resource.rs

//! Mode-driven mapping between typed resources and the XML tree.
//!
//! Every resource declares its fields once, in wire order, through
//! [`XmlResource::fields`]. The per-mode [`FieldPolicy`] then decides which
//! of them reach the wire, and whether declared defaults are materialized.

use crate::error::Sep2Error;
use crate::xml::{XmlMap, XmlValue, parse_document, write_document};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

/// Serialization context. Each resource type decides what a mode emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Body of a POST or PUT from the client.
    #[default]
    Create,
    /// Reference form, as it appears inside another resource or a list.
    Link,
    /// Full server-side representation.
    Show,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Create => "create",
            Mode::Link => "link",
            Mode::Show => "show",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Sep2Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Mode::Create),
            "link" => Ok(Mode::Link),
            "show" => Ok(Mode::Show),
            other => Err(Sep2Error::InvalidValue {
                field: "mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Which fields a mode emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Only the named fields; a named field is emitted when it has a value or a default.
    Include(&'static [&'static str]),
    /// Every explicitly set field. Defaults are not materialized.
    ExcludeUnset,
    /// Every field with a value or a default.
    All,
}

/// One declared field of a resource, already rendered to the XML tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub alias: &'static str,
    pub value: Option<XmlValue>,
    pub default: Option<XmlValue>,
}

impl Field {
    /// A scalar field. `None` means unset.
    pub fn value<T: WireValue>(name: &'static str, alias: &'static str, value: Option<&T>) -> Self {
        Self {
            name,
            alias,
            value: value.map(|v| XmlValue::Text(v.to_wire())),
            default: None,
        }
    }

    /// A scalar field whose default is emitted by the `Include` and `All` policies.
    pub fn with_default<T: WireValue>(
        name: &'static str,
        alias: &'static str,
        value: Option<&T>,
        default: T,
    ) -> Self {
        Self {
            default: Some(XmlValue::Text(default.to_wire())),
            ..Self::value(name, alias, value)
        }
    }

    /// A nested resource, encoded in the same mode under its own policy.
    pub fn nested<R: XmlResource>(
        name: &'static str,
        alias: &'static str,
        value: Option<&R>,
        mode: Mode,
    ) -> Self {
        Self {
            name,
            alias,
            value: value.map(|v| XmlValue::Map(encode(v, mode))),
            default: None,
        }
    }

    /// A repeated nested resource. An empty slice counts as unset.
    pub fn nested_list<R: XmlResource>(
        name: &'static str,
        alias: &'static str,
        items: &[R],
        mode: Mode,
    ) -> Self {
        let value = match items {
            [] => None,
            [single] => Some(XmlValue::Map(encode(single, mode))),
            many => Some(XmlValue::List(
                many.iter().map(|item| XmlValue::Map(encode(item, mode))).collect(),
            )),
        };
        Self {
            name,
            alias,
            value,
            default: None,
        }
    }

    fn resolve(self, materialize_default: bool) -> Option<XmlValue> {
        match self.value {
            Some(value) => Some(value),
            None if materialize_default => self.default,
            None => None,
        }
    }
}

/// Conversion of a scalar to and from its wire text.
pub trait WireValue: Sized {
    fn to_wire(&self) -> String;

    /// Parses wire text. `field` names the element for error reporting.
    fn from_wire(field: &'static str, text: &str) -> Result<Self, Sep2Error>;
}

fn invalid(field: &'static str, text: &str) -> Sep2Error {
    Sep2Error::InvalidValue {
        field,
        value: text.to_string(),
    }
}

macro_rules! wire_number {
    ($($ty:ty),+) => {
        $(
            impl WireValue for $ty {
                fn to_wire(&self) -> String {
                    self.to_string()
                }

                fn from_wire(field: &'static str, text: &str) -> Result<Self, Sep2Error> {
                    text.trim().parse::<$ty>().map_err(|_| invalid(field, text))
                }
            }
        )+
    };
}

wire_number!(u8, u16, u32, u64, i8, i16, i32, i64, f64);

impl WireValue for bool {
    fn to_wire(&self) -> String {
        String::from(if *self { "true" } else { "false" })
    }

    fn from_wire(field: &'static str, text: &str) -> Result<Self, Sep2Error> {
        match text.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(invalid(field, text)),
        }
    }
}

impl WireValue for String {
    fn to_wire(&self) -> String {
        self.clone()
    }

    fn from_wire(_field: &'static str, text: &str) -> Result<Self, Sep2Error> {
        Ok(text.to_string())
    }
}

/// A 2030.5 resource that maps to and from one XML element.
pub trait XmlResource: Sized {
    /// Element name of the resource when it is the document root.
    const ELEMENT: &'static str;

    fn field_policy(_mode: Mode) -> FieldPolicy {
        FieldPolicy::All
    }

    /// All declared fields in wire order, with nested resources encoded for `mode`.
    fn fields(&self, mode: Mode) -> Vec<Field>;

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error>;

    /// Encodes under the mode's policy, further restricted by the selections.
    ///
    /// `include` keeps only the fields it names; `exclude` drops the fields it
    /// names as a whole.
    fn encode_with(
        &self,
        mode: Mode,
        include: Option<&Selection>,
        exclude: Option<&Selection>,
    ) -> XmlMap {
        let policy = Self::field_policy(mode);
        let mut map = XmlMap::new();
        for field in self.fields(mode) {
            if include.is_some_and(|sel| !sel.contains(field.name))
                || exclude.is_some_and(|sel| sel.excludes_whole(field.name))
            {
                continue;
            }
            let alias = field.alias;
            let value = match policy {
                FieldPolicy::Include(names) if names.contains(&field.name) => field.resolve(true),
                FieldPolicy::Include(_) => None,
                FieldPolicy::ExcludeUnset => field.resolve(false),
                FieldPolicy::All => field.resolve(true),
            };
            if let Some(value) = value {
                map.insert(alias, value);
            }
        }
        map
    }
}

/// Field names for include/exclude filtering, optionally with a nested
/// selection to forward to the items of a list field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    entries: BTreeMap<String, Option<Selection>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A flat selection of whole fields.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(Self::new(), |sel, name| sel.field(name))
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), None);
        self
    }

    pub fn nested(mut self, name: impl Into<String>, selection: Selection) -> Self {
        self.entries.insert(name.into(), Some(selection));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// True when `name` is selected as a whole rather than through a nested selection.
    pub fn excludes_whole(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(None))
    }

    pub fn nested_for(&self, name: &str) -> Option<&Selection> {
        self.entries.get(name).and_then(Option::as_ref)
    }
}

pub fn encode<R: XmlResource>(resource: &R, mode: Mode) -> XmlMap {
    resource.encode_with(mode, None, None)
}

pub fn encode_filtered<R: XmlResource>(
    resource: &R,
    mode: Mode,
    include: Option<&Selection>,
    exclude: Option<&Selection>,
) -> XmlMap {
    resource.encode_with(mode, include, exclude)
}

/// Encodes `resource` as a standalone document rooted at its element name.
pub fn encode_document<R: XmlResource>(resource: &R, mode: Mode) -> Result<String, Sep2Error> {
    let root = XmlMap::with_root(R::ELEMENT, XmlValue::Map(encode(resource, mode)));
    write_document(&root)
}

/// Parses a document and builds the resource from its root element.
///
/// # Errors
/// `MissingElement` when the root is not `R::ELEMENT`, plus any parsing or
/// field conversion error.
pub fn decode_document<R: XmlResource>(xml: &str) -> Result<R, Sep2Error> {
    let document = parse_document(xml)?;
    let root = document
        .get(R::ELEMENT)
        .ok_or(Sep2Error::MissingElement { element: R::ELEMENT })?;
    decode_value(R::ELEMENT, root)
}

/// Builds a resource from one node of the tree.
pub fn decode_value<R: XmlResource>(field: &'static str, value: &XmlValue) -> Result<R, Sep2Error> {
    match value.as_map() {
        Some(map) => R::from_map(map),
        None => Err(invalid(field, value.text().unwrap_or_default())),
    }
}

/// Typed access to the children of a parsed element.
///
/// Lookups try the wire alias first and fall back to the field name.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    map: &'a XmlMap,
}

impl<'a> FieldReader<'a> {
    pub fn new(map: &'a XmlMap) -> Self {
        Self { map }
    }

    fn lookup(&self, name: &str, alias: &str) -> Option<&'a XmlValue> {
        self.map.get(alias).or_else(|| self.map.get(name))
    }

    pub fn optional<T: WireValue>(
        &self,
        name: &'static str,
        alias: &'static str,
    ) -> Result<Option<T>, Sep2Error> {
        match self.lookup(name, alias).and_then(XmlValue::text) {
            Some(text) => T::from_wire(alias, text).map(Some),
            None => Ok(None),
        }
    }

    /// A field stored with its declared default; absent decodes to `default`.
    pub fn or_default<T: WireValue>(
        &self,
        name: &'static str,
        alias: &'static str,
        default: T,
    ) -> Result<T, Sep2Error> {
        Ok(self.optional(name, alias)?.unwrap_or(default))
    }

    pub fn required<T: WireValue>(&self, name: &'static str, alias: &'static str) -> Result<T, Sep2Error> {
        self.optional(name, alias)?
            .ok_or(Sep2Error::MissingElement { element: alias })
    }

    pub fn nested<R: XmlResource>(
        &self,
        name: &'static str,
        alias: &'static str,
    ) -> Result<Option<R>, Sep2Error> {
        self.lookup(name, alias)
            .map(|value| decode_value(alias, value))
            .transpose()
    }

    pub fn required_nested<R: XmlResource>(
        &self,
        name: &'static str,
        alias: &'static str,
    ) -> Result<R, Sep2Error> {
        self.nested(name, alias)?
            .ok_or(Sep2Error::MissingElement { element: alias })
    }

    /// A repeated child, normalized to a vector. Absent means empty.
    pub fn list<R: XmlResource>(&self, name: &'static str, alias: &'static str) -> Result<Vec<R>, Sep2Error> {
        match self.lookup(name, alias) {
            Some(value) => value
                .one_or_many()
                .into_vec()
                .into_iter()
                .map(|item| decode_value(alias, item))
                .collect(),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A small resource exercising every policy.
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Probe {
        id: Option<String>,
        count: Option<u32>,
        enabled: Option<bool>,
    }

    impl XmlResource for Probe {
        const ELEMENT: &'static str = "Probe";

        fn field_policy(mode: Mode) -> FieldPolicy {
            match mode {
                Mode::Create => FieldPolicy::Include(&["count", "enabled"]),
                Mode::Link => FieldPolicy::ExcludeUnset,
                Mode::Show => FieldPolicy::All,
            }
        }

        fn fields(&self, _mode: Mode) -> Vec<Field> {
            alloc::vec![
                Field::value("id", "@id", self.id.as_ref()),
                Field::with_default("count", "cnt", self.count.as_ref(), 0u32),
                Field::with_default("enabled", "enabled", self.enabled.as_ref(), true),
            ]
        }

        fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
            let reader = FieldReader::new(map);
            Ok(Self {
                id: reader.optional("id", "@id")?,
                count: reader.optional("count", "cnt")?,
                enabled: reader.optional("enabled", "enabled")?,
            })
        }
    }

    fn probe() -> Probe {
        Probe {
            id: Some("a".into()),
            count: None,
            enabled: Some(false),
        }
    }

    #[test]
    fn test_include_policy_materializes_defaults_of_named_fields() {
        let xml = encode_document(&probe(), Mode::Create).unwrap();
        assert_eq!(xml, "<Probe><cnt>0</cnt><enabled>false</enabled></Probe>");
    }

    #[test]
    fn test_exclude_unset_skips_defaults() {
        let xml = encode_document(&probe(), Mode::Link).unwrap();
        assert_eq!(xml, r#"<Probe id="a"><enabled>false</enabled></Probe>"#);
    }

    #[test]
    fn test_all_policy_emits_everything() {
        let xml = encode_document(&probe(), Mode::Show).unwrap();
        assert_eq!(
            xml,
            r#"<Probe id="a"><cnt>0</cnt><enabled>false</enabled></Probe>"#
        );
    }

    #[test]
    fn test_filters_restrict_fields() {
        let include = Selection::fields(["id", "count"]);
        let map = encode_filtered(&probe(), Mode::Show, Some(&include), None);
        assert!(map.contains_key("@id") && map.contains_key("cnt"));
        assert!(!map.contains_key("enabled"));

        let exclude = Selection::fields(["id"]);
        let map = encode_filtered(&probe(), Mode::Show, None, Some(&exclude));
        assert!(!map.contains_key("@id"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_decode_falls_back_to_field_name() {
        let decoded: Probe = decode_document("<Probe><count>7</count></Probe>").unwrap();
        assert_eq!(decoded.count, Some(7));
        assert_eq!(decoded.enabled, None);
    }

    #[test]
    fn test_decode_reports_invalid_values_and_wrong_root() {
        let err = decode_document::<Probe>("<Probe><cnt>many</cnt></Probe>").unwrap_err();
        assert!(matches!(err, Sep2Error::InvalidValue { field: "cnt", .. }));

        let err = decode_document::<Probe>("<Other/>").unwrap_err();
        assert!(matches!(err, Sep2Error::MissingElement { element: "Probe" }));
    }

    #[test]
    fn test_wire_booleans_accept_digits() {
        assert_eq!(bool::from_wire("enabled", "1").unwrap(), true);
        assert_eq!(bool::from_wire("enabled", "false").unwrap(), false);
        assert!(bool::from_wire("enabled", "yes").is_err());
    }

    #[test]
    fn test_mode_parses_from_text() {
        assert_eq!("link".parse::<Mode>().unwrap(), Mode::Link);
        assert!("delete".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::Create);
    }
}
