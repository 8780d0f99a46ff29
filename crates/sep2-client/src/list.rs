// crates/sep2-client/src/list.rs

//! Homogeneous list resources (`EndDeviceList`, `MirrorUsagePointList`).

use crate::error::Sep2Error;
use crate::model::{EndDevice, MirrorUsagePoint};
use crate::resource::{Field, FieldPolicy, FieldReader, Mode, Selection, XmlResource};
use crate::types::Lfdi;
use crate::xml::{XmlMap, XmlValue, parse_document};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// A resource that the server returns inside a list element.
pub trait ListItem: XmlResource {
    /// Element name of the enclosing list, e.g. `EndDeviceList`.
    const LIST_ELEMENT: &'static str;
    /// Field name of the items, as used in include/exclude selections.
    const LIST_FIELD: &'static str;

    /// LFDI of the device the item belongs to, if it carries one.
    fn lfdi(&self) -> Option<&Lfdi> {
        None
    }
}

/// A page of a list resource.
///
/// Items are always a sequence: a page holding a single element decodes to a
/// one-element vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceList<R> {
    pub items: Vec<R>,
    pub all: Option<u32>,
    pub results: Option<u32>,
    pub href: Option<String>,
}

pub type EndDeviceList = ResourceList<EndDevice>;
pub type MirrorUsagePointList = ResourceList<MirrorUsagePoint>;

impl<R> ResourceList<R> {
    pub fn new(items: Vec<R>) -> Self {
        Self {
            items,
            all: None,
            results: None,
            href: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, R> {
        self.items.iter()
    }
}

impl<R: ListItem> ResourceList<R> {
    /// Decodes one page of a paged GET.
    ///
    /// Returns `None` when the list element carries no item child, which is
    /// how the server signals a page past the end.
    pub fn decode_page(xml: &str) -> Result<Option<Self>, Sep2Error> {
        let document = parse_document(xml)?;
        let root = document
            .get(R::LIST_ELEMENT)
            .ok_or(Sep2Error::MissingElement {
                element: R::LIST_ELEMENT,
            })?;
        match root.as_map() {
            Some(map) if map.contains_key(R::ELEMENT) => Self::from_map(map).map(Some),
            _ => Ok(None),
        }
    }
}

impl<R: ListItem> XmlResource for ResourceList<R> {
    const ELEMENT: &'static str = R::LIST_ELEMENT;

    fn field_policy(_mode: Mode) -> FieldPolicy {
        FieldPolicy::ExcludeUnset
    }

    fn fields(&self, mode: Mode) -> Vec<Field> {
        vec![
            Field::value("all", "@all", self.all.as_ref()),
            Field::value("results", "@results", self.results.as_ref()),
            Field::value("href", "@href", self.href.as_ref()),
            Field::nested_list(R::LIST_FIELD, R::ELEMENT, &self.items, mode),
        ]
    }

    fn from_map(map: &XmlMap) -> Result<Self, Sep2Error> {
        let reader = FieldReader::new(map);
        Ok(Self {
            items: reader.list(R::LIST_FIELD, R::ELEMENT)?,
            all: reader.optional("all", "@all")?,
            results: reader.optional("results", "@results")?,
            href: reader.optional("href", "@href")?,
        })
    }

    /// Encodes the items, forwarding filters to each of them.
    ///
    /// A selection nested under the list field name applies to every item. A
    /// flat include is dropped. Excluding the list field as a whole yields an
    /// empty mapping.
    fn encode_with(
        &self,
        mode: Mode,
        include: Option<&Selection>,
        exclude: Option<&Selection>,
    ) -> XmlMap {
        if exclude.is_some_and(|sel| sel.excludes_whole(R::LIST_FIELD)) {
            return XmlMap::new();
        }
        let item_include = include.and_then(|sel| sel.nested_for(R::LIST_FIELD));
        let item_exclude = exclude.and_then(|sel| sel.nested_for(R::LIST_FIELD));

        let items: Vec<XmlValue> = self
            .items
            .iter()
            .map(|item| XmlValue::Map(item.encode_with(mode, item_include, item_exclude)))
            .collect();

        let mut map = XmlMap::new();
        for (alias, value) in [("@all", self.all), ("@results", self.results)] {
            if let Some(value) = value {
                map.insert(alias, XmlValue::Text(alloc::format!("{}", value)));
            }
        }
        if let Some(href) = &self.href {
            map.insert("@href", XmlValue::Text(href.clone()));
        }
        map.insert(R::ELEMENT, XmlValue::List(items));
        map
    }
}

impl<R> IntoIterator for ResourceList<R> {
    type Item = R;
    type IntoIter = vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a ResourceList<R> {
    type Item = &'a R;
    type IntoIter = core::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
