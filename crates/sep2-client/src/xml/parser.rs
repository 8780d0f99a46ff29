// crates/sep2-client/src/xml/parser.rs

use super::{ATTRIBUTE_PREFIX, TEXT_KEY, XmlMap, XmlValue};
use crate::error::Sep2Error;
use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// An element whose closing tag has not been seen yet.
struct OpenElement {
    name: String,
    content: XmlMap,
    text: String,
}

/// Parses an XML document into an ordered tree.
///
/// The returned map holds exactly one entry: the root element. Namespace
/// prefixes are stripped from element names; attribute names are kept as
/// written (`@xmlns`, `@href`).
///
/// # Errors
/// Returns an `Sep2Error` when the reader rejects the input, tags are
/// unbalanced, or the document has no (or more than one) root element.
pub fn parse_document(xml: &str) -> Result<XmlMap, Sep2Error> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut document = XmlMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(open_element(&e)?),
            Event::Empty(e) => {
                let element = open_element(&e)?;
                close_element(element, &mut stack, &mut document)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or(Sep2Error::MalformedDocument("closing tag without opening tag"))?;
                close_element(element, &mut stack, &mut document)?;
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::CData(c) => {
                // Re-escaped so the whole buffer can be unescaped once on close.
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&escape(String::from_utf8_lossy(&c).as_ref()));
                }
            }
            Event::GeneralRef(r) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push('&');
                    top.text.push_str(&String::from_utf8_lossy(&r));
                    top.text.push(';');
                }
            }
            Event::Eof => break,
            _ => {} // Declarations, comments, processing instructions
        }
    }

    if !stack.is_empty() {
        return Err(Sep2Error::MalformedDocument("unclosed element"));
    }
    if document.is_empty() {
        return Err(Sep2Error::MalformedDocument("no root element"));
    }
    Ok(document)
}

fn open_element(e: &BytesStart) -> Result<OpenElement, Sep2Error> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut content = XmlMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref());
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw)?.into_owned();
        content.insert(
            alloc::format!("{}{}", ATTRIBUTE_PREFIX, key),
            XmlValue::Text(value),
        );
    }
    Ok(OpenElement {
        name,
        content,
        text: String::new(),
    })
}

fn close_element(
    element: OpenElement,
    stack: &mut [OpenElement],
    document: &mut XmlMap,
) -> Result<(), Sep2Error> {
    let OpenElement {
        name,
        mut content,
        text,
    } = element;
    let text = unescape(text.trim())?.into_owned();

    let value = if content.is_empty() {
        if text.is_empty() {
            XmlValue::Map(content)
        } else {
            XmlValue::Text(text)
        }
    } else {
        if !text.is_empty() {
            content.insert(TEXT_KEY.to_owned(), XmlValue::Text(text));
        }
        XmlValue::Map(content)
    };

    match stack.last_mut() {
        Some(parent) => parent.content.push_repeated(name, value),
        None => {
            if !document.is_empty() {
                return Err(Sep2Error::MalformedDocument("more than one root element"));
            }
            document.insert(name, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements_and_attributes() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<EndDevice xmlns="urn:ieee:std:2030.5:ns" href="/edev/3">
    <deviceCategory>262144</deviceCategory>
    <lFDI>0x222099d639e</lFDI>
    <DERListLink href="/edev/3/der" all="1"/>
</EndDevice>"#;
        let doc = parse_document(xml).unwrap();
        let edev = doc.get("EndDevice").and_then(XmlValue::as_map).unwrap();
        assert_eq!(edev.get("@href").and_then(XmlValue::text), Some("/edev/3"));
        assert_eq!(
            edev.get("deviceCategory").and_then(XmlValue::text),
            Some("262144")
        );
        let link = edev.get("DERListLink").and_then(XmlValue::as_map).unwrap();
        assert_eq!(link.get("@all").and_then(XmlValue::text), Some("1"));
    }

    #[test]
    fn test_repeated_children_become_list() {
        let xml = "<L><I><v>1</v></I><I><v>2</v></I></L>";
        let doc = parse_document(xml).unwrap();
        let list = doc.get("L").and_then(XmlValue::as_map).unwrap();
        assert!(matches!(list.get("I"), Some(XmlValue::List(items)) if items.len() == 2));
    }

    #[test]
    fn test_empty_element_is_empty_map() {
        let doc = parse_document("<DER></DER>").unwrap();
        assert_eq!(doc.get("DER"), Some(&XmlValue::Map(XmlMap::new())));

        let doc = parse_document("<DER/>").unwrap();
        assert_eq!(doc.get("DER"), Some(&XmlValue::Map(XmlMap::new())));
    }

    #[test]
    fn test_entities_are_unescaped() {
        let doc = parse_document("<d><mfInfo>A &amp; B &lt;1&gt;</mfInfo></d>").unwrap();
        let d = doc.get("d").and_then(XmlValue::as_map).unwrap();
        assert_eq!(d.get("mfInfo").and_then(XmlValue::text), Some("A & B <1>"));
    }

    #[test]
    fn test_namespace_prefix_is_stripped() {
        let doc = parse_document(r#"<ns:EndDevice xmlns:ns="urn:x"><ns:sFDI>1</ns:sFDI></ns:EndDevice>"#)
            .unwrap();
        let edev = doc.get("EndDevice").and_then(XmlValue::as_map).unwrap();
        assert_eq!(edev.get("sFDI").and_then(XmlValue::text), Some("1"));
    }

    #[test]
    fn test_rejects_unclosed_and_empty_documents() {
        assert!(parse_document("<EndDevice><lFDI>1</lFDI>").is_err());
        assert!(matches!(
            parse_document("   "),
            Err(Sep2Error::MalformedDocument(_))
        ));
    }
}
