// crates/sep2-client/src/xml/writer.rs

use super::{ATTRIBUTE_PREFIX, TEXT_KEY, XmlMap, XmlValue};
use crate::error::Sep2Error;
use alloc::string::String;
use alloc::vec::Vec;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

/// Serializes a tree back into a compact XML fragment.
///
/// No XML declaration is emitted. Empty maps become `<name></name>`, lists
/// repeat their element, and `@` entries become attributes of their parent.
pub fn write_document(document: &XmlMap) -> Result<String, Sep2Error> {
    let mut writer = Writer::new(Vec::new());
    write_children(&mut writer, document)?;
    into_string(writer)
}

/// Same as [`write_document`], with one element per line, indented by two spaces.
pub fn write_document_pretty(document: &XmlMap) -> Result<String, Sep2Error> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_children(&mut writer, document)?;
    into_string(writer)
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String, Sep2Error> {
    String::from_utf8(writer.into_inner())
        .map_err(|_| Sep2Error::MalformedDocument("output is not valid UTF-8"))
}

fn write_event<'a>(writer: &mut Writer<Vec<u8>>, event: Event<'a>) -> Result<(), Sep2Error> {
    writer
        .write_event(event)
        .map_err(|e| Sep2Error::XmlParsing(quick_xml::Error::from(e)))
}

fn write_children(writer: &mut Writer<Vec<u8>>, map: &XmlMap) -> Result<(), Sep2Error> {
    for (name, value) in map.iter() {
        if name != TEXT_KEY && !name.starts_with(ATTRIBUTE_PREFIX) {
            write_element(writer, name, value)?;
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &XmlValue) -> Result<(), Sep2Error> {
    match value {
        XmlValue::List(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
        }
        XmlValue::Text(text) => {
            write_event(writer, Event::Start(BytesStart::new(name)))?;
            write_event(writer, Event::Text(BytesText::new(text)))?;
            write_event(writer, Event::End(BytesEnd::new(name)))?;
        }
        XmlValue::Map(map) => {
            let mut start = BytesStart::new(name);
            for (key, attr) in map.iter() {
                if let Some(attr_name) = key.strip_prefix(ATTRIBUTE_PREFIX) {
                    start.push_attribute((attr_name, attr.text().unwrap_or_default()));
                }
            }
            write_event(writer, Event::Start(start))?;

            // A text event, even an empty one, keeps the closing tag on the same line.
            let text = map.get(TEXT_KEY).and_then(XmlValue::text);
            let has_children = map
                .iter()
                .any(|(key, _)| key != TEXT_KEY && !key.starts_with(ATTRIBUTE_PREFIX));
            if text.is_some() || !has_children {
                write_event(writer, Event::Text(BytesText::new(text.unwrap_or_default())))?;
            }
            write_children(writer, map)?;

            write_event(writer, Event::End(BytesEnd::new(name)))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;
    use alloc::vec;

    #[test]
    fn test_write_attributes_children_and_lists() {
        let mut link = XmlMap::new();
        link.insert("@href", XmlValue::Text("/edev/3/der".into()));

        let mut edev = XmlMap::new();
        edev.insert("@href", XmlValue::Text("/edev/3".into()));
        edev.insert("DERListLink", XmlValue::Map(link));
        edev.insert(
            "DER",
            XmlValue::List(vec![XmlValue::Map(XmlMap::new()), XmlValue::Map(XmlMap::new())]),
        );

        let xml = write_document(&XmlMap::with_root("EndDevice", XmlValue::Map(edev))).unwrap();
        assert_eq!(
            xml,
            r#"<EndDevice href="/edev/3"><DERListLink href="/edev/3/der"></DERListLink><DER></DER><DER></DER></EndDevice>"#
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = XmlMap::with_root("mfInfo", XmlValue::Text("A & <B>".into()));
        assert_eq!(
            write_document(&doc).unwrap(),
            "<mfInfo>A &amp; &lt;B&gt;</mfInfo>"
        );
    }

    #[test]
    fn test_pretty_output_parses_back_to_same_tree() {
        let xml = "<EndDevice><lFDI>0x1</lFDI><DER><DERCapability><type>4</type></DERCapability></DER></EndDevice>";
        let tree = parse_document(xml).unwrap();
        let pretty = write_document_pretty(&tree).unwrap();
        assert!(pretty.contains("\n  <lFDI>0x1</lFDI>\n"));
        assert!(pretty.contains("\n      <type>4</type>\n"));
        assert_eq!(parse_document(&pretty).unwrap(), tree);
    }

    #[test]
    fn test_empty_text_is_written_as_open_and_close_tags() {
        let mut info = XmlMap::new();
        info.insert("mfModel", XmlValue::Text(String::new()));
        info.insert("DER", XmlValue::Map(XmlMap::new()));
        let doc = XmlMap::with_root("d", XmlValue::Map(info));
        assert_eq!(
            write_document(&doc).unwrap(),
            "<d><mfModel></mfModel><DER></DER></d>"
        );
        assert!(write_document_pretty(&doc).unwrap().contains("\n  <mfModel></mfModel>\n"));
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let mut link = XmlMap::new();
        link.insert("@href", XmlValue::Text("/edev?s=0&l=10".into()));
        let doc = XmlMap::with_root("EndDeviceListLink", XmlValue::Map(link));
        let xml = write_document(&doc).unwrap();
        assert_eq!(xml, r#"<EndDeviceListLink href="/edev?s=0&amp;l=10"></EndDeviceListLink>"#);
        assert_eq!(parse_document(&xml).unwrap(), doc);
    }
}
