//! Small XML helpers shared by the template reader and the package writer.

use deck_core::{Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub(crate) const REL_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Namespace prefix of an element name, including the colon (`"p:"`), or
/// the empty string.
pub(crate) fn prefix_of(name: &[u8]) -> String {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => format!("{}:", String::from_utf8_lossy(&name[..pos])),
        None => String::new(),
    }
}

/// Value of an unprefixed attribute.
pub(crate) fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Value of the relationship-id attribute (`r:id`), whatever its prefix.
pub(crate) fn relationship_id(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| {
            let key = a.key.as_ref();
            key.contains(&b':') && local_name(key) == b"id" && !key.starts_with(b"xmlns")
        })
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Prefix bound to the relationships namespace on an element, if declared.
pub(crate) fn relationship_prefix(e: &BytesStart) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        let key = a.key.as_ref();
        if a.value.as_ref() == REL_NS.as_bytes() && key.starts_with(b"xmlns:") {
            Some(String::from_utf8_lossy(&key[6..]).into_owned())
        } else {
            None
        }
    })
}

/// Escape text for element content or attribute values.
///
/// Control characters other than tab and newline are not allowed in XML 1.0
/// and are dropped.
pub(crate) fn escape_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|&c| c == '\t' || c == '\n' || c >= ' ')
        .collect();
    escape(cleaned.as_str()).into_owned()
}

/// Byte offset at which the closing tag of the document's root element
/// starts.
pub(crate) fn root_end_offset(xml: &str) -> Result<usize> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;

    loop {
        let start = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(start);
                }
            }
            Ok(Event::Eof) => {
                return Err(Error::XmlError("document has no closing root tag".to_string()))
            }
            Err(e) => return Err(Error::XmlError(e.to_string())),
            _ => {}
        }
    }
}

/// Insert `fragment` at byte offset `at`.
pub(crate) fn splice(xml: &str, at: usize, fragment: &str) -> String {
    let mut out = String::with_capacity(xml.len() + fragment.len());
    out.push_str(&xml[..at]);
    out.push_str(fragment);
    out.push_str(&xml[at..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_prefix_of() {
        assert_eq!(prefix_of(b"p:presentation"), "p:");
        assert_eq!(prefix_of(b"Relationships"), "");
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("R&D <core>"), "R&amp;D &lt;core&gt;");
        assert_eq!(escape_text("tab\there\u{b}"), "tab\there");
    }

    #[test]
    fn test_root_end_offset() {
        let xml = r#"<?xml version="1.0"?><Types><Default Extension="xml"/></Types>"#;
        let at = root_end_offset(xml).unwrap();
        assert_eq!(&xml[at..], "</Types>");

        let spliced = splice(xml, at, "<Override/>");
        assert!(spliced.ends_with("<Override/></Types>"));
    }

    #[test]
    fn test_relationship_attributes() {
        let xml = r#"<p:presentation xmlns:p="x" xmlns:rel="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldId id="256" rel:id="rId7"/></p:presentation>"#;
        let mut reader = Reader::from_str(xml);
        let mut seen = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => seen.push(relationship_prefix(&e)),
                Event::Empty(e) => {
                    assert_eq!(attribute(&e, b"id").as_deref(), Some("256"));
                    assert_eq!(relationship_id(&e).as_deref(), Some("rId7"));
                }
                Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(seen, vec![Some("rel".to_string())]);
    }
}
