//! Slides instantiated from template layouts.

use crate::template::PlaceholderInfo;
use crate::xml::escape_text;
use deck_core::{Slide, SlotId, SlotKind};
use std::fmt::Write as FmtWrite;

/// A slide being built: a copy of the layout's placeholders plus the
/// paragraphs written into them.
#[derive(Debug, Clone)]
pub struct PptxSlide {
    pub(crate) layout_index: usize,
    placeholders: Vec<PlaceholderInfo>,
    text: Vec<Option<Vec<String>>>,
}

impl PptxSlide {
    pub(crate) fn new(layout_index: usize, placeholders: Vec<PlaceholderInfo>) -> Self {
        let text = vec![None; placeholders.len()];
        Self {
            layout_index,
            placeholders,
            text,
        }
    }

    fn position(&self, slot: SlotId) -> Option<usize> {
        self.placeholders.iter().position(|p| p.idx == slot.0)
    }

    /// Paragraphs written to a slot so far.
    pub fn paragraphs(&self, slot: SlotId) -> Option<&[String]> {
        self.position(slot)
            .and_then(|i| self.text[i].as_deref())
    }

    /// Slide part XML.
    pub(crate) fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(1024 + self.placeholders.len() * 512);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
        xml.push_str(
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        );
        xml.push_str(r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#);
        xml.push_str("<p:cSld>");
        xml.push_str("<p:spTree>");
        xml.push_str("<p:nvGrpSpPr>");
        xml.push_str(r#"<p:cNvPr id="1" name=""/>"#);
        xml.push_str("<p:cNvGrpSpPr/>");
        xml.push_str("<p:nvPr/>");
        xml.push_str("</p:nvGrpSpPr>");
        xml.push_str("<p:grpSpPr/>");

        for (i, ph) in self.placeholders.iter().enumerate() {
            // Shape ids start at 2; id 1 is the group above.
            write_placeholder(&mut xml, i as u32 + 2, ph, self.text[i].as_deref());
        }

        xml.push_str("</p:spTree>");
        xml.push_str("</p:cSld>");
        xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
        xml.push_str("</p:sld>");
        xml
    }
}

impl Slide for PptxSlide {
    fn slot_kind(&self, slot: SlotId) -> Option<SlotKind> {
        self.position(slot).map(|i| self.placeholders[i].kind())
    }

    fn set_paragraphs(&mut self, slot: SlotId, paragraphs: Vec<String>) {
        if let Some(i) = self.position(slot) {
            self.text[i] = Some(paragraphs);
        }
    }
}

fn write_placeholder(xml: &mut String, id: u32, ph: &PlaceholderInfo, text: Option<&[String]>) {
    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    let _ = write!(xml, r#"<p:cNvPr id="{}" name="{}"/>"#, id, escape_text(&ph.name));
    xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
    xml.push_str("<p:nvPr><p:ph");
    for (key, value) in &ph.ph_attributes {
        let _ = write!(xml, r#" {}="{}""#, key, escape_text(value));
    }
    xml.push_str("/></p:nvPr>");
    xml.push_str("</p:nvSpPr>");
    xml.push_str("<p:spPr/>");

    match (text, ph.kind()) {
        (Some(paragraphs), _) => write_text_body(xml, paragraphs),
        (None, SlotKind::Text) => write_text_body(xml, &[]),
        (None, SlotKind::NonText) => {}
    }

    xml.push_str("</p:sp>");
}

fn write_text_body(xml: &mut String, paragraphs: &[String]) {
    xml.push_str("<p:txBody>");
    xml.push_str("<a:bodyPr/>");
    xml.push_str("<a:lstStyle/>");
    if paragraphs.is_empty() {
        xml.push_str("<a:p/>");
    }
    for paragraph in paragraphs {
        if paragraph.is_empty() {
            xml.push_str("<a:p/>");
        } else {
            xml.push_str("<a:p><a:r>");
            xml.push_str(r#"<a:rPr lang="en-US" dirty="0"/>"#);
            let _ = write!(xml, "<a:t>{}</a:t>", escape_text(paragraph));
            xml.push_str("</a:r></a:p>");
        }
    }
    xml.push_str("</p:txBody>");
}
