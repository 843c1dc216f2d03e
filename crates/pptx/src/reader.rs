//! Reads generated decks back: placeholder text per slide, in presentation
//! order.

use crate::package::{resolve_target, Package, SLIDE_LAYOUT_REL};
use crate::template::parse_layout;
use crate::xml::{attribute, local_name, relationship_id};
use deck_core::{DeckSnapshot, Error, PlaceholderText, Result, SlideSnapshot, SlotId};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Reader for saved `.pptx` decks.
pub struct DeckReader;

impl DeckReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a deck from disk.
    pub fn open(&self, path: &Path) -> Result<DeckSnapshot> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = File::open(path)?;
        self.read(BufReader::new(file), &filename)
    }

    /// Read a deck from a reader.
    pub fn read<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<DeckSnapshot> {
        let package = Package::from_reader(reader)?;
        let presentation = package.main_document()?;

        let mut snapshot = DeckSnapshot::new(filename);
        let mut layout_names: HashMap<String, String> = HashMap::new();

        for (idx, slide_path) in slide_order(&package, &presentation)?.iter().enumerate() {
            let mut slide = SlideSnapshot::new(idx + 1);
            slide.placeholders = extract_placeholders(&package.read_xml(slide_path)?)?;
            slide.layout = layout_name(&package, slide_path, &mut layout_names)?;
            snapshot.slides.push(slide);
        }

        Ok(snapshot)
    }
}

impl Default for DeckReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Slide part names in `<p:sldIdLst>` order.
fn slide_order(package: &Package, presentation: &str) -> Result<Vec<String>> {
    let targets: HashMap<String, String> = package
        .relationships(presentation)?
        .into_iter()
        .map(|r| (r.id, resolve_target(presentation, &r.target)))
        .collect();

    let xml = package.read_xml(presentation)?;
    let mut reader = Reader::from_str(&xml);
    reader.trim_text(true);
    let mut slides = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                let rel_id = relationship_id(e).unwrap_or_default();
                let target = targets.get(&rel_id).ok_or_else(|| {
                    Error::XmlError(format!("slide relationship '{}' is missing", rel_id))
                })?;
                slides.push(target.clone());
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(slides)
}

/// Name of the layout a slide was instantiated from.
fn layout_name(
    package: &Package,
    slide_path: &str,
    cache: &mut HashMap<String, String>,
) -> Result<Option<String>> {
    let Some(layout) = package
        .relationships(slide_path)?
        .into_iter()
        .find(|r| r.rel_type == SLIDE_LAYOUT_REL)
        .map(|r| resolve_target(slide_path, &r.target))
    else {
        return Ok(None);
    };

    if let Some(name) = cache.get(&layout) {
        return Ok(Some(name.clone()));
    }
    let (name, _) = parse_layout(&package.read_xml(&layout)?)?;
    cache.insert(layout, name.clone());
    Ok(Some(name))
}

/// Placeholders of a slide with their paragraph texts.
///
/// Whitespace is kept as written; only `<a:t>` content counts as text.
fn extract_placeholders(xml_content: &str) -> Result<Vec<PlaceholderText>> {
    let mut placeholders = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut in_shape = false;
    let mut slot: Option<SlotId> = None;
    let mut paragraphs: Vec<String> = Vec::new();
    let mut in_text_body = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" | b"pic" | b"graphicFrame" => {
                    in_shape = true;
                    slot = None;
                    paragraphs.clear();
                }
                b"txBody" if in_shape => in_text_body = true,
                b"p" if in_text_body => paragraphs.push(String::new()),
                b"t" if in_text_body => in_text = true,
                b"ph" if in_shape => slot = Some(placeholder_slot(e)),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"ph" if in_shape => slot = Some(placeholder_slot(e)),
                b"p" if in_text_body => paragraphs.push(String::new()),
                b"br" if in_text_body => {
                    if let Some(current) = paragraphs.last_mut() {
                        current.push('\n');
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::XmlError(format!("Bad text in slide: {}", e)))?;
                if let Some(current) = paragraphs.last_mut() {
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" | b"pic" | b"graphicFrame" if in_shape => {
                    if let Some(slot) = slot.take() {
                        placeholders.push(PlaceholderText {
                            slot,
                            paragraphs: std::mem::take(&mut paragraphs),
                        });
                    }
                    in_shape = false;
                    in_text_body = false;
                }
                b"txBody" => in_text_body = false,
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("Error parsing slide: {}", e))),
            _ => {}
        }
    }

    Ok(placeholders)
}

fn placeholder_slot(e: &quick_xml::events::BytesStart) -> SlotId {
    SlotId(attribute(e, b"idx").and_then(|v| v.parse().ok()).unwrap_or(0))
}
