//! Template presentation: the package to copy and the layouts it offers.
//!
//! Layouts are those of the first slide master, in the master's
//! `sldLayoutIdLst` order. That order is what layout indices refer to.

use crate::package::{resolve_target, Package, SLIDE_MASTER_REL};
use crate::writer::PptxDeck;
use crate::xml::{attribute, local_name, relationship_id};
use deck_core::{DeckTemplate, Error, LayoutRef, Result, SlotId, SlotKind};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::Arc;

/// Placeholder types that never hold text.
const NON_TEXT_TYPES: &[&str] = &["pic", "chart", "tbl", "clipArt", "dgm", "media", "sldImg"];

/// Placeholder types that are not copied onto new slides.
const SKIPPED_TYPES: &[&str] = &["dt", "ftr", "sldNum"];

/// A placeholder declared by a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderInfo {
    /// Placeholder index; 0 for the title.
    pub idx: u32,

    /// `type` attribute of `<p:ph>`, `obj` when absent.
    pub ph_type: String,

    /// Shape name from `<p:cNvPr>`.
    pub name: String,

    /// Attributes of `<p:ph>` copied verbatim onto slides.
    pub(crate) ph_attributes: Vec<(String, String)>,
}

impl PlaceholderInfo {
    pub fn kind(&self) -> SlotKind {
        if NON_TEXT_TYPES.contains(&self.ph_type.as_str()) {
            SlotKind::NonText
        } else {
            SlotKind::Text
        }
    }

    pub fn slot(&self) -> SlotId {
        SlotId(self.idx)
    }
}

/// A layout of the template.
#[derive(Debug, Clone)]
pub struct LayoutInfo {
    pub index: usize,
    pub name: String,

    /// Part name, e.g. `ppt/slideLayouts/slideLayout3.xml`.
    pub part: String,

    /// Placeholders copied onto slides, in layout order.
    pub placeholders: Vec<PlaceholderInfo>,
}

#[derive(Debug)]
pub(crate) struct TemplateParts {
    pub(crate) package: Package,
    pub(crate) presentation: String,
    pub(crate) layouts: Vec<LayoutInfo>,
}

/// A loaded template. Cheap to clone; decks share the template's parts.
#[derive(Debug, Clone)]
pub struct PptxTemplate {
    pub(crate) inner: Arc<TemplateParts>,
}

impl PptxTemplate {
    /// Open a template file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            Error::TemplateError(format!("cannot open {}: {}", path.display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a template from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let package = Package::from_reader(reader)?;
        let presentation = package.main_document()?;
        let layouts = discover_layouts(&package, &presentation)?;

        log::debug!("Template has {} layouts", layouts.len());
        for layout in &layouts {
            log::trace!(
                "  #{} '{}': {} placeholders",
                layout.index,
                layout.name,
                layout.placeholders.len()
            );
        }

        Ok(Self {
            inner: Arc::new(TemplateParts {
                package,
                presentation,
                layouts,
            }),
        })
    }

    /// Layouts in index order.
    pub fn layouts(&self) -> &[LayoutInfo] {
        &self.inner.layouts
    }

    /// Find a layout by index or name.
    pub fn layout(&self, layout: &LayoutRef) -> Option<&LayoutInfo> {
        match layout {
            LayoutRef::Index(i) => self.inner.layouts.get(*i),
            LayoutRef::Name(name) => self.inner.layouts.iter().find(|l| &l.name == name),
        }
    }
}

impl DeckTemplate for PptxTemplate {
    type Deck = PptxDeck;

    fn create_deck(&self) -> Result<PptxDeck> {
        Ok(PptxDeck::new(self.clone()))
    }

    fn has_layout(&self, layout: &LayoutRef) -> bool {
        self.layout(layout).is_some()
    }
}

/// Layout parts of the first slide master, in master order.
fn discover_layouts(package: &Package, presentation: &str) -> Result<Vec<LayoutInfo>> {
    let master = package
        .relationships(presentation)?
        .into_iter()
        .find(|r| r.rel_type == SLIDE_MASTER_REL)
        .map(|r| resolve_target(presentation, &r.target))
        .ok_or_else(|| Error::TemplateError("template has no slide master".to_string()))?;

    let targets: HashMap<String, String> = package
        .relationships(&master)?
        .into_iter()
        .map(|r| (r.id, resolve_target(&master, &r.target)))
        .collect();

    let master_xml = package.read_xml(&master)?;
    let mut layouts = Vec::new();
    for rel_id in layout_ids(&master_xml)? {
        let part = targets.get(&rel_id).ok_or_else(|| {
            Error::TemplateError(format!("layout relationship '{}' is missing", rel_id))
        })?;
        let (name, placeholders) = parse_layout(&package.read_xml(part)?)?;
        layouts.push(LayoutInfo {
            index: layouts.len(),
            name,
            part: part.clone(),
            placeholders,
        });
    }

    Ok(layouts)
}

/// Relationship ids of `<p:sldLayoutId>` entries, in order.
fn layout_ids(master_xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(master_xml);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldLayoutId" =>
            {
                if let Some(id) = relationship_id(e) {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("Error parsing slide master: {}", e))),
            _ => {}
        }
    }

    Ok(ids)
}

/// Layout name and copyable placeholders from layout XML.
pub(crate) fn parse_layout(xml: &str) -> Result<(String, Vec<PlaceholderInfo>)> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut name = String::new();
    let mut placeholders = Vec::new();
    // Open shape: its depth, its name and its placeholder, if any.
    let mut shape: Option<(usize, String, Option<PlaceholderInfo>)> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                match local_name(e.name().as_ref()) {
                    b"cSld" => name = attribute(e, b"name").unwrap_or_default(),
                    b"sp" | b"pic" | b"graphicFrame" if shape.is_none() => {
                        shape = Some((depth, String::new(), None));
                    }
                    _ => visit_shape_child(e, &mut shape),
                }
            }
            Ok(Event::Empty(ref e)) => {
                if local_name(e.name().as_ref()) == b"cSld" {
                    name = attribute(e, b"name").unwrap_or_default();
                }
                visit_shape_child(e, &mut shape);
            }
            Ok(Event::End(_)) => {
                let closing = matches!(&shape, Some((open, _, _)) if *open == depth);
                if closing {
                    if let Some((_, shape_name, Some(mut ph))) = shape.take() {
                        ph.name = shape_name;
                        if !SKIPPED_TYPES.contains(&ph.ph_type.as_str()) {
                            placeholders.push(ph);
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("Error parsing layout: {}", e))),
            _ => {}
        }
    }

    Ok((name, placeholders))
}

fn visit_shape_child(e: &BytesStart, shape: &mut Option<(usize, String, Option<PlaceholderInfo>)>) {
    let Some((_, shape_name, ph)) = shape else {
        return;
    };
    match local_name(e.name().as_ref()) {
        b"cNvPr" if shape_name.is_empty() => {
            *shape_name = attribute(e, b"name").unwrap_or_default();
        }
        b"ph" => {
            let ph_attributes: Vec<(String, String)> = e
                .attributes()
                .flatten()
                .filter(|a| a.key.as_ref() != b"hasCustomPrompt")
                .map(|a| {
                    (
                        String::from_utf8_lossy(a.key.as_ref()).into_owned(),
                        String::from_utf8_lossy(&a.value).into_owned(),
                    )
                })
                .collect();
            *ph = Some(PlaceholderInfo {
                idx: attribute(e, b"idx").and_then(|v| v.parse().ok()).unwrap_or(0),
                ph_type: attribute(e, b"type").unwrap_or_else(|| "obj".to_string()),
                name: String::new(),
                ph_attributes,
            });
        }
        _ => {}
    }
}
