//! Deck writer: appends generated slides to a copy of the template package.
//!
//! Every template part is copied unchanged except `[Content_Types].xml`,
//! the presentation part and its relationships, which gain one entry per
//! new slide. Slides already in the template stay ahead of the new ones.

use crate::package::{
    relative_target, rels_path, trailing_number, SLIDE_CONTENT_TYPE, SLIDE_LAYOUT_REL, SLIDE_REL,
};
use crate::slide::PptxSlide;
use crate::template::PptxTemplate;
use crate::xml::{
    attribute, escape_text, local_name, prefix_of, relationship_prefix, root_end_offset, splice,
};
use deck_core::{Deck, Error, LayoutRef, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES: &str = "[Content_Types].xml";

/// Smallest id PowerPoint accepts in `<p:sldId>`.
const MIN_SLIDE_ID: u32 = 256;

/// A deck for one group, built on a shared template.
#[derive(Debug)]
pub struct PptxDeck {
    template: PptxTemplate,
    slides: Vec<PptxSlide>,
}

/// A generated slide with the names and ids it will be saved under.
struct PlannedSlide<'a> {
    slide: &'a PptxSlide,
    part: String,
    rel_id: String,
    slide_id: u32,
}

impl PptxDeck {
    pub(crate) fn new(template: PptxTemplate) -> Self {
        Self {
            template,
            slides: Vec::new(),
        }
    }

    /// Slides appended so far.
    pub fn slides(&self) -> &[PptxSlide] {
        &self.slides
    }

    /// Serialize the deck as a complete package.
    pub fn write_to<W: Write + std::io::Seek>(&self, writer: W) -> Result<W> {
        let inner = &self.template.inner;
        let package = &inner.package;
        let presentation = inner.presentation.as_str();
        let presentation_rels = rels_path(presentation);

        let planned = self.plan(presentation)?;
        let mut replaced: HashMap<String, String> = HashMap::new();

        if !planned.is_empty() {
            let pres_xml = package.read_xml(presentation)?;
            replaced.insert(presentation.to_string(), insert_slide_ids(&pres_xml, &planned)?);

            let rels_xml = package.read_xml(&presentation_rels)?;
            let mut fragment = String::new();
            for slide in &planned {
                fragment.push_str(&format!(
                    r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                    slide.rel_id,
                    SLIDE_REL,
                    escape_text(&relative_target(presentation, &slide.part))
                ));
            }
            replaced.insert(
                presentation_rels.clone(),
                splice(&rels_xml, root_end_offset(&rels_xml)?, &fragment),
            );

            let types_xml = package.read_xml(CONTENT_TYPES)?;
            let mut fragment = String::new();
            for slide in &planned {
                fragment.push_str(&format!(
                    r#"<Override PartName="/{}" ContentType="{}"/>"#,
                    slide.part, SLIDE_CONTENT_TYPE
                ));
            }
            replaced.insert(
                CONTENT_TYPES.to_string(),
                splice(&types_xml, root_end_offset(&types_xml)?, &fragment),
            );
        }

        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in package.parts() {
            start_file(&mut zip, name, options)?;
            let bytes = replaced
                .get(name)
                .map(|xml| xml.as_bytes())
                .unwrap_or(data.as_slice());
            zip.write_all(bytes)?;
        }

        for planned_slide in &planned {
            start_file(&mut zip, &planned_slide.part, options)?;
            zip.write_all(planned_slide.slide.to_xml().as_bytes())?;

            let layout = &self.template.layouts()[planned_slide.slide.layout_index];
            let rels = format!(
                concat!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
                    r#"<Relationship Id="rId1" Type="{}" Target="{}"/>"#,
                    "</Relationships>"
                ),
                SLIDE_LAYOUT_REL,
                escape_text(&relative_target(&planned_slide.part, &layout.part))
            );
            start_file(&mut zip, &rels_path(&planned_slide.part), options)?;
            zip.write_all(rels.as_bytes())?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))
    }

    /// Assign part names, relationship ids and slide ids to new slides.
    fn plan(&self, presentation: &str) -> Result<Vec<PlannedSlide<'_>>> {
        let package = &self.template.inner.package;
        let slides_dir = match presentation.rsplit_once('/') {
            Some((dir, _)) => format!("{}/slides/", dir),
            None => "slides/".to_string(),
        };

        let last_part = package
            .part_names()
            .filter_map(|name| name.strip_prefix(slides_dir.as_str()))
            .filter(|rest| rest.starts_with("slide") && rest.ends_with(".xml") && !rest.contains('/'))
            .filter_map(trailing_number)
            .max()
            .unwrap_or(0);

        let last_rel = package
            .relationships(presentation)?
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0);

        let pres_xml = package.read_xml(presentation)?;
        let first_id = existing_slide_ids(&pres_xml)?
            .into_iter()
            .max()
            .map(|id| id + 1)
            .unwrap_or(MIN_SLIDE_ID)
            .max(MIN_SLIDE_ID);

        Ok(self
            .slides
            .iter()
            .enumerate()
            .map(|(i, slide)| PlannedSlide {
                slide,
                part: format!("{}slide{}.xml", slides_dir, last_part + 1 + i as u32),
                rel_id: format!("rId{}", last_rel + 1 + i as u32),
                slide_id: first_id + i as u32,
            })
            .collect())
    }
}

impl Deck for PptxDeck {
    type Slide = PptxSlide;

    fn add_slide(&mut self, layout: &LayoutRef) -> Result<&mut PptxSlide> {
        let info = self
            .template
            .layout(layout)
            .ok_or_else(|| Error::LayoutNotFound(layout.to_string()))?;
        self.slides
            .push(PptxSlide::new(info.index, info.placeholders.clone()));

        let index = self.slides.len() - 1;
        Ok(&mut self.slides[index])
    }

    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Write to a temporary file beside `path`, then rename it into place.
    fn save(self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        let mut writer = self.write_to(BufWriter::new(tmp.as_file_mut()))?;
        writer.flush()?;
        drop(writer);
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| Error::from(e.error))?;

        log::debug!("Saved {} slides to {}", self.slides.len(), path.display());
        Ok(())
    }
}

fn start_file<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    options: FileOptions,
) -> Result<()> {
    zip.start_file(name, options)
        .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))
}

/// Ids of the `<p:sldId>` entries already in the presentation.
fn existing_slide_ids(xml: &str) -> Result<Vec<u32>> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                if let Some(id) = attribute(e, b"id").and_then(|v| v.parse().ok()) {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("Error parsing presentation: {}", e))),
            _ => {}
        }
    }

    Ok(ids)
}

/// Where new `<p:sldId>` entries go.
enum Insertion {
    /// Before the closing tag of a non-empty `sldIdLst`.
    IntoList(usize),
    /// Replace an empty `<p:sldIdLst/>` spanning these bytes.
    ReplaceEmpty(usize, usize),
    /// No list yet: create one at this offset.
    NewList(usize),
}

/// Add `<p:sldId>` entries for the planned slides to presentation XML.
fn insert_slide_ids(xml: &str, planned: &[PlannedSlide<'_>]) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut prefix = String::new();
    let mut rel_prefix: Option<String> = None;
    let mut root_seen = false;
    let mut insertion: Option<Insertion> = None;
    let mut after_masters: Option<usize> = None;

    loop {
        let start = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(ref e)) if !root_seen => {
                root_seen = true;
                prefix = prefix_of(e.name().as_ref());
                rel_prefix = relationship_prefix(e);
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sldIdLst" => insertion = Some(Insertion::IntoList(start)),
                b"sldMasterIdLst" | b"notesMasterIdLst" | b"handoutMasterIdLst" => {
                    after_masters = Some(reader.buffer_position());
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"sldIdLst" => {
                    insertion = Some(Insertion::ReplaceEmpty(start, reader.buffer_position()))
                }
                b"sldMasterIdLst" | b"notesMasterIdLst" | b"handoutMasterIdLst" => {
                    after_masters = Some(reader.buffer_position());
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(format!("Error parsing presentation: {}", e))),
            _ => {}
        }
    }

    let rel_prefix = rel_prefix.unwrap_or_else(|| "r".to_string());
    let mut entries = String::new();
    for slide in planned {
        entries.push_str(&format!(
            r#"<{}sldId id="{}" {}:id="{}"/>"#,
            prefix, slide.slide_id, rel_prefix, slide.rel_id
        ));
    }
    let list = format!("<{p}sldIdLst>{}</{p}sldIdLst>", entries, p = prefix);

    let insertion = insertion
        .or_else(|| after_masters.map(Insertion::NewList))
        .ok_or_else(|| {
            Error::TemplateError("presentation has no slide master list".to_string())
        })?;

    Ok(match insertion {
        Insertion::IntoList(at) => splice(xml, at, &entries),
        Insertion::NewList(at) => splice(xml, at, &list),
        Insertion::ReplaceEmpty(from, to) => format!("{}{}{}", &xml[..from], list, &xml[to..]),
    })
}
