//! Synthetic template packages for the integration tests.

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Layout names and their placeholders as `(idx, type)`, in master order.
pub fn layouts() -> Vec<(&'static str, Vec<(u32, &'static str)>)> {
    let mut overview = vec![(0, "title"), (1, "body"), (30, "pic"), (10, "dt"), (11, "ftr")];
    overview.extend([15, 16, 17, 18, 19, 21, 22, 23, 24, 25, 27].map(|idx| (idx, "body")));
    let mut detail = vec![(0, "title"), (1, "body")];
    detail.extend([13, 14, 15, 16, 17].map(|idx| (idx, "body")));

    vec![
        ("Title Slide", vec![(0, "ctrTitle"), (1, "subTitle")]),
        ("Section Header", vec![(0, "title")]),
        ("Approval Overview", overview),
        ("Approval Detail", detail),
        ("Two Content", vec![(0, "title"), (1, "obj"), (2, "obj")]),
        ("Title Only", vec![(0, "title")]),
        ("Picture", vec![(0, "title"), (1, "pic")]),
        ("Blank", vec![]),
    ]
}

fn layout_xml(name: &str, placeholders: &[(u32, &str)]) -> String {
    let mut shapes = String::new();
    for (i, (idx, ph_type)) in placeholders.iter().enumerate() {
        let idx_attr = if *idx == 0 {
            String::new()
        } else {
            format!(r#" idx="{}""#, idx)
        };
        shapes.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{} {}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="{}"{}/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>Click to edit</a:t></a:r></a:p></p:txBody></p:sp>"#,
            i + 2,
            ph_type,
            idx,
            ph_type,
            idx_attr
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {}><p:cSld name="{}"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sldLayout>"#,
        NS, name, shapes
    )
}

const INTRO_SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>Template Intro</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;

/// A template package; with `intro_slide` it already holds one slide.
pub fn template_bytes(intro_slide: bool) -> Vec<u8> {
    let layouts = layouts();
    let mut parts: Vec<(String, String)> = Vec::new();

    let mut types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#,
    );
    for n in 1..=layouts.len() {
        types.push_str(&format!(
            r#"<Override PartName="/ppt/slideLayouts/slideLayout{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
            n
        ));
    }
    if intro_slide {
        types.push_str(r#"<Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#);
    }
    types.push_str("</Types>");
    parts.push(("[Content_Types].xml".to_string(), types));

    parts.push((
        "_rels/.rels".to_string(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#,
            RELS_NS, REL
        ),
    ));

    let slide_list = if intro_slide {
        r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst>"#
    } else {
        ""
    };
    parts.push((
        "ppt/presentation.xml".to_string(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{}<p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
            NS, slide_list
        ),
    ));

    let mut pres_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
        RELS_NS, REL
    );
    if intro_slide {
        pres_rels.push_str(&format!(
            r#"<Relationship Id="rId2" Type="{}/slide" Target="slides/slide1.xml"/>"#,
            REL
        ));
    }
    pres_rels.push_str("</Relationships>");
    parts.push(("ppt/_rels/presentation.xml.rels".to_string(), pres_rels));

    let mut layout_ids = String::new();
    let mut master_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}">"#,
        RELS_NS
    );
    for n in 1..=layouts.len() {
        layout_ids.push_str(&format!(
            r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
            2147483648u32 + n as u32,
            n
        ));
        master_rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}/slideLayout" Target="../slideLayouts/slideLayout{}.xml"/>"#,
            n, REL, n
        ));
    }
    master_rels.push_str("</Relationships>");
    parts.push((
        "ppt/slideMasters/slideMaster1.xml".to_string(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:sldLayoutIdLst>{}</p:sldLayoutIdLst></p:sldMaster>"#,
            NS, layout_ids
        ),
    ));
    parts.push((
        "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
        master_rels,
    ));

    for (n, (name, placeholders)) in layouts.iter().enumerate() {
        parts.push((
            format!("ppt/slideLayouts/slideLayout{}.xml", n + 1),
            layout_xml(name, placeholders),
        ));
        parts.push((
            format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", n + 1),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#,
                RELS_NS, REL
            ),
        ));
    }

    if intro_slide {
        parts.push(("ppt/slides/slide1.xml".to_string(), INTRO_SLIDE.to_string()));
        parts.push((
            "ppt/slides/_rels/slide1.xml.rels".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/slideLayout" Target="../slideLayouts/slideLayout6.xml"/></Relationships>"#,
                RELS_NS, REL
            ),
        ));
    }

    zip_bytes(&parts)
}

fn zip_bytes(parts: &[(String, String)]) -> Vec<u8> {
    let cursor = Cursor::new(Vec::new());
    let mut writer = ZipWriter::new(cursor);
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, xml) in parts {
        writer.start_file(name.as_str(), options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
    }

    writer.finish().unwrap().into_inner()
}
