//! Single-slide PPTX export.
//!
//! Writes a minimal PresentationML package: one master, one "Title Only"
//! layout, one theme and one slide holding a title and a PNG picture.

use crate::budget::Budget;
use crate::error::Result;
use crate::format::dollars;
use chrono::Utc;
use log::info;
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::FileOptions;

/// Download name of the presentation export.
pub const PPTX_FILENAME: &str = "creaming_curve_presentation.pptx";
/// MIME type of the presentation export.
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

const EMU_PER_INCH: u64 = 914_400;
const SLIDE_WIDTH: u64 = 10 * EMU_PER_INCH;
const SLIDE_HEIGHT: u64 = 7 * EMU_PER_INCH + EMU_PER_INCH / 2;
const PICTURE_LEFT: u64 = EMU_PER_INCH;
const PICTURE_TOP: u64 = EMU_PER_INCH;
const PICTURE_WIDTH: u64 = 8 * EMU_PER_INCH;

const NS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Slide title for a budget, e.g. `Creaming Curve with Budget $2,500`.
pub fn slide_title(budget: Budget) -> String {
    format!("Creaming Curve with Budget {}", dollars(budget.amount()))
}

/// A PNG and its pixel size; the size fixes the picture's aspect ratio.
#[derive(Clone, Copy, Debug)]
pub struct SlideImage<'a> {
    pub png: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/// Build a one-slide presentation: `title` in the title placeholder and the
/// image placed 1in from the top-left corner, 8in wide.
pub fn to_pptx(title: &str, image: SlideImage<'_>) -> Result<Vec<u8>> {
    let picture_height = if image.width == 0 {
        0
    } else {
        PICTURE_WIDTH * image.height as u64 / image.width as u64
    };

    let parts: Vec<(&str, String)> = vec![
        ("[Content_Types].xml", content_types()),
        ("_rels/.rels", package_rels()),
        ("docProps/core.xml", core_props()),
        ("docProps/app.xml", app_props()),
        ("ppt/presentation.xml", presentation()),
        ("ppt/_rels/presentation.xml.rels", presentation_rels()),
        ("ppt/slideMasters/slideMaster1.xml", slide_master()),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ]),
        ),
        ("ppt/slideLayouts/slideLayout1.xml", slide_layout()),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        ),
        ("ppt/theme/theme1.xml", theme()),
        ("ppt/slides/slide1.xml", slide(title, picture_height)),
        (
            "ppt/slides/_rels/slide1.xml.rels",
            rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "image", "../media/image1.png"),
            ]),
        ),
    ];

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, xml) in &parts {
        writer.start_file(*name, options)?;
        writer.write_all(xml.as_bytes())?;
    }
    // PNG is already compressed
    writer.start_file(
        "ppt/media/image1.png",
        FileOptions::default().compression_method(zip::CompressionMethod::Stored),
    )?;
    writer.write_all(image.png)?;

    let bytes = writer.finish()?.into_inner();
    info!("wrote presentation: '{}', {} bytes", title, bytes.len());
    Ok(bytes)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut out = format!("{}<Relationships xmlns=\"{}\">", XML_DECL, REL_NS);
    for (id, kind, target) in entries {
        out.push_str(&format!(
            "<Relationship Id=\"{}\" Type=\"{}/{}\" Target=\"{}\"/>",
            id, REL_TYPE, kind, target
        ));
    }
    out.push_str("</Relationships>");
    out
}

fn content_types() -> String {
    let ct = "application/vnd.openxmlformats-officedocument";
    format!(
        concat!(
            "{decl}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
            "<Default Extension=\"png\" ContentType=\"image/png\"/>",
            "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
            "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
            "<Override PartName=\"/ppt/presentation.xml\" ContentType=\"{ct}.presentationml.presentation.main+xml\"/>",
            "<Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"{ct}.presentationml.slideMaster+xml\"/>",
            "<Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"{ct}.presentationml.slideLayout+xml\"/>",
            "<Override PartName=\"/ppt/slides/slide1.xml\" ContentType=\"{ct}.presentationml.slide+xml\"/>",
            "<Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"{ct}.theme+xml\"/>",
            "<Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>",
            "<Override PartName=\"/docProps/app.xml\" ContentType=\"{ct}.extended-properties+xml\"/>",
            "</Types>"
        ),
        decl = XML_DECL,
        ct = ct
    )
}

fn package_rels() -> String {
    let mut out = format!("{}<Relationships xmlns=\"{}\">", XML_DECL, REL_NS);
    out.push_str(&format!(
        "<Relationship Id=\"rId1\" Type=\"{}/officeDocument\" Target=\"ppt/presentation.xml\"/>",
        REL_TYPE
    ));
    out.push_str(concat!(
        "<Relationship Id=\"rId2\" ",
        "Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" ",
        "Target=\"docProps/core.xml\"/>"
    ));
    out.push_str(&format!(
        "<Relationship Id=\"rId3\" Type=\"{}/extended-properties\" Target=\"docProps/app.xml\"/>",
        REL_TYPE
    ));
    out.push_str("</Relationships>");
    out
}

fn core_props() -> String {
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            "{decl}<cp:coreProperties ",
            "xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" ",
            "xmlns:dc=\"http://purl.org/dc/elements/1.1/\" ",
            "xmlns:dcterms=\"http://purl.org/dc/terms/\" ",
            "xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">",
            "<dc:title>Creaming Curve</dc:title>",
            "<dcterms:created xsi:type=\"dcterms:W3CDTF\">{now}</dcterms:created>",
            "<dcterms:modified xsi:type=\"dcterms:W3CDTF\">{now}</dcterms:modified>",
            "</cp:coreProperties>"
        ),
        decl = XML_DECL,
        now = now
    )
}

fn app_props() -> String {
    format!(
        concat!(
            "{}<Properties ",
            "xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\">",
            "<Application>creaming</Application><Slides>1</Slides>",
            "</Properties>"
        ),
        XML_DECL
    )
}

fn presentation() -> String {
    format!(
        concat!(
            "{decl}<p:presentation {ns} saveSubsetFonts=\"1\">",
            "<p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>",
            "<p:sldIdLst><p:sldId id=\"256\" r:id=\"rId2\"/></p:sldIdLst>",
            "<p:sldSz cx=\"{w}\" cy=\"{h}\" type=\"screen4x3\"/>",
            "<p:notesSz cx=\"{h}\" cy=\"{w}\"/>",
            "</p:presentation>"
        ),
        decl = XML_DECL,
        ns = NS,
        w = SLIDE_WIDTH,
        h = SLIDE_HEIGHT
    )
}

fn presentation_rels() -> String {
    rels(&[
        ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
        ("rId2", "slide", "slides/slide1.xml"),
        ("rId3", "theme", "theme/theme1.xml"),
    ])
}

fn group_header() -> &'static str {
    concat!(
        "<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>",
        "<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>",
        "<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>"
    )
}

// Title placeholder with an explicit frame; the layout and master share it.
fn title_placeholder(body: &str) -> String {
    format!(
        concat!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"Title 1\"/>",
            "<p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr><p:nvPr><p:ph type=\"title\"/></p:nvPr></p:nvSpPr>",
            "<p:spPr><a:xfrm><a:off x=\"457200\" y=\"274638\"/><a:ext cx=\"8229600\" cy=\"1143000\"/></a:xfrm></p:spPr>",
            "{}</p:sp>"
        ),
        body
    )
}

fn slide_master() -> String {
    format!(
        concat!(
            "{decl}<p:sldMaster {ns}>",
            "<p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg>",
            "<p:spTree>{group}{title}</p:spTree></p:cSld>",
            "<p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" ",
            "accent2=\"accent2\" accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" ",
            "accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>",
            "<p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>",
            "<p:txStyles>",
            "<p:titleStyle><a:lvl1pPr algn=\"ctr\"><a:defRPr sz=\"3200\">",
            "<a:solidFill><a:schemeClr val=\"tx1\"/></a:solidFill>",
            "<a:latin typeface=\"+mj-lt\"/></a:defRPr></a:lvl1pPr></p:titleStyle>",
            "<p:bodyStyle><a:lvl1pPr><a:defRPr sz=\"2000\"/></a:lvl1pPr></p:bodyStyle>",
            "<p:otherStyle><a:lvl1pPr><a:defRPr sz=\"1800\"/></a:lvl1pPr></p:otherStyle>",
            "</p:txStyles></p:sldMaster>"
        ),
        decl = XML_DECL,
        ns = NS,
        group = group_header(),
        title = title_placeholder("<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang=\"en-US\"/></a:p></p:txBody>")
    )
}

fn slide_layout() -> String {
    format!(
        concat!(
            "{decl}<p:sldLayout {ns} type=\"titleOnly\" preserve=\"1\">",
            "<p:cSld name=\"Title Only\"><p:spTree>{group}{title}</p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"
        ),
        decl = XML_DECL,
        ns = NS,
        group = group_header(),
        title = title_placeholder("<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang=\"en-US\"/></a:p></p:txBody>")
    )
}

fn slide(title: &str, picture_height: u64) -> String {
    let title_body = format!(
        "<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang=\"en-US\" dirty=\"0\"/><a:t>{}</a:t></a:r></a:p></p:txBody>",
        escape(title)
    );
    format!(
        concat!(
            "{decl}<p:sld {ns}><p:cSld><p:spTree>{group}{title}",
            "<p:pic><p:nvPicPr><p:cNvPr id=\"3\" name=\"Picture 2\"/>",
            "<p:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>",
            "<p:blipFill><a:blip r:embed=\"rId2\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>",
            "<p:spPr><a:xfrm><a:off x=\"{x}\" y=\"{y}\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>",
            "<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr></p:pic>",
            "</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
        ),
        decl = XML_DECL,
        ns = NS,
        group = group_header(),
        title = title_placeholder(&title_body),
        x = PICTURE_LEFT,
        y = PICTURE_TOP,
        cx = PICTURE_WIDTH,
        cy = picture_height
    )
}

fn theme() -> String {
    let scheme = [
        ("dk1", "<a:sysClr val=\"windowText\" lastClr=\"000000\"/>"),
        ("lt1", "<a:sysClr val=\"window\" lastClr=\"FFFFFF\"/>"),
        ("dk2", "<a:srgbClr val=\"1F497D\"/>"),
        ("lt2", "<a:srgbClr val=\"EEECE1\"/>"),
        ("accent1", "<a:srgbClr val=\"4F81BD\"/>"),
        ("accent2", "<a:srgbClr val=\"C0504D\"/>"),
        ("accent3", "<a:srgbClr val=\"9BBB59\"/>"),
        ("accent4", "<a:srgbClr val=\"8064A2\"/>"),
        ("accent5", "<a:srgbClr val=\"4BACC6\"/>"),
        ("accent6", "<a:srgbClr val=\"F79646\"/>"),
        ("hlink", "<a:srgbClr val=\"0000FF\"/>"),
        ("folHlink", "<a:srgbClr val=\"800080\"/>"),
    ];
    let colors: String = scheme
        .iter()
        .map(|(name, clr)| format!("<a:{0}>{1}</a:{0}>", name, clr))
        .collect();

    let solid = "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>";
    let fills = solid.repeat(3);
    let lines: String = [9525, 25400, 38100]
        .iter()
        .map(|w| format!("<a:ln w=\"{}\">{}</a:ln>", w, solid))
        .collect();
    let effects = "<a:effectStyle><a:effectLst/></a:effectStyle>".repeat(3);

    format!(
        concat!(
            "{decl}<a:theme xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" name=\"Office Theme\">",
            "<a:themeElements>",
            "<a:clrScheme name=\"Office\">{colors}</a:clrScheme>",
            "<a:fontScheme name=\"Office\">",
            "<a:majorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>",
            "<a:minorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>",
            "</a:fontScheme>",
            "<a:fmtScheme name=\"Office\">",
            "<a:fillStyleLst>{fills}</a:fillStyleLst>",
            "<a:lnStyleLst>{lines}</a:lnStyleLst>",
            "<a:effectStyleLst>{effects}</a:effectStyleLst>",
            "<a:bgFillStyleLst>{fills}</a:bgFillStyleLst>",
            "</a:fmtScheme></a:themeElements>",
            "<a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"
        ),
        decl = XML_DECL,
        colors = colors,
        fills = fills,
        lines = lines,
        effects = effects
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_embeds_grouped_budget() {
        let budget = Budget::new(12500.0).unwrap();
        assert_eq!(slide_title(budget), "Creaming Curve with Budget $12,500");
    }

    #[test]
    fn slide_xml_escapes_title() {
        let xml = slide("R&D <core>", 100);
        assert!(xml.contains("R&amp;D &lt;core&gt;"));
        assert!(xml.contains("cy=\"100\""));
    }
}
