/// Slide objects: the mutable in-memory view of a slide part.
///
/// A slide loaded from a package keeps its raw part XML; shape edits
/// re-serialize by splicing regenerated elements back into the original
/// bytes, so an untouched slide round-trips byte-identical and touched
/// slides keep everything the model does not cover. Slides created from a
/// layout generate their part XML from scratch.
use crate::common::color::RGBColor;
use crate::common::xml::child_elements;
use crate::error::Result;
use crate::opc::packuri::PackURI;
use crate::pptx::layout::Layout;
use crate::pptx::shapes::shape::Shape;
use memchr::memmem;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write as FmtWrite;

/// A slide in a deck.
#[derive(Debug)]
pub struct Slide {
    /// Partname within the package; None until a new slide is serialized
    partname: Option<PackURI>,
    /// Raw slide part XML (empty for new slides)
    raw: Vec<u8>,
    /// Shapes in document order
    shapes: Vec<Shape>,
    /// Byte spans of each shape within `raw` (parallel to `shapes`;
    /// empty for new slides)
    spans: Vec<(usize, usize)>,
    /// Pending background override (solid fill)
    background: Option<RGBColor>,
    /// Index of the layout this slide was instantiated from (new slides)
    layout_index: Option<usize>,
    /// Whether this slide was created in memory rather than loaded
    is_new: bool,
}

impl Slide {
    /// Parse a slide from its part XML.
    pub(crate) fn parse(partname: Option<PackURI>, xml: Vec<u8>) -> Result<Self> {
        let mut shapes = Vec::new();
        let mut spans = Vec::new();

        for child in child_elements(&xml, b"spTree")? {
            match child.local_name() {
                local @ (b"sp" | b"pic" | b"graphicFrame" | b"grpSp" | b"cxnSp") => {
                    let shape = Shape::parse(local, xml[child.start..child.end].to_vec())?;
                    shapes.push(shape);
                    spans.push((child.start, child.end));
                },
                _ => {},
            }
        }

        Ok(Self {
            partname,
            raw: xml,
            shapes,
            spans,
            background: None,
            layout_index: None,
            is_new: false,
        })
    }

    /// Create a new slide from a layout, copying the layout's content
    /// placeholder roles as empty shapes (chrome placeholders — date,
    /// footer, slide number — are not carried over).
    pub(crate) fn new_from_layout(layout: &Layout, layout_index: usize) -> Self {
        let mut shapes = Vec::new();
        // IDs: 1 = the shape-tree group, content shapes start at 2.
        let mut shape_id = 2u32;
        for ph in layout.placeholders() {
            if ph.role.kind.is_chrome() {
                continue;
            }
            shapes.push(Shape::from_layout_placeholder(
                shape_id,
                ph.role,
                ph.xfrm.as_deref(),
            ));
            shape_id += 1;
        }

        Self {
            partname: None,
            raw: Vec::new(),
            shapes,
            spans: Vec::new(),
            background: None,
            layout_index: Some(layout_index),
            is_new: true,
        }
    }

    /// Partname of this slide within the package, if assigned.
    pub fn partname(&self) -> Option<&PackURI> {
        self.partname.as_ref()
    }

    /// Get all shapes on this slide.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Get mutable access to the shapes on this slide.
    pub fn shapes_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }

    /// The shape holding the title role, if present.
    pub fn title_shape(&self) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.is_title())
    }

    /// Mutable access to the title shape, if present.
    pub fn title_shape_mut(&mut self) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.is_title())
    }

    /// The title text, if a text-bearing title shape exists.
    pub fn title(&self) -> Option<String> {
        self.title_shape().and_then(|s| s.text())
    }

    /// Set the title text. Returns false when the slide exposes no title
    /// role (the caller decides whether that is worth reporting).
    pub fn set_title(&mut self, text: &str) -> bool {
        match self.title_shape_mut() {
            Some(shape) => {
                shape.set_text(text);
                true
            },
            None => false,
        }
    }

    /// Locate the body placeholder: role index 1 when present, otherwise
    /// the first non-title, non-chrome placeholder in shape order.
    ///
    /// Role indices are a convention of the format, not a contract — a
    /// hand-authored template may number its content placeholder anything.
    pub fn body_shape_mut(&mut self) -> Option<&mut Shape> {
        let by_idx = self.shapes.iter().position(|s| {
            s.as_placeholder()
                .is_some_and(|r| r.idx == 1 && !r.is_title())
        });
        let pos = by_idx.or_else(|| {
            self.shapes.iter().position(|s| {
                s.as_placeholder()
                    .is_some_and(|r| !r.is_title() && !r.kind.is_chrome())
            })
        })?;
        self.shapes.get_mut(pos)
    }

    /// All text on the slide: text-bearing shapes joined with newlines, in
    /// shape order.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for shape in &self.shapes {
            if let Some(t) = shape.text() {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&t);
            }
        }
        text
    }

    /// Set a solid background color on this slide.
    pub fn set_background(&mut self, color: RGBColor) {
        self.background = Some(color);
    }

    /// The slide's solid background color: a pending override if one was
    /// set, else whatever the part XML declares.
    pub fn background(&self) -> Option<RGBColor> {
        self.background.or_else(|| parse_solid_background(&self.raw))
    }

    /// Index of the layout this slide was created from (new slides only).
    pub(crate) fn layout_index(&self) -> Option<usize> {
        self.layout_index
    }

    /// Whether this slide was created in memory this session.
    pub(crate) fn is_new(&self) -> bool {
        self.is_new
    }

    /// Whether this slide needs re-serialization.
    pub(crate) fn is_dirty(&self) -> bool {
        self.is_new || self.background.is_some() || self.shapes.iter().any(|s| s.is_dirty())
    }

    /// Bind the slide to its partname once the deck assigns one.
    pub(crate) fn set_partname(&mut self, partname: PackURI) {
        self.partname = Some(partname);
    }

    /// Serialize the slide part XML.
    pub(crate) fn to_xml(&self) -> Vec<u8> {
        let mut xml = if self.is_new {
            self.generate_xml()
        } else {
            self.splice_shapes()
        };
        if let Some(color) = self.background {
            xml = splice_background(xml, color);
        }
        xml
    }

    /// Rebuild the part bytes, replacing only the spans of dirty shapes.
    fn splice_shapes(&self) -> Vec<u8> {
        if !self.shapes.iter().any(|s| s.is_dirty()) {
            return self.raw.clone();
        }

        let mut out = Vec::with_capacity(self.raw.len() + 512);
        let mut cursor = 0usize;
        for (shape, &(start, end)) in self.shapes.iter().zip(&self.spans) {
            out.extend_from_slice(&self.raw[cursor..start]);
            out.extend_from_slice(&shape.to_xml());
            cursor = end;
        }
        out.extend_from_slice(&self.raw[cursor..]);
        out
    }

    /// Generate a complete slide part for an in-memory slide.
    fn generate_xml(&self) -> Vec<u8> {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(concat!(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
            r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
            r#" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
        ));
        xml.push_str("<p:cSld><p:spTree>");
        xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
        xml.push_str(concat!(
            "<p:grpSpPr><a:xfrm>",
            r#"<a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
            r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/>"#,
            "</a:xfrm></p:grpSpPr>",
        ));
        for shape in &self.shapes {
            xml.push_str(&String::from_utf8_lossy(&shape.to_xml()));
        }
        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        xml.into_bytes()
    }
}

/// XML for a solid-fill slide background.
fn background_xml(color: RGBColor) -> String {
    let mut xml = String::with_capacity(128);
    let _ = write!(
        xml,
        r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
        color.to_hex()
    );
    xml
}

/// Replace an existing `<p:bg>` element, or insert one as the first child
/// of `<p:cSld>` (where the schema requires it).
fn splice_background(xml: Vec<u8>, color: RGBColor) -> Vec<u8> {
    let bg = background_xml(color);

    if let Some(start) = memmem::find(&xml, b"<p:bg>").or_else(|| memmem::find(&xml, b"<p:bg ")) {
        if let Some(end) = memmem::find(&xml[start..], b"</p:bg>") {
            let end = start + end + b"</p:bg>".len();
            let mut out = Vec::with_capacity(xml.len() + bg.len());
            out.extend_from_slice(&xml[..start]);
            out.extend_from_slice(bg.as_bytes());
            out.extend_from_slice(&xml[end..]);
            return out;
        }
    }

    if let Some(open) = memmem::find(&xml, b"<p:cSld") {
        if let Some(close) = xml[open..].iter().position(|&b| b == b'>') {
            let insert_at = open + close + 1;
            let mut out = Vec::with_capacity(xml.len() + bg.len());
            out.extend_from_slice(&xml[..insert_at]);
            out.extend_from_slice(bg.as_bytes());
            out.extend_from_slice(&xml[insert_at..]);
            return out;
        }
    }

    xml
}

/// Read the solid background color out of slide XML, if one is declared.
fn parse_solid_background(xml: &[u8]) -> Option<RGBColor> {
    let mut reader = Reader::from_reader(xml);
    let mut in_bg = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"bg" => in_bg = true,
                b"srgbClr" if in_bg => {
                    return crate::common::xml::attr(&e, b"val")
                        .and_then(|v| RGBColor::from_hex(&v));
                },
                _ => {},
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"bg" => in_bg = false,
            Ok(Event::Eof) | Err(_) => break,
            _ => {},
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE_XML: &[u8] = br#"<?xml version="1.0"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>Intro</a:t></a:r></a:p></p:txBody></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Content 2"/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>Point A</a:t></a:r></a:p><a:p><a:r><a:rPr lang="en-US"/><a:t>Point B</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;

    fn slide() -> Slide {
        Slide::parse(None, SLIDE_XML.to_vec()).unwrap()
    }

    #[test]
    fn test_parse_shapes() {
        let slide = slide();
        assert_eq!(slide.shapes().len(), 2);
        assert_eq!(slide.title().as_deref(), Some("Intro"));
        assert_eq!(slide.text(), "Intro\nPoint A\nPoint B");
    }

    #[test]
    fn test_untouched_slide_round_trips_bytes() {
        let slide = slide();
        assert!(!slide.is_dirty());
        assert_eq!(slide.to_xml(), SLIDE_XML.to_vec());
    }

    #[test]
    fn test_set_title_splices() {
        let mut slide = slide();
        assert!(slide.set_title("Outro"));
        let xml = slide.to_xml();
        let reparsed = Slide::parse(None, xml).unwrap();
        assert_eq!(reparsed.title().as_deref(), Some("Outro"));
        // The other shape is untouched.
        assert_eq!(
            reparsed.shapes()[1].text().as_deref(),
            Some("Point A\nPoint B")
        );
    }

    #[test]
    fn test_body_shape_prefers_idx_1() {
        let mut slide = slide();
        let body = slide.body_shape_mut().unwrap();
        assert_eq!(body.as_placeholder().unwrap().idx, 1);
    }

    #[test]
    fn test_background_splice_and_parse() {
        let mut slide = slide();
        slide.set_background(RGBColor::new(255, 255, 255));
        let xml = slide.to_xml();
        let reparsed = Slide::parse(None, xml).unwrap();
        assert_eq!(reparsed.background(), Some(RGBColor::new(255, 255, 255)));
    }

    #[test]
    fn test_background_splice_is_stable() {
        let mut slide = slide();
        slide.set_background(RGBColor::new(30, 30, 46));
        let once = slide.to_xml();

        let mut again = Slide::parse(None, once.clone()).unwrap();
        again.set_background(RGBColor::new(30, 30, 46));
        assert_eq!(again.to_xml(), once);
    }
}
