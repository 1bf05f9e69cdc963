/// Shape types for presentation slides.
///
/// Every visual element on a slide is a `Shape`. The closed set of kinds
/// distinguishes the cases the transform pipeline cares about: plain text
/// shapes, placeholders (which carry a stable role index inherited from the
/// layout), and pictures plus the other opaque kinds that pass through
/// untouched.
use crate::common::xml::attr;
use crate::error::Result;
use crate::pptx::shapes::textframe::TextFrame;
use memchr::memmem;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write as FmtWrite;

/// Shape kind enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// A plain text shape (p:sp without a placeholder role)
    Plain,
    /// A placeholder shape (p:sp carrying a p:ph role)
    Placeholder,
    /// A picture shape (p:pic)
    Picture,
    /// A graphic frame containing a table or chart (p:graphicFrame)
    GraphicFrame,
    /// A group shape (p:grpSp)
    Group,
    /// A connector shape (p:cxnSp)
    Connector,
    /// Unknown or unsupported shape kind
    Unknown,
}

/// Placeholder kind, from the `type` attribute of `<p:ph>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// Slide title
    Title,
    /// Centered title (title-slide layouts)
    CenteredTitle,
    /// Subtitle
    Subtitle,
    /// Body text
    Body,
    /// Date placeholder
    DateTime,
    /// Footer placeholder
    Footer,
    /// Slide number placeholder
    SlideNumber,
    /// Generic content/object placeholder
    Object,
    /// Picture placeholder
    Picture,
    /// Any other placeholder kind
    Other,
}

impl PlaceholderKind {
    /// Parse the `type` attribute value. A `<p:ph>` without a type
    /// attribute is a body placeholder by convention.
    pub fn from_code(code: &str) -> Self {
        match code {
            "title" => Self::Title,
            "ctrTitle" => Self::CenteredTitle,
            "subTitle" => Self::Subtitle,
            "body" => Self::Body,
            "dt" => Self::DateTime,
            "ftr" => Self::Footer,
            "sldNum" => Self::SlideNumber,
            "obj" => Self::Object,
            "pic" => Self::Picture,
            _ => Self::Other,
        }
    }

    /// The `type` attribute value to write back.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::CenteredTitle => "ctrTitle",
            Self::Subtitle => "subTitle",
            Self::Body => "body",
            Self::DateTime => "dt",
            Self::Footer => "ftr",
            Self::SlideNumber => "sldNum",
            Self::Object => "obj",
            Self::Picture => "pic",
            Self::Other => "body",
        }
    }

    /// Whether this kind names the slide title.
    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title | Self::CenteredTitle)
    }

    /// Whether placeholders of this kind belong to the slide chrome (date,
    /// footer, slide number) rather than its content.
    pub fn is_chrome(&self) -> bool {
        matches!(self, Self::DateTime | Self::Footer | Self::SlideNumber)
    }
}

/// A placeholder role: the stable integer-indexed slot a placeholder shape
/// fills, inherited from its layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderRole {
    /// Role index; 0 conventionally denotes the title role
    pub idx: u32,
    /// Placeholder kind
    pub kind: PlaceholderKind,
}

impl PlaceholderRole {
    /// Whether this role is the title role (by kind, or by the index-0
    /// convention).
    pub fn is_title(&self) -> bool {
        self.kind.is_title() || self.idx == 0
    }
}

/// A shape on a slide.
///
/// Holds the raw XML of the shape; text and placeholder data are parsed on
/// load, and edits re-serialize by splicing a regenerated `<p:txBody>` back
/// into the original markup so everything else survives byte-for-byte.
#[derive(Debug, Clone)]
pub struct Shape {
    /// Raw XML bytes for this shape
    raw: Vec<u8>,
    /// Shape kind
    kind: ShapeKind,
    /// Placeholder role, if this shape is a placeholder
    role: Option<PlaceholderRole>,
    /// Parsed text frame, if the shape carries one
    frame: Option<TextFrame>,
    /// Whether the text frame diverged from the raw XML
    dirty: bool,
}

impl Shape {
    /// Parse a shape from its raw XML and its element's local name.
    pub(crate) fn parse(local_name: &[u8], raw: Vec<u8>) -> Result<Self> {
        let kind = match local_name {
            b"sp" => ShapeKind::Plain,
            b"pic" => ShapeKind::Picture,
            b"graphicFrame" => ShapeKind::GraphicFrame,
            b"grpSp" => ShapeKind::Group,
            b"cxnSp" => ShapeKind::Connector,
            _ => ShapeKind::Unknown,
        };

        let (kind, role, frame) = if kind == ShapeKind::Plain {
            let role = parse_placeholder_role(&raw)?;
            let frame = TextFrame::from_shape_xml(&raw)?;
            let kind = if role.is_some() {
                ShapeKind::Placeholder
            } else {
                ShapeKind::Plain
            };
            (kind, role, frame)
        } else {
            (kind, None, None)
        };

        Ok(Self {
            raw,
            kind,
            role,
            frame,
            dirty: false,
        })
    }

    /// Build a fresh placeholder shape for a new slide, copying a layout
    /// placeholder's role and geometry with an empty text frame.
    pub(crate) fn from_layout_placeholder(
        shape_id: u32,
        role: PlaceholderRole,
        xfrm: Option<&[u8]>,
    ) -> Self {
        let mut xml = String::with_capacity(256);
        let name = match role.kind {
            PlaceholderKind::Title | PlaceholderKind::CenteredTitle => "Title",
            PlaceholderKind::Subtitle => "Subtitle",
            _ => "Content Placeholder",
        };
        let _ = write!(
            xml,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{} {}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="{}""#,
            shape_id,
            name,
            shape_id,
            role.kind.as_code(),
        );
        if role.idx != 0 {
            let _ = write!(xml, r#" idx="{}""#, role.idx);
        }
        xml.push_str("/></p:nvPr></p:nvSpPr><p:spPr>");
        if let Some(xfrm) = xfrm {
            xml.push_str(&String::from_utf8_lossy(xfrm));
        }
        xml.push_str("</p:spPr>");

        let frame = TextFrame::empty();
        xml.push_str(&frame.to_xml());
        xml.push_str("</p:sp>");

        Self {
            raw: xml.into_bytes(),
            kind: ShapeKind::Placeholder,
            role: Some(role),
            frame: Some(frame),
            dirty: true,
        }
    }

    /// Get the shape kind.
    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Check if this shape carries a text frame.
    pub fn has_text_frame(&self) -> bool {
        self.frame.is_some()
    }

    /// Get the placeholder role if this shape is a placeholder.
    pub fn as_placeholder(&self) -> Option<&PlaceholderRole> {
        self.role.as_ref()
    }

    /// Whether this shape holds the slide title.
    pub fn is_title(&self) -> bool {
        self.role.as_ref().is_some_and(|r| r.is_title())
    }

    /// Extract text content from this shape if it has any.
    pub fn text(&self) -> Option<String> {
        self.frame.as_ref().map(|f| f.text())
    }

    /// Replace the shape's text. Creates a text frame on a text-capable
    /// shape that had none; a no-op on pictures and other opaque kinds.
    pub fn set_text(&mut self, text: &str) {
        match self.kind {
            ShapeKind::Plain | ShapeKind::Placeholder => {
                let frame = self.frame.get_or_insert_with(TextFrame::empty);
                frame.set_text(text);
                self.dirty = true;
            },
            _ => {},
        }
    }

    /// Get the text frame for this shape.
    pub fn text_frame(&self) -> Option<&TextFrame> {
        self.frame.as_ref()
    }

    /// Get mutable access to the text frame; the shape re-serializes from
    /// the model afterwards.
    pub fn text_frame_mut(&mut self) -> Option<&mut TextFrame> {
        if self.frame.is_some() {
            self.dirty = true;
        }
        self.frame.as_mut()
    }

    /// Get raw XML bytes.
    #[inline]
    pub fn xml_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Whether this shape needs re-serialization.
    #[inline]
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Serialize the shape, splicing the regenerated text body into the
    /// original markup when the model diverged from it.
    pub(crate) fn to_xml(&self) -> Vec<u8> {
        if !self.dirty {
            return self.raw.clone();
        }
        let frame = match &self.frame {
            Some(f) => f,
            None => return self.raw.clone(),
        };
        let body = frame.to_xml();

        if let Some(start) = memmem::find(&self.raw, b"<p:txBody") {
            if let Some(end) = memmem::find(&self.raw[start..], b"</p:txBody>") {
                let end = start + end + b"</p:txBody>".len();
                let mut out = Vec::with_capacity(self.raw.len() + body.len());
                out.extend_from_slice(&self.raw[..start]);
                out.extend_from_slice(body.as_bytes());
                out.extend_from_slice(&self.raw[end..]);
                return out;
            }
        }

        // Shape had no text body; insert one before the closing tag.
        if let Some(close) = memmem::rfind(&self.raw, b"</p:sp>") {
            let mut out = Vec::with_capacity(self.raw.len() + body.len());
            out.extend_from_slice(&self.raw[..close]);
            out.extend_from_slice(body.as_bytes());
            out.extend_from_slice(&self.raw[close..]);
            return out;
        }

        self.raw.clone()
    }
}

/// Find the `<p:ph>` element inside a shape's non-visual properties.
pub(crate) fn parse_placeholder_role(xml: &[u8]) -> Result<Option<PlaceholderRole>> {
    let mut reader = Reader::from_reader(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"ph" {
                    // No type attribute means a body placeholder; no idx
                    // attribute means index 0.
                    let kind = attr(&e, b"type")
                        .map(|t| PlaceholderKind::from_code(&t))
                        .unwrap_or(PlaceholderKind::Body);
                    let idx = attr(&e, b"idx")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                    return Ok(Some(PlaceholderRole { idx, kind }));
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(crate::error::Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(None)
}
