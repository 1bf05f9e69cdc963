/// Text frame for accessing and rewriting text content in shapes.
///
/// A text frame models the `<p:txBody>` element of a shape: an ordered
/// sequence of paragraphs, each an ordered sequence of runs. Parsing keeps
/// the attributes the style engine works with (color, font, bold, italic,
/// size, paragraph alignment); regeneration rebuilds the whole `txBody`
/// from the model.
use crate::common::color::RGBColor;
use crate::common::xml::{attr, escape_xml};
use crate::error::{Error, Result};
use crate::style::Alignment;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write as FmtWrite;

/// A run of text sharing one set of character properties.
///
/// A run whose text is exactly `"\n"` stands for a line break (`<a:br/>`)
/// and round-trips back to one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    /// Text content
    pub text: String,
    /// Font color
    pub color: Option<RGBColor>,
    /// Font family name (latin typeface)
    pub font: Option<String>,
    /// Bold flag
    pub bold: Option<bool>,
    /// Italic flag
    pub italic: Option<bool>,
    /// Font size in hundredths of a point (e.g. 3200 = 32pt)
    pub size: Option<u32>,
}

impl Run {
    /// Create a plain run with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Whether this run stands for a `<a:br/>` line break.
    pub fn is_break(&self) -> bool {
        self.text == "\n"
    }
}

/// A paragraph in a text frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Paragraph alignment (a paragraph-level attribute, not a run one)
    pub alignment: Option<Alignment>,
    /// Runs in document order
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Extract all text from this paragraph.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for run in &self.runs {
            text.push_str(&run.text);
        }
        text
    }
}

/// A text frame containing paragraphs of runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFrame {
    /// Paragraphs in document order
    pub paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    /// Create an empty text frame (a single empty paragraph).
    pub fn empty() -> Self {
        Self {
            paragraphs: vec![Paragraph::default()],
        }
    }

    /// Parse the `<p:txBody>` inside a shape's XML.
    ///
    /// Returns `None` when the shape carries no text body.
    pub(crate) fn from_shape_xml(xml: &[u8]) -> Result<Option<Self>> {
        let mut reader = Reader::from_reader(xml);

        let mut frame: Option<TextFrame> = None;
        let mut in_body = false;
        let mut in_run = false;
        let mut in_rpr = false;
        let mut in_fill = false;
        let mut in_text = false;
        let mut current_run = Run::default();

        // Pulls the character properties off an `<a:rPr>` start or empty tag.
        let read_rpr_attrs = |e: &quick_xml::events::BytesStart<'_>, run: &mut Run| {
            if let Some(v) = attr(e, b"b") {
                run.bold = Some(v == "1" || v == "true");
            }
            if let Some(v) = attr(e, b"i") {
                run.italic = Some(v == "1" || v == "true");
            }
            if let Some(v) = attr(e, b"sz") {
                run.size = v.parse().ok();
            }
        };

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"txBody" => {
                        in_body = true;
                        frame = Some(TextFrame::default());
                    },
                    b"p" if in_body => {
                        if let Some(f) = frame.as_mut() {
                            f.paragraphs.push(Paragraph::default());
                        }
                    },
                    b"pPr" if in_body => {
                        if let Some(para) = frame.as_mut().and_then(|f| f.paragraphs.last_mut())
                            && let Some(code) = attr(&e, b"algn")
                        {
                            para.alignment = Alignment::from_code(&code);
                        }
                    },
                    b"r" if in_body => {
                        in_run = true;
                        current_run = Run::default();
                    },
                    b"rPr" if in_run => {
                        in_rpr = true;
                        read_rpr_attrs(&e, &mut current_run);
                    },
                    b"solidFill" if in_rpr => {
                        in_fill = true;
                    },
                    b"srgbClr" if in_fill => {
                        if let Some(v) = attr(&e, b"val") {
                            current_run.color = RGBColor::from_hex(&v);
                        }
                    },
                    b"latin" if in_rpr => {
                        current_run.font = attr(&e, b"typeface");
                    },
                    b"t" if in_run => {
                        in_text = true;
                    },
                    _ => {},
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"pPr" if in_body => {
                        if let Some(para) = frame.as_mut().and_then(|f| f.paragraphs.last_mut())
                            && let Some(code) = attr(&e, b"algn")
                        {
                            para.alignment = Alignment::from_code(&code);
                        }
                    },
                    b"br" if in_body => {
                        if let Some(para) = frame.as_mut().and_then(|f| f.paragraphs.last_mut()) {
                            para.runs.push(Run::new("\n"));
                        }
                    },
                    b"rPr" if in_run => {
                        read_rpr_attrs(&e, &mut current_run);
                    },
                    b"srgbClr" if in_fill => {
                        if let Some(v) = attr(&e, b"val") {
                            current_run.color = RGBColor::from_hex(&v);
                        }
                    },
                    b"latin" if in_rpr => {
                        current_run.font = attr(&e, b"typeface");
                    },
                    _ => {},
                },
                Ok(Event::Text(e)) if in_text => {
                    let raw = std::str::from_utf8(e.as_ref())
                        .map_err(|e| Error::Xml(e.to_string()))?;
                    let unescaped = quick_xml::escape::unescape(raw)
                        .map_err(|e| Error::Xml(e.to_string()))?;
                    current_run.text.push_str(&unescaped);
                },
                // Entity references in run text arrive as their own events.
                Ok(Event::GeneralRef(e)) if in_text => {
                    if let Some(ch) = e
                        .resolve_char_ref()
                        .map_err(|e| Error::Xml(e.to_string()))?
                    {
                        current_run.text.push(ch);
                    } else {
                        let name = std::str::from_utf8(e.as_ref())
                            .map_err(|e| Error::Xml(e.to_string()))?;
                        if let Some(resolved) =
                            quick_xml::escape::resolve_predefined_entity(name)
                        {
                            current_run.text.push_str(resolved);
                        }
                    }
                },
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"txBody" => break,
                    b"t" => in_text = false,
                    b"rPr" => in_rpr = false,
                    b"solidFill" => in_fill = false,
                    b"r" if in_run => {
                        in_run = false;
                        if let Some(para) = frame.as_mut().and_then(|f| f.paragraphs.last_mut()) {
                            para.runs.push(std::mem::take(&mut current_run));
                        }
                    },
                    _ => {},
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e.to_string())),
                _ => {},
            }
        }

        Ok(frame)
    }

    /// Extract all text: runs concatenated within a paragraph, paragraphs
    /// joined with newlines.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for (i, para) in self.paragraphs.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(&para.text());
        }
        text
    }

    /// Replace the entire content with plain text.
    ///
    /// Each line becomes its own paragraph holding a single run; existing
    /// run properties are discarded (the style engine reapplies them).
    pub fn set_text(&mut self, text: &str) {
        self.paragraphs = text
            .split('\n')
            .map(|line| Paragraph {
                alignment: None,
                runs: if line.is_empty() {
                    Vec::new()
                } else {
                    vec![Run::new(line)]
                },
            })
            .collect();
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::default());
        }
    }

    /// Generate the `<p:txBody>` XML for this frame.
    pub(crate) fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256);
        xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");

        for para in &self.paragraphs {
            xml.push_str("<a:p>");
            if let Some(align) = para.alignment {
                let _ = write!(xml, r#"<a:pPr algn="{}"/>"#, align.as_code());
            }
            for run in &para.runs {
                if run.is_break() {
                    xml.push_str("<a:br/>");
                    continue;
                }
                xml.push_str("<a:r>");
                xml.push_str(r#"<a:rPr lang="en-US""#);
                if let Some(b) = run.bold {
                    let _ = write!(xml, r#" b="{}""#, if b { "1" } else { "0" });
                }
                if let Some(i) = run.italic {
                    let _ = write!(xml, r#" i="{}""#, if i { "1" } else { "0" });
                }
                if let Some(sz) = run.size {
                    let _ = write!(xml, r#" sz="{}""#, sz);
                }
                xml.push_str(r#" dirty="0""#);
                if run.color.is_none() && run.font.is_none() {
                    xml.push_str("/>");
                } else {
                    xml.push('>');
                    if let Some(color) = run.color {
                        let _ = write!(
                            xml,
                            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
                            color.to_hex()
                        );
                    }
                    if let Some(ref font) = run.font {
                        let _ = write!(xml, r#"<a:latin typeface="{}"/>"#, escape_xml(font));
                    }
                    xml.push_str("</a:rPr>");
                }
                let _ = write!(xml, "<a:t>{}</a:t>", escape_xml(&run.text));
                xml.push_str("</a:r>");
            }
            if para.runs.is_empty() {
                xml.push_str(r#"<a:endParaRPr lang="en-US"/>"#);
            }
            xml.push_str("</a:p>");
        }

        xml.push_str("</p:txBody>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SP_XML: &[u8] = br#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/></p:nvSpPr>
<p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>
<a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" b="1" sz="3200"><a:solidFill><a:srgbClr val="003366"/></a:solidFill><a:latin typeface="Calibri"/></a:rPr><a:t>Hello &amp; welcome</a:t></a:r></a:p>
<a:p><a:r><a:rPr lang="en-US"/><a:t>Line one</a:t></a:r><a:br/><a:r><a:rPr lang="en-US"/><a:t>Line two</a:t></a:r></a:p>
</p:txBody></p:sp>"#;

    #[test]
    fn test_parse_runs_and_attributes() {
        let frame = TextFrame::from_shape_xml(SP_XML).unwrap().unwrap();
        assert_eq!(frame.paragraphs.len(), 2);

        let title = &frame.paragraphs[0];
        assert_eq!(title.alignment, Some(Alignment::Center));
        assert_eq!(title.runs.len(), 1);
        assert_eq!(title.runs[0].text, "Hello & welcome");
        assert_eq!(title.runs[0].bold, Some(true));
        assert_eq!(title.runs[0].size, Some(3200));
        assert_eq!(title.runs[0].color, Some(RGBColor::new(0, 51, 102)));
        assert_eq!(title.runs[0].font.as_deref(), Some("Calibri"));
    }

    #[test]
    fn test_break_becomes_newline() {
        let frame = TextFrame::from_shape_xml(SP_XML).unwrap().unwrap();
        assert_eq!(frame.paragraphs[1].text(), "Line one\nLine two");
        assert_eq!(frame.text(), "Hello & welcome\nLine one\nLine two");
    }

    #[test]
    fn test_no_txbody_yields_none() {
        let xml = br#"<p:pic><p:nvPicPr/></p:pic>"#;
        assert!(TextFrame::from_shape_xml(xml).unwrap().is_none());
    }

    #[test]
    fn test_set_text_splits_paragraphs() {
        let mut frame = TextFrame::empty();
        frame.set_text("Point A\nPoint B");
        assert_eq!(frame.paragraphs.len(), 2);
        assert_eq!(frame.text(), "Point A\nPoint B");
    }

    #[test]
    fn test_to_xml_round_trips() {
        let mut frame = TextFrame::empty();
        frame.set_text("Alpha & Beta\nGamma");
        frame.paragraphs[0].alignment = Some(Alignment::Left);
        frame.paragraphs[0].runs[0].bold = Some(true);
        frame.paragraphs[0].runs[0].color = Some(RGBColor::new(255, 255, 255));
        frame.paragraphs[0].runs[0].font = Some("Calibri".to_string());

        let xml = format!("<p:sp>{}</p:sp>", frame.to_xml());
        let reparsed = TextFrame::from_shape_xml(xml.as_bytes()).unwrap().unwrap();
        assert_eq!(reparsed, frame);
    }

    #[test]
    fn test_empty_paragraph_round_trips() {
        let mut frame = TextFrame::empty();
        frame.set_text("a\n\nb");
        let xml = format!("<p:sp>{}</p:sp>", frame.to_xml());
        let reparsed = TextFrame::from_shape_xml(xml.as_bytes()).unwrap().unwrap();
        assert_eq!(reparsed.text(), "a\n\nb");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// set_text followed by XML regeneration and reparse never
            /// loses or reorders text, including XML-special characters.
            #[test]
            fn prop_text_round_trips(
                lines in proptest::collection::vec("[a-zA-Z0-9 &<>\"']{0,24}", 1..5)
            ) {
                let text = lines.join("\n");
                let mut frame = TextFrame::empty();
                frame.set_text(&text);
                prop_assert_eq!(frame.text(), text.clone());

                let xml = format!("<p:sp>{}</p:sp>", frame.to_xml());
                let reparsed = TextFrame::from_shape_xml(xml.as_bytes()).unwrap().unwrap();
                prop_assert_eq!(reparsed.text(), text);
            }
        }
    }
}
