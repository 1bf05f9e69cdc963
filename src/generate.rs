//! Deck-from-scratch generation.
//!
//! Builds a brand-new deck from built-in minimal template parts instead of
//! a user-supplied file. The built-in master exposes two layouts — a title
//! slide at index 0 and title-and-content at index 1 — so placeholder
//! roles are known by construction: every generated slide has role 0
//! (title) and role 1 (body).
use crate::common::color::RGBColor;
use crate::error::{Error, Result};
use crate::opc::constants::{content_type as ct, relationship_type as rt};
use crate::opc::error::OpcError;
use crate::opc::packuri::PackURI;
use crate::opc::part::Part;
use crate::opc::OpcPackage;
use crate::pptx::{Deck, Package};
use crate::rewrite::{Outline, OutlineSlide};
use tracing::debug;

/// Index of the built-in title-and-content layout.
const CONTENT_LAYOUT: usize = 1;

/// Builder for generating a deck from content records.
///
/// # Examples
///
/// ```rust
/// use pitaya::generate::DeckBuilder;
/// use pitaya::rewrite::OutlineSlide;
/// use pitaya::common::RGBColor;
///
/// let mut deck = DeckBuilder::new()
///     .theme_color(RGBColor::new(0, 51, 102))
///     .build(&[OutlineSlide {
///         title: "Roadmap".to_string(),
///         content: vec!["Q1".to_string(), "Q2".to_string()],
///     }])?;
/// let bytes = deck.to_bytes()?;
/// # let _ = bytes;
/// # Ok::<(), pitaya::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct DeckBuilder {
    /// Color applied uniformly to every title
    theme_color: Option<RGBColor>,
}

impl DeckBuilder {
    /// Create a builder with no theme color.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a single RGB theme color to all titles.
    pub fn theme_color(mut self, color: RGBColor) -> Self {
        self.theme_color = Some(color);
        self
    }

    /// Build a deck with one slide per record, every record on the
    /// built-in title-and-content layout.
    pub fn build(self, records: &[OutlineSlide]) -> Result<Deck> {
        let mut deck = blank_deck()?;

        for record in records {
            let slide = deck.add_slide(CONTENT_LAYOUT)?;
            slide.set_title(&record.title);
            if let Some(body) = slide.body_shape_mut() {
                body.set_text(&record.content.join("\n"));
            }
            if let Some(color) = self.theme_color
                && let Some(title) = slide.title_shape_mut()
                && let Some(frame) = title.text_frame_mut()
            {
                for para in &mut frame.paragraphs {
                    for run in &mut para.runs {
                        run.color = Some(color);
                    }
                }
            }
        }

        debug!(slides = records.len(), "deck generated from records");
        Ok(deck)
    }

    /// Build a deck straight from a rewrite [`Outline`], honoring its
    /// optional `theme_rgb` unless the builder already set a color.
    pub fn build_from_outline(mut self, outline: &Outline) -> Result<Deck> {
        if self.theme_color.is_none() {
            self.theme_color = outline.theme_color();
        }
        self.build(&outline.slides)
    }
}

/// An empty deck over the built-in template parts.
pub fn blank_deck() -> Result<Deck> {
    Package::from_opc_unchecked(template_package()?).deck()
}

/// Assemble the built-in template package: presentation, one master, its
/// two layouts, theme, and document properties, fully wired.
fn template_package() -> Result<OpcPackage> {
    let mut package = OpcPackage::new();

    let mut pres = new_part(
        "/ppt/presentation.xml",
        ct::PML_PRESENTATION_MAIN,
        include_str!("pptx/resources/presentation.xml"),
    )?;
    pres.relate_to("slideMasters/slideMaster1.xml", rt::SLIDE_MASTER);
    package.add_part(pres);

    let mut master = new_part(
        "/ppt/slideMasters/slideMaster1.xml",
        ct::PML_SLIDE_MASTER,
        include_str!("pptx/resources/slideMaster1.xml"),
    )?;
    // rId order must match the master's sldLayoutIdLst.
    master.relate_to("../slideLayouts/slideLayout1.xml", rt::SLIDE_LAYOUT);
    master.relate_to("../slideLayouts/slideLayout2.xml", rt::SLIDE_LAYOUT);
    master.relate_to("../theme/theme1.xml", rt::THEME);
    package.add_part(master);

    let mut layout1 = new_part(
        "/ppt/slideLayouts/slideLayout1.xml",
        ct::PML_SLIDE_LAYOUT,
        include_str!("pptx/resources/slideLayout1.xml"),
    )?;
    layout1.relate_to("../slideMasters/slideMaster1.xml", rt::SLIDE_MASTER);
    package.add_part(layout1);

    let mut layout2 = new_part(
        "/ppt/slideLayouts/slideLayout2.xml",
        ct::PML_SLIDE_LAYOUT,
        include_str!("pptx/resources/slideLayout2.xml"),
    )?;
    layout2.relate_to("../slideMasters/slideMaster1.xml", rt::SLIDE_MASTER);
    package.add_part(layout2);

    package.add_part(new_part(
        "/ppt/theme/theme1.xml",
        ct::OFC_THEME,
        include_str!("pptx/resources/theme1.xml"),
    )?);
    package.add_part(new_part(
        "/docProps/core.xml",
        ct::OPC_CORE_PROPERTIES,
        include_str!("pptx/resources/core.xml"),
    )?);
    package.add_part(new_part(
        "/docProps/app.xml",
        ct::OFC_EXTENDED_PROPERTIES,
        include_str!("pptx/resources/app.xml"),
    )?);

    package
        .rels_mut()
        .get_or_add(rt::OFFICE_DOCUMENT, "ppt/presentation.xml");
    package
        .rels_mut()
        .get_or_add(rt::CORE_PROPERTIES, "docProps/core.xml");
    package
        .rels_mut()
        .get_or_add(rt::EXTENDED_PROPERTIES, "docProps/app.xml");

    Ok(package)
}

fn new_part(name: &str, content_type: &str, blob: &str) -> Result<Part> {
    let partname =
        PackURI::new(name).map_err(|e| Error::Opc(OpcError::InvalidPackUri(e)))?;
    Ok(Part::new(
        partname,
        content_type.to_string(),
        blob.as_bytes().to_vec(),
    ))
}

/// A deck whose master offers exactly one layout, holding nothing but a
/// title placeholder; exercises the layout-fallback and
/// missing-content-role recovery paths.
#[cfg(test)]
pub(crate) fn title_only_deck() -> Result<Deck> {
    const TITLE_ONLY_LAYOUT: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
        r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
        r#" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="titleOnly">"#,
        r#"<p:cSld name="Title Only"><p:spTree>"#,
        r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#,
        r#"<p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/>"#,
        r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#,
        r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
    );

    let mut package = OpcPackage::new();

    let mut pres = new_part(
        "/ppt/presentation.xml",
        ct::PML_PRESENTATION_MAIN,
        include_str!("pptx/resources/presentation.xml"),
    )?;
    pres.relate_to("slideMasters/slideMaster1.xml", rt::SLIDE_MASTER);
    package.add_part(pres);

    let master_xml = include_str!("pptx/resources/slideMaster1.xml")
        .replace(r#"<p:sldLayoutId id="2147483650" r:id="rId2"/>"#, "");
    let mut master = new_part(
        "/ppt/slideMasters/slideMaster1.xml",
        ct::PML_SLIDE_MASTER,
        &master_xml,
    )?;
    master.relate_to("../slideLayouts/slideLayout1.xml", rt::SLIDE_LAYOUT);
    package.add_part(master);

    let mut layout = new_part(
        "/ppt/slideLayouts/slideLayout1.xml",
        ct::PML_SLIDE_LAYOUT,
        TITLE_ONLY_LAYOUT,
    )?;
    layout.relate_to("../slideMasters/slideMaster1.xml", rt::SLIDE_MASTER);
    package.add_part(layout);

    package
        .rels_mut()
        .get_or_add(rt::OFFICE_DOCUMENT, "ppt/presentation.xml");

    Package::from_opc_unchecked(package).deck()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    #[test]
    fn test_blank_deck_shape() {
        let deck = blank_deck().unwrap();
        assert_eq!(deck.slide_count(), 0);
        assert_eq!(deck.layout_count(), 2);
        assert_eq!(deck.layouts()[0].name(), "Title Slide");
        assert_eq!(deck.layouts()[1].name(), "Title and Content");
    }

    #[test]
    fn test_build_round_trips_through_container() {
        let records = vec![
            OutlineSlide {
                title: "A".to_string(),
                content: vec!["x".to_string(), "y".to_string()],
            },
            OutlineSlide {
                title: "B".to_string(),
                content: vec!["z".to_string()],
            },
        ];
        let mut deck = DeckBuilder::new().build(&records).unwrap();
        let bytes = deck.to_bytes().unwrap();

        let reopened = Deck::from_bytes(&bytes).unwrap();
        assert_eq!(reopened.slide_count(), 2);
        let extracted = extract(&reopened);
        assert_eq!(extracted[0].title, "A");
        assert_eq!(extracted[0].body, "x\ny");
        assert_eq!(extracted[1].title, "B");
        assert_eq!(extracted[1].body, "z");
    }

    #[test]
    fn test_theme_color_applies_to_all_titles() {
        let records = vec![
            OutlineSlide {
                title: "One".to_string(),
                content: vec![],
            },
            OutlineSlide {
                title: "Two".to_string(),
                content: vec![],
            },
        ];
        let navy = RGBColor::new(0, 51, 102);
        let mut deck = DeckBuilder::new().theme_color(navy).build(&records).unwrap();

        let bytes = deck.to_bytes().unwrap();
        let reopened = Deck::from_bytes(&bytes).unwrap();
        for slide in reopened.slides() {
            let title = slide.title_shape().unwrap();
            let run = &title.text_frame().unwrap().paragraphs[0].runs[0];
            assert_eq!(run.color, Some(navy));
        }
    }

    #[test]
    fn test_save_and_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pptx");

        let mut deck = DeckBuilder::new()
            .build(&[OutlineSlide {
                title: "Disk".to_string(),
                content: vec!["round trip".to_string()],
            }])
            .unwrap();
        deck.save(&path).unwrap();

        let reopened = Deck::open(&path).unwrap();
        assert_eq!(reopened.slide_count(), 1);
        assert_eq!(reopened.slides()[0].title().as_deref(), Some("Disk"));
    }

    #[test]
    fn test_build_from_outline_uses_theme_rgb() {
        let outline = Outline {
            slides: vec![OutlineSlide {
                title: "Themed".to_string(),
                content: vec!["point".to_string()],
            }],
            theme_rgb: Some([255, 0, 0]),
        };
        let deck = DeckBuilder::new().build_from_outline(&outline).unwrap();
        let title = deck.slides()[0].title_shape().unwrap();
        let run = &title.text_frame().unwrap().paragraphs[0].runs[0];
        assert_eq!(run.color, Some(RGBColor::new(255, 0, 0)));
    }
}
