/// The deck: an in-memory presentation with its slides and layout registry.
///
/// A `Deck` owns the OPC package it was loaded from. Slides parse lazily
/// into models but keep their raw part bytes; serialization writes back
/// only what changed, appends any new slides (parts, relationships, and
/// `<p:sldIdLst>` entries), and leaves every untouched part byte-identical.
use crate::error::{Error, Result};
use crate::opc::constants::{content_type as ct, relationship_type as rt};
use crate::opc::packuri::PackURI;
use crate::opc::part::Part;
use crate::opc::{OpcPackage, PackageWriter};
use crate::pptx::layout::{Layout, layout_rids_from_master, ordered_rids};
use crate::pptx::slide::Slide;
use memchr::memmem;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write as FmtWrite;
use std::path::Path;
use tracing::debug;

/// A slide presentation.
///
/// # Examples
///
/// ```rust,no_run
/// use pitaya::pptx::Deck;
///
/// let mut deck = Deck::open("template.pptx")?;
/// println!("{} slides, {} layouts", deck.slide_count(), deck.layout_count());
///
/// let slide = deck.add_slide(1)?;
/// slide.set_title("Quarterly Review");
/// deck.save("out.pptx")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Deck {
    /// The underlying OPC package
    package: OpcPackage,
    /// Partname of the presentation part
    pres_partname: PackURI,
    /// Slides in presentation order
    slides: Vec<Slide>,
    /// Layout registry, in the first master's `sldLayoutIdLst` order
    layouts: Vec<Layout>,
    /// Next `<p:sldId>` id to hand out (they start at 256)
    next_slide_id: u32,
}

impl Deck {
    /// Open a deck from a `.pptx` file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::pptx::Package::open(path)?.deck()
    }

    /// Open a deck from an in-memory byte buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        crate::pptx::Package::from_reader(std::io::Cursor::new(bytes))?.deck()
    }

    /// Build the deck view over a validated package.
    pub(crate) fn from_package(package: OpcPackage) -> Result<Self> {
        let pres_part = package.main_document_part().map_err(Error::Opc)?;
        let pres_partname = pres_part.partname().clone();
        let pres_xml = pres_part.blob().to_vec();

        // Slides, in sldIdLst order.
        let mut slides = Vec::new();
        for rid in ordered_rids(&pres_xml, b"sldIdLst", b"sldId")? {
            let rel = pres_part.rels().get(&rid).ok_or_else(|| {
                Error::MalformedDeck(format!("presentation references unknown slide {}", rid))
            })?;
            let partname = rel.target_partname().map_err(Error::Opc)?;
            let part = package.get_part(&partname).map_err(Error::Opc)?;
            slides.push(Slide::parse(Some(partname), part.blob().to_vec())?);
        }

        // Layout registry from the first slide master, in sldLayoutIdLst
        // order. A deck without a master simply has no layouts to offer.
        let mut layouts = Vec::new();
        if let Some(master_rid) = ordered_rids(&pres_xml, b"sldMasterIdLst", b"sldMasterId")?
            .into_iter()
            .next()
        {
            let rel = pres_part.rels().get(&master_rid).ok_or_else(|| {
                Error::MalformedDeck(format!(
                    "presentation references unknown slide master {}",
                    master_rid
                ))
            })?;
            let master_partname = rel.target_partname().map_err(Error::Opc)?;
            let master_part = package.get_part(&master_partname).map_err(Error::Opc)?;

            for rid in layout_rids_from_master(master_part.blob())? {
                let layout_rel = master_part.rels().get(&rid).ok_or_else(|| {
                    Error::MalformedDeck(format!(
                        "slide master references unknown layout {}",
                        rid
                    ))
                })?;
                let layout_partname = layout_rel.target_partname().map_err(Error::Opc)?;
                let layout_part = package.get_part(&layout_partname).map_err(Error::Opc)?;
                layouts.push(Layout::parse(layout_partname, layout_part.blob())?);
            }
        }

        let next_slide_id = max_slide_id(&pres_xml).max(255) + 1;

        debug!(
            slides = slides.len(),
            layouts = layouts.len(),
            "deck loaded"
        );

        Ok(Self {
            package,
            pres_partname,
            slides,
            layouts,
            next_slide_id,
        })
    }

    /// Number of slides in the deck.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Mutable access to the slides.
    pub fn slides_mut(&mut self) -> &mut [Slide] {
        &mut self.slides
    }

    /// Number of layouts the deck offers.
    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// The layout registry, in master order.
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    /// Instantiate a new slide from the layout at `layout_index` and append
    /// it to the slide sequence.
    ///
    /// The new slide copies the layout's content placeholder roles as empty
    /// shapes. Existing slides are never reused or removed.
    pub fn add_slide(&mut self, layout_index: usize) -> Result<&mut Slide> {
        if self.layouts.is_empty() {
            return Err(Error::MalformedDeck(
                "deck has no slide layouts to instantiate from".to_string(),
            ));
        }
        let layout = self
            .layouts
            .get(layout_index)
            .ok_or(Error::LayoutOutOfRange {
                requested: layout_index,
                available: self.layouts.len(),
            })?;

        self.slides.push(Slide::new_from_layout(layout, layout_index));
        Ok(self.slides.last_mut().unwrap())
    }

    /// Serialize the deck back to `.pptx` bytes.
    ///
    /// Dirty slides are re-serialized in place; new slides become new parts
    /// wired into the presentation's relationship graph and slide-id list.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        // Rewrite existing slides whose model diverged from their bytes.
        for i in 0..self.slides.len() {
            if self.slides[i].is_new() || !self.slides[i].is_dirty() {
                continue;
            }
            let partname = match self.slides[i].partname() {
                Some(p) => p.clone(),
                None => continue,
            };
            let blob = self.slides[i].to_xml();
            self.package
                .get_part_mut(&partname)
                .map_err(Error::Opc)?
                .set_blob(blob.clone());
            self.slides[i] = Slide::parse(Some(partname), blob)?;
        }

        // Append new slides: part, layout relationship, presentation
        // relationship, and a sldIdLst entry each.
        let mut entries = String::new();
        for i in 0..self.slides.len() {
            if !self.slides[i].is_new() {
                continue;
            }

            let partname = self
                .package
                .next_partname("/ppt/slides/slide%d.xml")
                .map_err(Error::Opc)?;
            let blob = self.slides[i].to_xml();

            let layout_partname = self
                .slides[i]
                .layout_index()
                .and_then(|idx| self.layouts.get(idx))
                .map(|layout| layout.partname().clone())
                .ok_or_else(|| {
                    Error::MalformedDeck("new slide lost its layout binding".to_string())
                })?;

            let mut part = Part::new(partname.clone(), ct::PML_SLIDE.to_string(), blob.clone());
            part.relate_to(
                &layout_partname.relative_ref(partname.base_uri()),
                rt::SLIDE_LAYOUT,
            );
            self.package.add_part(part);

            let pres_part = self
                .package
                .get_part_mut(&self.pres_partname)
                .map_err(Error::Opc)?;
            let r_id = pres_part.relate_to(
                &partname.relative_ref(self.pres_partname.base_uri()),
                rt::SLIDE,
            );

            let _ = write!(
                entries,
                r#"<p:sldId id="{}" r:id="{}"/>"#,
                self.next_slide_id, r_id
            );
            self.next_slide_id += 1;

            self.slides[i] = Slide::parse(Some(partname), blob)?;
        }

        if !entries.is_empty() {
            let pres_part = self
                .package
                .get_part_mut(&self.pres_partname)
                .map_err(Error::Opc)?;
            let updated = splice_slide_id_entries(pres_part.blob(), &entries)?;
            pres_part.set_blob(updated);
        }

        PackageWriter::to_bytes(&self.package).map_err(Error::Opc)
    }

    /// Serialize the deck to a `.pptx` file.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Highest `<p:sldId>` id in the presentation part, or 0 when none.
fn max_slide_id(pres_xml: &[u8]) -> u32 {
    let mut reader = Reader::from_reader(pres_xml);
    let mut max = 0u32;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"sldId"
                    && let Some(id) = crate::common::xml::attr(&e, b"id")
                    && let Ok(id) = id.parse::<u32>()
                {
                    max = max.max(id);
                }
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {},
        }
    }

    max
}

/// Insert serialized `<p:sldId/>` entries into the presentation part,
/// creating the `<p:sldIdLst>` when the template had none.
fn splice_slide_id_entries(pres_xml: &[u8], entries: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(pres_xml.len() + entries.len() + 32);

    if let Some(pos) = memmem::find(pres_xml, b"</p:sldIdLst>") {
        out.extend_from_slice(&pres_xml[..pos]);
        out.extend_from_slice(entries.as_bytes());
        out.extend_from_slice(&pres_xml[pos..]);
        return Ok(out);
    }

    if let Some(pos) = memmem::find(pres_xml, b"<p:sldIdLst/>") {
        out.extend_from_slice(&pres_xml[..pos]);
        out.extend_from_slice(b"<p:sldIdLst>");
        out.extend_from_slice(entries.as_bytes());
        out.extend_from_slice(b"</p:sldIdLst>");
        out.extend_from_slice(&pres_xml[pos + b"<p:sldIdLst/>".len()..]);
        return Ok(out);
    }

    // No slide list yet: it belongs after the master list and before the
    // slide size declaration.
    let insert_at = memmem::find(pres_xml, b"</p:sldMasterIdLst>")
        .map(|pos| pos + b"</p:sldMasterIdLst>".len())
        .or_else(|| memmem::find(pres_xml, b"<p:sldSz"))
        .or_else(|| memmem::find(pres_xml, b"</p:presentation>"));

    match insert_at {
        Some(pos) => {
            out.extend_from_slice(&pres_xml[..pos]);
            out.extend_from_slice(b"<p:sldIdLst>");
            out.extend_from_slice(entries.as_bytes());
            out.extend_from_slice(b"</p:sldIdLst>");
            out.extend_from_slice(&pres_xml[pos..]);
            Ok(out)
        },
        None => Err(Error::MalformedDeck(
            "presentation part has no recognizable structure".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_slide_id() {
        let xml = br#"<p:presentation><p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="300" r:id="rId3"/></p:sldIdLst></p:presentation>"#;
        assert_eq!(max_slide_id(xml), 300);
        assert_eq!(max_slide_id(b"<p:presentation/>"), 0);
    }

    #[test]
    fn test_splice_into_existing_list() {
        let xml = br#"<p:presentation><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:sldSz cx="1" cy="1"/></p:presentation>"#;
        let out = splice_slide_id_entries(xml, r#"<p:sldId id="257" r:id="rId3"/>"#).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#"<p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>"#));
    }

    #[test]
    fn test_splice_creates_missing_list() {
        let xml = br#"<p:presentation><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldSz cx="1" cy="1"/></p:presentation>"#;
        let out = splice_slide_id_entries(xml, r#"<p:sldId id="256" r:id="rId2"/>"#).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#"</p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:sldSz"#));
    }

    #[test]
    fn test_splice_expands_self_closed_list() {
        let xml = br#"<p:presentation><p:sldIdLst/><p:sldSz cx="1" cy="1"/></p:presentation>"#;
        let out = splice_slide_id_entries(xml, r#"<p:sldId id="256" r:id="rId2"/>"#).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst>"#));
    }
}
