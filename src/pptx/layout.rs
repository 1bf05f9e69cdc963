/// Slide layout objects.
///
/// A layout is a named visual template owned by a deck. It defines which
/// placeholder roles a slide built from it will carry, and where those
/// placeholders sit. The deck resolves its layout registry through the
/// first slide master's `sldLayoutIdLst`, preserving that order.
use crate::common::xml::{attr, child_elements};
use crate::error::{Error, Result};
use crate::opc::packuri::PackURI;
use crate::pptx::shapes::shape::{PlaceholderRole, parse_placeholder_role};
use memchr::memmem;
use quick_xml::Reader;
use quick_xml::events::Event;

/// A placeholder declared by a layout: its role plus the raw geometry
/// (`<a:xfrm>`) new slides copy.
#[derive(Debug, Clone)]
pub struct LayoutPlaceholder {
    /// The placeholder role
    pub role: PlaceholderRole,
    /// Raw `<a:xfrm>` element for this placeholder, when the layout
    /// positions it explicitly
    pub(crate) xfrm: Option<Vec<u8>>,
}

/// A slide layout.
#[derive(Debug)]
pub struct Layout {
    /// Partname of the layout part
    partname: PackURI,
    /// Layout name from `<p:cSld name="...">`
    name: String,
    /// Placeholder roles in document order
    placeholders: Vec<LayoutPlaceholder>,
}

impl Layout {
    /// Parse a layout from its part XML.
    pub(crate) fn parse(partname: PackURI, xml: &[u8]) -> Result<Self> {
        let name = parse_csld_name(xml)?;

        let mut placeholders = Vec::new();
        for child in child_elements(xml, b"spTree")? {
            if child.local_name() != b"sp" {
                continue;
            }
            let sp = &xml[child.start..child.end];
            if let Some(role) = parse_placeholder_role(sp)? {
                placeholders.push(LayoutPlaceholder {
                    role,
                    xfrm: extract_xfrm(sp),
                });
            }
        }

        Ok(Self {
            partname,
            name,
            placeholders,
        })
    }

    /// Partname of the layout part within the package.
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// The layout's name (e.g. "Title and Content").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placeholder roles in document order.
    pub fn placeholders(&self) -> &[LayoutPlaceholder] {
        &self.placeholders
    }

    /// Whether the layout exposes a title role.
    pub fn has_title_role(&self) -> bool {
        self.placeholders.iter().any(|ph| ph.role.is_title())
    }
}

/// Read the `name` attribute of `<p:cSld>`.
fn parse_csld_name(xml: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"cSld" {
                    return Ok(attr(&e, b"name").unwrap_or_default());
                }
            },
            Ok(Event::Eof) => return Ok(String::new()),
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }
}

/// Slice the `<a:xfrm>` element out of a shape's raw XML.
fn extract_xfrm(sp: &[u8]) -> Option<Vec<u8>> {
    let start = memmem::find(sp, b"<a:xfrm")?;
    let end = memmem::find(&sp[start..], b"</a:xfrm>")?;
    Some(sp[start..start + end + b"</a:xfrm>".len()].to_vec())
}

/// Parse the ordered relationship IDs out of a master's
/// `<p:sldLayoutIdLst>`.
pub(crate) fn layout_rids_from_master(xml: &[u8]) -> Result<Vec<String>> {
    ordered_rids(xml, b"sldLayoutIdLst", b"sldLayoutId")
}

/// Parse the ordered relationship IDs out of a presentation's
/// `<p:sldIdLst>` (slide order) or `<p:sldMasterIdLst>`.
pub(crate) fn ordered_rids(xml: &[u8], list_local: &[u8], entry_local: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut rids = Vec::new();
    let mut in_list = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let local = e.local_name();
                if local.as_ref() == list_local {
                    in_list = true;
                } else if in_list
                    && local.as_ref() == entry_local
                    && let Some(rid) = attr(&e, b"r:id")
                {
                    rids.push(rid);
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == list_local => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(rids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::shapes::shape::PlaceholderKind;

    const LAYOUT_XML: &[u8] = br#"<?xml version="1.0"?><p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="obj"><p:cSld name="Title and Content"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="274638"/><a:ext cx="8229600" cy="1143000"/></a:xfrm></p:spPr></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Content Placeholder 2"/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp><p:sp><p:nvSpPr><p:cNvPr id="4" name="Date Placeholder 3"/><p:nvPr><p:ph type="dt" sz="half" idx="10"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp></p:spTree></p:cSld></p:sldLayout>"#;

    #[test]
    fn test_parse_layout() {
        let partname = PackURI::new("/ppt/slideLayouts/slideLayout2.xml").unwrap();
        let layout = Layout::parse(partname, LAYOUT_XML).unwrap();
        assert_eq!(layout.name(), "Title and Content");
        assert_eq!(layout.placeholders().len(), 3);
        assert!(layout.has_title_role());

        let title = &layout.placeholders()[0];
        assert_eq!(title.role.kind, PlaceholderKind::Title);
        assert!(title.xfrm.is_some());

        let body = &layout.placeholders()[1];
        assert_eq!(body.role.idx, 1);
        assert_eq!(body.role.kind, PlaceholderKind::Body);
        assert!(body.xfrm.is_none());

        let date = &layout.placeholders()[2];
        assert!(date.role.kind.is_chrome());
    }

    #[test]
    fn test_ordered_rids() {
        let xml = br#"<p:sldMaster xmlns:p="p" xmlns:r="r"><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst></p:sldMaster>"#;
        let rids = layout_rids_from_master(xml).unwrap();
        assert_eq!(rids, vec!["rId1".to_string(), "rId2".to_string()]);
    }
}
