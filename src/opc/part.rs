/// Open Packaging Convention (OPC) objects related to package parts.
///
/// Parts are the fundamental units of content in an OPC package. Each part
/// has a unique partname, a content type, blob content, and may have
/// relationships to other parts. Every part in a presentation package is
/// held as a blob; the deck layer interprets the XML it cares about.
use crate::opc::packuri::PackURI;
use crate::opc::rel::Relationships;

/// A part in an OPC package.
#[derive(Debug)]
pub struct Part {
    /// The partname (URI) of this part
    partname: PackURI,

    /// The content type of this part
    content_type: String,

    /// The binary content of this part
    blob: Vec<u8>,

    /// Relationships from this part to other parts
    rels: Relationships,
}

impl Part {
    /// Create a new part.
    pub fn new(partname: PackURI, content_type: String, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            blob,
            rels,
        }
    }

    /// Get the partname of this part.
    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// Get the content type of this part.
    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Get the binary content of this part.
    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Replace the binary content of this part.
    pub fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = blob;
    }

    /// Get the relationships for this part.
    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    /// Get mutable access to the relationships for this part.
    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Replace the relationships collection wholesale (used while loading).
    pub(crate) fn set_rels(&mut self, rels: Relationships) {
        self.rels = rels;
    }

    /// Add or get a relationship to another part, returning its rId.
    pub fn relate_to(&mut self, target_ref: &str, reltype: &str) -> String {
        let rel = self.rels.get_or_add(reltype, target_ref);
        rel.r_id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_basics() {
        let partname = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        let mut part = Part::new(partname, "application/xml".to_string(), b"<x/>".to_vec());
        assert_eq!(part.partname().as_str(), "/ppt/slides/slide1.xml");
        assert_eq!(part.blob(), b"<x/>");
        assert!(part.rels().is_empty());

        let r_id = part.relate_to("../slideLayouts/slideLayout1.xml", "type/slideLayout");
        assert_eq!(r_id, "rId1");
        assert_eq!(
            part.rels().get("rId1").unwrap().target_partname().unwrap().as_str(),
            "/ppt/slideLayouts/slideLayout1.xml"
        );
    }
}
