/// Relationship-related objects for OPC packages.
///
/// Relationships tie a source (the package or a part) to target parts or
/// external URLs, keyed by rId. They are stored in `.rels` sibling parts.
use crate::common::xml::{attr, escape_xml};
use crate::opc::constants::namespace;
use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a part URI or external URL
    target_ref: String,

    /// Base URI for resolving relative references
    base_uri: String,

    /// Whether this is an external relationship
    is_external: bool,
}

impl Relationship {
    /// Create a new relationship.
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            base_uri,
            is_external,
        }
    }

    /// Get the relationship ID.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the relationship type.
    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Get the target reference.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Get the absolute target partname for internal relationships.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(
                "Cannot get target_partname for external relationship".to_string(),
            ));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Collection of relationships from a single source.
#[derive(Debug)]
pub struct Relationships {
    /// Base URI for resolving relative references
    base_uri: String,

    /// Map of relationship ID to Relationship
    rels: HashMap<String, Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: HashMap::new(),
        }
    }

    /// Parse a `.rels` part into a relationships collection.
    pub fn from_xml(base_uri: String, xml: &[u8]) -> Result<Self> {
        let mut rels = Self::new(base_uri);
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let r_id = attr(&e, b"Id").ok_or_else(|| {
                            OpcError::InvalidRelationship("missing Id attribute".to_string())
                        })?;
                        let reltype = attr(&e, b"Type").ok_or_else(|| {
                            OpcError::InvalidRelationship("missing Type attribute".to_string())
                        })?;
                        let target = attr(&e, b"Target").ok_or_else(|| {
                            OpcError::InvalidRelationship("missing Target attribute".to_string())
                        })?;
                        let external =
                            attr(&e, b"TargetMode").as_deref() == Some("External");
                        rels.add_relationship(reltype, target, r_id, external);
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::Xml(e.to_string())),
                _ => {},
            }
        }

        Ok(rels)
    }

    /// Add a relationship to the collection.
    pub fn add_relationship(
        &mut self,
        reltype: String,
        target_ref: String,
        r_id: String,
        is_external: bool,
    ) -> &Relationship {
        let rel = Relationship::new(
            r_id.clone(),
            reltype,
            target_ref,
            self.base_uri.clone(),
            is_external,
        );
        self.rels.insert(r_id.clone(), rel);
        // Safe to unwrap since we just inserted it
        self.rels.get(r_id.as_str()).unwrap()
    }

    /// Get a relationship by its ID.
    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    /// Get or add an internal relationship to a target part.
    ///
    /// If a relationship of the given type to the target already exists,
    /// returns that relationship. Otherwise creates a new one with the next
    /// available rId.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> &Relationship {
        let existing = self
            .rels
            .values()
            .find(|rel| {
                rel.reltype() == reltype && rel.target_ref() == target_ref && !rel.is_external()
            })
            .map(|rel| rel.r_id().to_string());

        match existing {
            Some(r_id) => self.rels.get(&r_id).unwrap(),
            None => {
                let r_id = self.next_r_id();
                self.add_relationship(reltype.to_string(), target_ref.to_string(), r_id, false)
            },
        }
    }

    /// Find the first relationship of a given type.
    pub fn rel_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        self.rels
            .values()
            .filter(|rel| rel.reltype() == reltype)
            .min_by_key(|rel| rel_id_ordinal(rel.r_id()))
            .ok_or_else(|| OpcError::RelationshipNotFound(reltype.to_string()))
    }

    /// Find all relationships of a given type, in rId order.
    pub fn rels_with_reltype(&self, reltype: &str) -> Vec<&Relationship> {
        let mut found: Vec<&Relationship> = self
            .rels
            .values()
            .filter(|rel| rel.reltype() == reltype)
            .collect();
        found.sort_by_key(|rel| rel_id_ordinal(rel.r_id()));
        found
    }

    /// Check whether the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Number of relationships in the collection.
    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Iterate over the relationships (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.values()
    }

    /// Next available rId (one past the highest numbered existing rId).
    fn next_r_id(&self) -> String {
        let max = self
            .rels
            .keys()
            .map(|id| rel_id_ordinal(id))
            .filter(|&n| n != u32::MAX)
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }

    /// Serialize to `.rels` XML, ordered by rId for stable output.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, namespace::OPC_RELATIONSHIPS));

        let mut rels: Vec<&Relationship> = self.rels.values().collect();
        rels.sort_by_key(|rel| rel_id_ordinal(rel.r_id()));
        for rel in rels {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape_xml(rel.r_id()),
                escape_xml(rel.reltype()),
                escape_xml(rel.target_ref()),
            ));
            if rel.is_external() {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }

        xml.push_str("</Relationships>");
        xml
    }
}

/// Numeric ordinal of an rId ("rId12" -> 12); unparseable ids sort last.
fn rel_id_ordinal(r_id: &str) -> u32 {
    r_id.strip_prefix("rId")
        .and_then(|n| n.parse::<u32>().ok())
        .unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS_XML: &[u8] = br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_rels() {
        let rels = Relationships::from_xml("/ppt/slides".to_string(), RELS_XML).unwrap();
        assert_eq!(rels.len(), 2);

        let layout = rels.get("rId1").unwrap();
        assert!(!layout.is_external());
        assert_eq!(
            layout.target_partname().unwrap().as_str(),
            "/ppt/slideLayouts/slideLayout1.xml"
        );

        let link = rels.get("rId2").unwrap();
        assert!(link.is_external());
        assert!(link.target_partname().is_err());
    }

    #[test]
    fn test_get_or_add_reuses_existing() {
        let mut rels = Relationships::new("/ppt".to_string());
        let a = rels
            .get_or_add("type/slide", "slides/slide1.xml")
            .r_id()
            .to_string();
        let b = rels
            .get_or_add("type/slide", "slides/slide1.xml")
            .r_id()
            .to_string();
        assert_eq!(a, b);
        assert_eq!(rels.len(), 1);
    }

    #[test]
    fn test_next_r_id_skips_used() {
        let mut rels = Relationships::new("/".to_string());
        rels.add_relationship("t".into(), "a.xml".into(), "rId7".into(), false);
        let added = rels.get_or_add("t", "b.xml").r_id().to_string();
        assert_eq!(added, "rId8");
    }

    #[test]
    fn test_to_xml_round_trip() {
        let rels = Relationships::from_xml("/ppt/slides".to_string(), RELS_XML).unwrap();
        let xml = rels.to_xml();
        let reparsed = Relationships::from_xml("/ppt/slides".to_string(), xml.as_bytes()).unwrap();
        assert_eq!(reparsed.len(), 2);
        assert!(xml.contains(r#"TargetMode="External""#));
    }
}
