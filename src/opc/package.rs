/// Objects that implement reading OPC packages.
///
/// This module provides the main OpcPackage type, which represents an Open
/// Packaging Convention package in memory. It manages parts and
/// relationships and provides high-level operations for the deck layer.
use crate::common::xml::attr;
use crate::opc::constants::relationship_type;
use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::opc::part::Part;
use crate::opc::rel::Relationships;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

/// Main API type for working with OPC packages.
pub struct OpcPackage {
    /// Package-level relationships
    rels: Relationships,

    /// All parts in the package, indexed by partname
    parts: HashMap<String, Part>,
}

impl OpcPackage {
    /// Create a new empty OPC package.
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI.to_string()),
            parts: HashMap::new(),
        }
    }

    /// Open an OPC package from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Load an OPC package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // First pass: pull every member out of the archive.
        let mut members: HashMap<String, Vec<u8>> = HashMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            members.insert(name, blob);
        }

        Self::unmarshal(members)
    }

    /// Convert raw archive members into the in-memory part graph.
    fn unmarshal(members: HashMap<String, Vec<u8>>) -> Result<Self> {
        let content_types = members
            .get(&CONTENT_TYPES_URI[1..])
            .ok_or_else(|| OpcError::ContentTypes("missing [Content_Types].xml".to_string()))?;
        let cti = ContentTypes::from_xml(content_types)?;

        let mut package = Self::new();

        for (name, blob) in &members {
            // Relationship parts and the content types stream are package
            // plumbing, not parts in their own right.
            if name == &CONTENT_TYPES_URI[1..] || is_rels_member(name) {
                continue;
            }

            let partname =
                PackURI::new(format!("/{}", name)).map_err(OpcError::InvalidPackUri)?;
            let content_type = cti.content_type_for(&partname)?;
            let mut part = Part::new(partname.clone(), content_type, blob.clone());

            // Attach this part's relationships if its sibling exists.
            let rels_uri = partname.rels_uri().map_err(OpcError::InvalidPackUri)?;
            if let Some(rels_blob) = members.get(rels_uri.membername()) {
                part.set_rels(Relationships::from_xml(
                    partname.base_uri().to_string(),
                    rels_blob,
                )?);
            }

            package.parts.insert(partname.to_string(), part);
        }

        // Package-level relationships.
        if let Some(pkg_rels) = members.get("_rels/.rels") {
            package.rels = Relationships::from_xml(PACKAGE_URI.to_string(), pkg_rels)?;
        }

        Ok(package)
    }

    /// Get a reference to the main document part.
    ///
    /// For a presentation package this is the presentation.xml part, found
    /// through the officeDocument relationship.
    pub fn main_document_part(&self) -> Result<&Part> {
        let rel = self.rels.rel_with_reltype(relationship_type::OFFICE_DOCUMENT)?;
        let partname = rel.target_partname()?;
        self.get_part(&partname)
    }

    /// Get a part by its partname.
    pub fn get_part(&self, partname: &PackURI) -> Result<&Part> {
        self.parts
            .get(partname.as_str())
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Get a mutable reference to a part by its partname.
    pub fn get_part_mut(&mut self, partname: &PackURI) -> Result<&mut Part> {
        self.parts
            .get_mut(partname.as_str())
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Add a new part to the package.
    pub fn add_part(&mut self, part: Part) {
        self.parts.insert(part.partname().to_string(), part);
    }

    /// Check if a part exists in the package.
    pub fn contains_part(&self, partname: &PackURI) -> bool {
        self.parts.contains_key(partname.as_str())
    }

    /// Get an iterator over all parts in the package.
    pub fn iter_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Get the number of parts in the package.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Get a reference to the package-level relationships.
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    /// Get a mutable reference to the package-level relationships.
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Find the next available partname for a part template with a `%d`
    /// placeholder (e.g. `/ppt/slides/slide%d.xml`).
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        let mut n = 1u32;
        loop {
            let candidate = template.replace("%d", &n.to_string());
            if !self.parts.contains_key(&candidate) {
                return PackURI::new(candidate).map_err(OpcError::InvalidPackUri);
            }
            n += 1;
            if n > 10000 {
                // Safety limit to prevent infinite loops
                return Err(OpcError::InvalidPackUri(
                    "Too many parts, cannot find next partname".to_string(),
                ));
            }
        }
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

/// Check whether a ZIP member name is a relationships part.
fn is_rels_member(name: &str) -> bool {
    name.ends_with(".rels") && (name.starts_with("_rels/") || name.contains("/_rels/"))
}

/// Parsed view of `[Content_Types].xml`: Default entries keyed by
/// extension, Override entries keyed by partname.
pub(crate) struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    pub(crate) fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut defaults = HashMap::new();
        let mut overrides = HashMap::new();

        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"Default" => {
                        let ext = attr(&e, b"Extension").ok_or_else(|| {
                            OpcError::ContentTypes("Default missing Extension".to_string())
                        })?;
                        let ct = attr(&e, b"ContentType").ok_or_else(|| {
                            OpcError::ContentTypes("Default missing ContentType".to_string())
                        })?;
                        defaults.insert(ext.to_ascii_lowercase(), ct);
                    },
                    b"Override" => {
                        let partname = attr(&e, b"PartName").ok_or_else(|| {
                            OpcError::ContentTypes("Override missing PartName".to_string())
                        })?;
                        let ct = attr(&e, b"ContentType").ok_or_else(|| {
                            OpcError::ContentTypes("Override missing ContentType".to_string())
                        })?;
                        overrides.insert(partname, ct);
                    },
                    _ => {},
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::Xml(e.to_string())),
                _ => {},
            }
        }

        Ok(Self {
            defaults,
            overrides,
        })
    }

    /// Resolve the content type for a partname: Override first, then the
    /// Default for its extension.
    pub(crate) fn content_type_for(&self, partname: &PackURI) -> Result<String> {
        if let Some(ct) = self.overrides.get(partname.as_str()) {
            return Ok(ct.clone());
        }
        self.defaults
            .get(&partname.ext().to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| {
                OpcError::ContentTypes(format!("no content type for {}", partname))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn create_minimal_pptx() -> Vec<u8> {
        let mut zip_data = Vec::new();
        {
            let cursor = Cursor::new(&mut zip_data);
            let mut writer = ZipWriter::new(cursor);
            let options = SimpleFileOptions::default();

            writer.start_file("[Content_Types].xml", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#).unwrap();

            writer.start_file("_rels/.rels", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#).unwrap();

            writer.start_file("ppt/presentation.xml", options).unwrap();
            writer.write_all(br#"<?xml version="1.0"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"/>"#).unwrap();

            writer.finish().unwrap();
        }
        zip_data
    }

    #[test]
    fn test_open_package() {
        let zip_data = create_minimal_pptx();
        let pkg = OpcPackage::from_reader(Cursor::new(zip_data)).unwrap();
        assert_eq!(pkg.part_count(), 1);
    }

    #[test]
    fn test_main_document_part() {
        let zip_data = create_minimal_pptx();
        let pkg = OpcPackage::from_reader(Cursor::new(zip_data)).unwrap();
        let main = pkg.main_document_part().unwrap();
        assert_eq!(
            main.content_type(),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"
        );
    }

    #[test]
    fn test_not_a_zip_is_rejected() {
        let result = OpcPackage::from_reader(Cursor::new(b"not a zip archive".to_vec()));
        assert!(result.is_err());
    }

    #[test]
    fn test_next_partname() {
        let zip_data = create_minimal_pptx();
        let mut pkg = OpcPackage::from_reader(Cursor::new(zip_data)).unwrap();
        let first = pkg.next_partname("/ppt/slides/slide%d.xml").unwrap();
        assert_eq!(first.as_str(), "/ppt/slides/slide1.xml");

        pkg.add_part(Part::new(
            first.clone(),
            "application/xml".to_string(),
            Vec::new(),
        ));
        let second = pkg.next_partname("/ppt/slides/slide%d.xml").unwrap();
        assert_eq!(second.as_str(), "/ppt/slides/slide2.xml");
    }
}
