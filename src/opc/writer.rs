//! Package writer for OPC packages.
//!
//! Serializes an in-memory package back to a ZIP byte stream: the
//! `[Content_Types].xml` stream, package-level `_rels/.rels`, and every
//! part with its relationships.
use crate::opc::constants::content_type as ct;
use crate::opc::error::{OpcError, Result};
use crate::opc::package::OpcPackage;
use crate::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use crate::opc::part::Part;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Package writer that serializes an OPC package to a ZIP container.
///
/// # Example
///
/// ```no_run
/// use pitaya::opc::{OpcPackage, PackageWriter};
///
/// let pkg = OpcPackage::new();
/// let bytes = PackageWriter::to_bytes(&pkg)?;
/// # let _ = bytes;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PackageWriter;

impl PackageWriter {
    /// Write an OPC package to a file.
    pub fn write<P: AsRef<Path>>(path: P, package: &OpcPackage) -> Result<()> {
        let bytes = Self::to_bytes(package)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Serialize an OPC package to bytes.
    pub fn to_bytes(package: &OpcPackage) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        // [Content_Types].xml
        let cti = ContentTypesItem::from_package(package);
        writer.start_file(&CONTENT_TYPES_URI[1..], options)?;
        writer.write_all(cti.to_xml().as_bytes())?;

        // Package-level relationships (_rels/.rels)
        writer.start_file("_rels/.rels", options)?;
        writer.write_all(package.rels().to_xml().as_bytes())?;

        // All parts and their relationships, in stable partname order.
        let mut parts: Vec<&Part> = package.iter_parts().collect();
        parts.sort_by(|a, b| a.partname().as_str().cmp(b.partname().as_str()));
        for part in parts {
            writer.start_file(part.partname().membername(), options)?;
            writer.write_all(part.blob())?;

            if !part.rels().is_empty() {
                let rels_uri = part
                    .partname()
                    .rels_uri()
                    .map_err(OpcError::InvalidPackUri)?;
                writer.start_file(rels_uri.membername(), options)?;
                writer.write_all(part.rels().to_xml().as_bytes())?;
            }
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}

/// Helper for building `[Content_Types].xml` content.
///
/// Manages Default and Override elements for content type mapping.
struct ContentTypesItem {
    /// Default content types by extension
    defaults: HashMap<String, String>,

    /// Override content types by partname
    overrides: HashMap<String, String>,
}

impl ContentTypesItem {
    fn new() -> Self {
        let mut defaults = HashMap::new();

        // Standard defaults every package carries.
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());

        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    /// Build ContentTypesItem from an OPC package.
    fn from_package(package: &OpcPackage) -> Self {
        let mut cti = Self::new();
        for part in package.iter_parts() {
            cti.add_content_type(part.partname(), part.content_type());
        }
        cti
    }

    /// Add a content type for a part.
    ///
    /// Uses a Default mapping when the extension matches a well-known type,
    /// otherwise an Override for the specific partname.
    fn add_content_type(&mut self, partname: &PackURI, content_type: &str) {
        let ext = partname.ext();

        if Self::is_default_content_type(ext, content_type) {
            self.defaults
                .insert(ext.to_string(), content_type.to_string());
        } else {
            self.overrides
                .insert(partname.to_string(), content_type.to_string());
        }
    }

    /// Check if an extension/content-type pair is a standard default.
    fn is_default_content_type(ext: &str, content_type: &str) -> bool {
        matches!(
            (ext, content_type),
            ("rels", ct::OPC_RELATIONSHIPS)
                | ("xml", ct::XML)
                | ("png", ct::PNG)
                | ("jpg", ct::JPEG)
                | ("jpeg", ct::JPEG)
                | ("gif", ct::GIF)
        )
    }

    /// Generate the XML for `[Content_Types].xml`.
    fn to_xml(&self) -> String {
        use crate::common::xml::escape_xml;
        use crate::opc::constants::namespace;

        let mut xml = String::with_capacity(2048);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, namespace::OPC_CONTENT_TYPES));

        // Default elements, sorted by extension for stable output.
        let mut exts: Vec<_> = self.defaults.keys().collect();
        exts.sort();
        for ext in exts {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(&self.defaults[ext])
            ));
        }

        // Override elements, sorted by partname.
        let mut partnames: Vec<_> = self.overrides.keys().collect();
        partnames.sort();
        for partname in partnames {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(&self.overrides[partname])
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::part::Part;

    #[test]
    fn test_content_types_xml() {
        let mut cti = ContentTypesItem::new();
        cti.add_content_type(
            &PackURI::new("/ppt/presentation.xml").unwrap(),
            ct::PML_PRESENTATION_MAIN,
        );
        cti.add_content_type(&PackURI::new("/ppt/media/image1.png").unwrap(), ct::PNG);

        let xml = cti.to_xml();
        assert!(xml.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        assert!(xml.contains(r#"<Override PartName="/ppt/presentation.xml""#));
    }

    #[test]
    fn test_round_trip_through_reader() {
        let mut pkg = OpcPackage::new();
        let partname = PackURI::new("/ppt/presentation.xml").unwrap();
        pkg.add_part(Part::new(
            partname.clone(),
            ct::PML_PRESENTATION_MAIN.to_string(),
            b"<p:presentation/>".to_vec(),
        ));
        pkg.rels_mut().get_or_add(
            crate::opc::constants::relationship_type::OFFICE_DOCUMENT,
            "ppt/presentation.xml",
        );

        let bytes = PackageWriter::to_bytes(&pkg).unwrap();
        let reread = OpcPackage::from_reader(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(reread.part_count(), 1);
        let main = reread.main_document_part().unwrap();
        assert_eq!(main.blob(), b"<p:presentation/>");
    }
}
