/// Package implementation for PowerPoint presentations.
use crate::error::{Error, Result};
use crate::opc::OpcPackage;
use crate::opc::constants::content_type as ct;
use crate::pptx::deck::Deck;
use std::io::{Read, Seek};
use std::path::Path;

/// A PowerPoint (.pptx) package.
///
/// This is the entry point for working with presentations: it wraps an OPC
/// package, verifies it actually holds a presentation, and hands out the
/// mutable [`Deck`] view.
///
/// # Examples
///
/// ```rust,no_run
/// use pitaya::pptx::Package;
///
/// let pkg = Package::open("presentation.pptx")?;
/// let deck = pkg.deck()?;
/// println!("Presentation has {} slides", deck.slide_count());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Package {
    /// The underlying OPC package
    opc: OpcPackage,
}

impl Package {
    /// Open a .pptx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let opc = OpcPackage::open(path)
            .map_err(|e| Error::MalformedDeck(format!("not a valid package: {}", e)))?;
        Self::from_opc(opc)
    }

    /// Open a .pptx package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let opc = OpcPackage::from_reader(reader)
            .map_err(|e| Error::MalformedDeck(format!("not a valid package: {}", e)))?;
        Self::from_opc(opc)
    }

    /// Verify the main part's content type.
    ///
    /// Both regular and macro-enabled presentations are accepted.
    fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main_part = opc.main_document_part().map_err(|e| {
            Error::MalformedDeck(format!("main presentation part not found: {}", e))
        })?;

        let content_type = main_part.content_type();
        if content_type != ct::PML_PRESENTATION_MAIN && content_type != ct::PML_PRES_MACRO_MAIN {
            return Err(Error::MalformedDeck(format!(
                "expected a presentation, got content type {}",
                content_type
            )));
        }

        Ok(Self { opc })
    }

    /// Wrap an already-validated OPC package (used by the generator, whose
    /// built-in template is presentation-typed by construction).
    pub(crate) fn from_opc_unchecked(opc: OpcPackage) -> Self {
        Self { opc }
    }

    /// Consume the package and build the mutable deck view.
    pub fn deck(self) -> Result<Deck> {
        Deck::from_package(self.opc)
    }

    /// Get the underlying OPC package.
    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::constants::relationship_type as rt;
    use crate::opc::packuri::PackURI;
    use crate::opc::part::Part;

    #[test]
    fn test_rejects_non_presentation_content_type() {
        let mut opc = OpcPackage::new();
        let partname = PackURI::new("/word/document.xml").unwrap();
        opc.add_part(Part::new(
            partname,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"
                .to_string(),
            b"<w:document/>".to_vec(),
        ));
        opc.rels_mut()
            .get_or_add(rt::OFFICE_DOCUMENT, "word/document.xml");

        let result = Package::from_opc(opc);
        assert!(matches!(result, Err(Error::MalformedDeck(_))));
    }
}
