/// Provides the PackURI value type for working with package partnames.
///
/// A PackURI represents a part name within an OPC package, following the URI
/// format defined by the Open Packaging Conventions: it always begins with a
/// forward slash and uses forward slashes as path separators.

/// The pseudo-partname of the package itself.
pub const PACKAGE_URI: &str = "/";

/// Partname of the content types stream.
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

/// A partname within an OPC package (e.g. `/ppt/slides/slide1.xml`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a string beginning with a forward slash.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Resolve a relative reference (like `../slideLayouts/slideLayout1.xml`)
    /// against a base URI (like `/ppt/slides`) into an absolute PackURI.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        if relative_ref.starts_with('/') {
            return Self::new(relative_ref);
        }

        let mut segments: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        for seg in relative_ref.split('/') {
            match seg {
                "" | "." => {},
                ".." => {
                    segments.pop();
                },
                other => segments.push(other),
            }
        }

        Self::new(format!("/{}", segments.join("/")))
    }

    /// Get the full URI string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Get the base URI (directory portion), e.g. `/ppt/slides` for
    /// `/ppt/slides/slide1.xml`.
    pub fn base_uri(&self) -> &str {
        if self.uri == "/" {
            return "/";
        }

        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Get the filename portion, e.g. `slide1.xml`.
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// Get the extension (no leading period), e.g. `xml`.
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(pos) => &filename[pos + 1..],
            None => "",
        }
    }

    /// Get the partname index for tuple partnames, e.g. 21 for
    /// `/ppt/slides/slide21.xml`, or None for singleton partnames.
    pub fn idx(&self) -> Option<u32> {
        let filename = self.filename();
        let stem = match filename.rfind('.') {
            Some(pos) => &filename[..pos],
            None => filename,
        };
        let digits: String = stem
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if digits.is_empty() || digits.len() == stem.len() {
            return None;
        }
        digits.parse::<u32>().ok()
    }

    /// Get the membername (URI with leading slash stripped), the form used
    /// as the ZIP member name for the package item.
    pub fn membername(&self) -> &str {
        if self.uri == "/" { "" } else { &self.uri[1..] }
    }

    /// Get the relative reference from a base URI to this PackURI, e.g.
    /// `../slideLayouts/slideLayout1.xml` seen from `/ppt/slides`.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }

        let from_parts: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to_parts: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();

        let common = from_parts
            .iter()
            .zip(to_parts.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<String> = Vec::new();
        for _ in common..from_parts.len() {
            parts.push("..".to_string());
        }
        for seg in &to_parts[common..] {
            parts.push((*seg).to_string());
        }
        parts.join("/")
    }

    /// Get the partname of this part's relationships sibling, e.g.
    /// `/ppt/slides/_rels/slide1.xml.rels`.
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        if self.uri == "/" {
            return PackURI::new("/_rels/.rels");
        }
        PackURI::new(format!("{}/_rels/{}.rels", self.base_uri(), self.filename()))
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        let uri = PackURI::new("/ppt/slides/slide21.xml").unwrap();
        assert_eq!(uri.base_uri(), "/ppt/slides");
        assert_eq!(uri.filename(), "slide21.xml");
        assert_eq!(uri.ext(), "xml");
        assert_eq!(uri.idx(), Some(21));
        assert_eq!(uri.membername(), "ppt/slides/slide21.xml");
    }

    #[test]
    fn test_singleton_has_no_idx() {
        let uri = PackURI::new("/ppt/presentation.xml").unwrap();
        assert_eq!(uri.idx(), None);
    }

    #[test]
    fn test_from_rel_ref() {
        let uri = PackURI::from_rel_ref("/ppt/slides", "../slideLayouts/slideLayout1.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/slideLayouts/slideLayout1.xml");

        let uri = PackURI::from_rel_ref("/", "ppt/presentation.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/presentation.xml");
    }

    #[test]
    fn test_relative_ref() {
        let uri = PackURI::new("/ppt/slideLayouts/slideLayout1.xml").unwrap();
        assert_eq!(
            uri.relative_ref("/ppt/slides"),
            "../slideLayouts/slideLayout1.xml"
        );
        assert_eq!(uri.relative_ref("/ppt"), "slideLayouts/slideLayout1.xml");
    }

    #[test]
    fn test_rels_uri() {
        let uri = PackURI::new("/ppt/presentation.xml").unwrap();
        assert_eq!(
            uri.rels_uri().unwrap().as_str(),
            "/ppt/_rels/presentation.xml.rels"
        );
        let pkg = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(pkg.rels_uri().unwrap().as_str(), "/_rels/.rels");
    }

    #[test]
    fn test_rejects_relative() {
        assert!(PackURI::new("ppt/presentation.xml").is_err());
    }
}
