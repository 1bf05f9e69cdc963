//! Open Packaging Conventions (OPC) container support.
//!
//! A `.pptx` file is an OPC package: a ZIP archive of parts addressed by
//! partname, tied together by `[Content_Types].xml` and `.rels`
//! relationship parts. This module reads a package into memory, gives the
//! deck layer mutable access to individual parts, and serializes the whole
//! package back to bytes.

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod rel;
pub mod writer;

pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::Part;
pub use rel::{Relationship, Relationships};
pub use writer::PackageWriter;
