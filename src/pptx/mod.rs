//! PresentationML (.pptx) deck model: reader, mutable object tree, writer.

pub mod deck;
pub mod layout;
pub mod package;
pub mod shapes;
pub mod slide;

pub use deck::Deck;
pub use layout::{Layout, LayoutPlaceholder};
pub use package::Package;
pub use shapes::{Paragraph, PlaceholderKind, PlaceholderRole, Run, Shape, ShapeKind, TextFrame};
pub use slide::Slide;
