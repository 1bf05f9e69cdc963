//! Pitaya - template mapping and style transfer for PowerPoint presentations
//!
//! This library reads a `.pptx` deck, extracts its text content per slide,
//! optionally restructures that content through a generative-language-model
//! endpoint, and produces a new deck by mapping the content into a second
//! deck used as a style/layout template — or by generating one from
//! scratch — with a named style preset applied throughout.
//!
//! # Features
//!
//! - **Deck reader/writer**: OPC container handling with byte-identical
//!   round-trips for untouched slides
//! - **Content extraction**: per-slide title and body text, in slide order
//! - **Template mapping**: place extracted content into a target deck's
//!   placeholder roles, degrading gracefully when a template lacks them
//! - **Style transfer**: named presets for background, colors, font, and
//!   alignment
//! - **Generative rewrite** (feature `rewrite`): a single bounded request
//!   to a language-model endpoint returning a strict JSON outline
//!
//! # Example - Re-templating a deck
//!
//! ```no_run
//! use pitaya::pptx::Deck;
//! use pitaya::style::StylePreset;
//! use pitaya::mapper::{LayoutPolicy, map_into};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Extract content from the source deck.
//! let source = Deck::open("old.pptx")?;
//! let records = pitaya::extract::extract(&source);
//!
//! // Map it into the uploaded template and restyle it.
//! let mut target = Deck::open("template.pptx")?;
//! let preset = StylePreset::lookup("business").expect("known preset");
//! let report = map_into(&records, &mut target, preset, LayoutPolicy::TitleFirst)?;
//! println!("added {} slides", report.slides_added);
//!
//! target.save("restyled.pptx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Generating a deck from an outline
//!
//! ```no_run
//! use pitaya::generate::DeckBuilder;
//! use pitaya::rewrite::parse_outline;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let response = "```json\n{\"slides\":[{\"title\":\"A\",\"content\":[\"x\"]}]}\n```";
//! let outline = parse_outline(response)?;
//! let mut deck = DeckBuilder::new().build_from_outline(&outline)?;
//! deck.save("generated.pptx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Repainting in place
//!
//! ```no_run
//! use pitaya::pptx::Deck;
//! use pitaya::style::StylePreset;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut deck = Deck::open("deck.pptx")?;
//! let preset = StylePreset::lookup("dark").expect("known preset");
//! pitaya::repaint::repaint(&mut deck, preset);
//! deck.save("dark.pptx")?;
//! # Ok(())
//! # }
//! ```

/// Shared value types (colors) and XML helpers
pub mod common;

/// Unified error types
pub mod error;

/// Content extraction from a source deck
pub mod extract;

/// Deck-from-scratch generation
pub mod generate;

/// Template mapping and style transfer (the core pipeline stage)
pub mod mapper;

/// Open Packaging Conventions container support
pub mod opc;

/// PresentationML deck model: reader, mutable object tree, writer
pub mod pptx;

/// Style-only repainting of an existing deck
pub mod repaint;

/// Generative rewrite boundary: outline schema, validation, client
pub mod rewrite;

/// Style presets
pub mod style;

// Re-export commonly used types for convenience
pub use common::RGBColor;
pub use error::{Error, Result};
pub use extract::SlideContent;
pub use mapper::{LayoutPolicy, MapReport};
pub use pptx::{Deck, Package};
pub use rewrite::{Outline, OutlineSlide};
pub use style::{Alignment, StylePreset};

#[cfg(feature = "rewrite")]
pub use rewrite::RewriteClient;
