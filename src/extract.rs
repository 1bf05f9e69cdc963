//! Content extraction: walk a source deck and pull out, per slide, its
//! title and the rest of its text.
//!
//! Extraction never mutates the source deck, and a slide with nothing to
//! say yields empty strings rather than an error.
use crate::pptx::Deck;
use tracing::debug;

/// Character budget applied to rewrite-prompt input.
pub const DEFAULT_PROMPT_BUDGET: usize = 4000;

/// The text content of one slide. Transient: lives only for the duration
/// of an extract → rewrite → map pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlideContent {
    /// Title text; empty when the slide has no text-bearing title shape
    pub title: String,
    /// Remaining text: every other text-bearing shape, newline-joined in
    /// shape order
    pub body: String,
}

/// Extract one [`SlideContent`] record per slide, preserving slide order.
pub fn extract(deck: &Deck) -> Vec<SlideContent> {
    let records: Vec<SlideContent> = deck
        .slides()
        .iter()
        .map(|slide| {
            let title_pos = slide.shapes().iter().position(|s| s.is_title());
            let title = title_pos
                .and_then(|i| slide.shapes()[i].text())
                .unwrap_or_default();

            let mut body = String::new();
            for (i, shape) in slide.shapes().iter().enumerate() {
                if Some(i) == title_pos {
                    continue;
                }
                if let Some(text) = shape.text() {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(&text);
                }
            }

            SlideContent { title, body }
        })
        .collect();

    debug!(slides = records.len(), "extracted deck content");
    records
}

/// All text in the deck, newline-joined across slides — the raw material a
/// rewrite prompt is built from.
pub fn full_text(deck: &Deck) -> String {
    let mut text = String::new();
    for slide in deck.slides() {
        let slide_text = slide.text();
        if slide_text.is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&slide_text);
    }
    text
}

/// Truncate to at most `max_chars` characters on a character boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::DeckBuilder;
    use crate::rewrite::OutlineSlide;

    fn two_slide_deck() -> Deck {
        DeckBuilder::new()
            .build(&[
                OutlineSlide {
                    title: "Intro".to_string(),
                    content: vec!["Point A".to_string(), "Point B".to_string()],
                },
                OutlineSlide {
                    title: "Outro".to_string(),
                    content: vec!["Thanks".to_string()],
                },
            ])
            .unwrap()
    }

    #[test]
    fn test_extraction_preserves_order_and_text() {
        let deck = two_slide_deck();
        let records = extract(&deck);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Intro");
        assert_eq!(records[0].body, "Point A\nPoint B");
        assert_eq!(records[1].title, "Outro");
        assert_eq!(records[1].body, "Thanks");
    }

    #[test]
    fn test_extraction_does_not_mutate_source() {
        let mut deck = two_slide_deck();
        let before = deck.to_bytes().unwrap();
        let mut reopened = Deck::from_bytes(&before).unwrap();
        let _ = extract(&reopened);
        assert_eq!(reopened.to_bytes().unwrap(), before);
    }

    #[test]
    fn test_full_text_joins_slides() {
        let deck = two_slide_deck();
        assert_eq!(full_text(&deck), "Intro\nPoint A\nPoint B\nOutro\nThanks");
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multi-byte characters are never split.
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            /// One record per slide, in slide order, whatever the count.
            #[test]
            fn prop_extraction_preserves_order(
                titles in proptest::collection::vec("[A-Za-z0-9 ]{1,12}", 0..6)
            ) {
                let records: Vec<OutlineSlide> = titles
                    .iter()
                    .map(|t| OutlineSlide {
                        title: t.clone(),
                        content: vec![],
                    })
                    .collect();
                let deck = DeckBuilder::new().build(&records).unwrap();

                let extracted = extract(&deck);
                prop_assert_eq!(extracted.len(), records.len());
                for (record, content) in records.iter().zip(&extracted) {
                    prop_assert_eq!(&content.title, &record.title);
                }
            }
        }
    }
}
