//! Template mapping and style transfer: place extracted content into a
//! target deck's layout system and restyle it with a preset.
//!
//! This is where two independent object trees meet. The records came from
//! one deck; the layouts, placeholder roles and visual identity belong to
//! another. Placeholder role indices are a convention of the format, not a
//! contract, so every structural lookup here degrades gracefully: a
//! missing role skips that field for that slide and the batch carries on.
use crate::error::Result;
use crate::extract::SlideContent;
use crate::pptx::Deck;
use crate::repaint::restyle_slide;
use crate::style::StylePreset;
use tracing::{debug, warn};

/// Which layout each mapped record instantiates.
///
/// The conventional registry order puts a title-slide layout at index 0
/// and a title-and-content layout at index 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPolicy {
    /// Every record uses the content layout (index 1).
    ContentOnly,
    /// The first record uses the title layout (index 0); the rest follow
    /// [`LayoutPolicy::ContentOnly`].
    TitleFirst,
}

impl LayoutPolicy {
    /// The preferred layout index for the record at `record_index`.
    fn preferred_index(&self, record_index: usize) -> usize {
        match self {
            Self::ContentOnly => 1,
            Self::TitleFirst => {
                if record_index == 0 {
                    0
                } else {
                    1
                }
            },
        }
    }
}

/// What the mapper did, including every local recovery it performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapReport {
    /// Slides appended to the target deck
    pub slides_added: usize,
    /// Records whose slide exposed no title role
    pub titles_skipped: usize,
    /// Records whose slide exposed no content role
    pub bodies_skipped: usize,
    /// Records that fell back to layout index 0
    pub layout_fallbacks: usize,
}

/// Map content records into the target deck, one new slide per record, and
/// apply the preset to each.
///
/// The target deck keeps its existing slides untouched; mapping only
/// appends. Structural gaps in the template (missing title or content
/// roles, out-of-range layout index) are recovered per slide and tallied
/// in the returned [`MapReport`]; only a deck with no layouts at all is a
/// fatal error.
pub fn map_into(
    records: &[SlideContent],
    deck: &mut Deck,
    preset: &StylePreset,
    policy: LayoutPolicy,
) -> Result<MapReport> {
    let mut report = MapReport::default();

    for (i, record) in records.iter().enumerate() {
        let preferred = policy.preferred_index(i);
        let layout_index = if preferred < deck.layout_count() {
            preferred
        } else {
            warn!(
                record = i,
                requested = preferred,
                available = deck.layout_count(),
                "layout index out of range, falling back to layout 0"
            );
            report.layout_fallbacks += 1;
            0
        };

        let slide = deck.add_slide(layout_index)?;

        if !slide.set_title(&record.title) {
            warn!(record = i, "slide exposes no title role, skipping title");
            report.titles_skipped += 1;
        }

        match slide.body_shape_mut() {
            Some(body) => body.set_text(&record.body),
            None => {
                warn!(record = i, "slide exposes no content role, skipping body");
                report.bodies_skipped += 1;
            },
        }

        restyle_slide(slide, preset);
        report.slides_added += 1;
    }

    debug!(?report, "mapping complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::generate::DeckBuilder;
    use crate::rewrite::OutlineSlide;

    fn records() -> Vec<SlideContent> {
        vec![
            SlideContent {
                title: "Intro".to_string(),
                body: "Point A\nPoint B".to_string(),
            },
            SlideContent {
                title: "Outro".to_string(),
                body: "Thanks".to_string(),
            },
        ]
    }

    fn template() -> Deck {
        // An empty deck built from the internal template: a title layout
        // at index 0 and a title-and-content layout at index 1.
        DeckBuilder::new().build(&[]).unwrap()
    }

    #[test]
    fn test_round_trip_text_fidelity() {
        let preset = StylePreset::lookup("business").unwrap();
        let mut deck = template();
        let report = map_into(&records(), &mut deck, preset, LayoutPolicy::ContentOnly).unwrap();

        assert_eq!(report.slides_added, 2);
        assert_eq!(report.titles_skipped, 0);
        assert_eq!(report.bodies_skipped, 0);

        let bytes = deck.to_bytes().unwrap();
        let reopened = crate::pptx::Deck::from_bytes(&bytes).unwrap();
        let extracted = extract(&reopened);
        assert_eq!(extracted, records());
    }

    #[test]
    fn test_append_only_mapping() {
        let preset = StylePreset::lookup("business").unwrap();

        // Target already holds one slide.
        let mut deck = DeckBuilder::new()
            .build(&[OutlineSlide {
                title: "Existing".to_string(),
                content: vec!["Keep me".to_string()],
            }])
            .unwrap();
        let mut deck = crate::pptx::Deck::from_bytes(&deck.to_bytes().unwrap()).unwrap();
        let existing_blob = deck.slides()[0].to_xml();

        map_into(&records(), &mut deck, preset, LayoutPolicy::ContentOnly).unwrap();
        assert_eq!(deck.slide_count(), 3);

        let bytes = deck.to_bytes().unwrap();
        let reopened = crate::pptx::Deck::from_bytes(&bytes).unwrap();
        assert_eq!(reopened.slide_count(), 3);
        // The pre-existing slide is byte-identical.
        assert_eq!(reopened.slides()[0].to_xml(), existing_blob);
        assert_eq!(reopened.slides()[0].title().as_deref(), Some("Existing"));
    }

    #[test]
    fn test_title_first_policy_uses_title_layout() {
        let preset = StylePreset::lookup("modern").unwrap();
        let mut deck = template();
        map_into(&records(), &mut deck, preset, LayoutPolicy::TitleFirst).unwrap();

        // On the title-slide layout the subtitle carries role index 1, so
        // the first record's body lands there rather than being dropped.
        let first = &deck.slides()[0];
        assert_eq!(first.title().as_deref(), Some("Intro"));

        let bytes = deck.to_bytes().unwrap();
        let reopened = crate::pptx::Deck::from_bytes(&bytes).unwrap();
        assert_eq!(extract(&reopened), records());
    }

    #[test]
    fn test_layout_fallback_is_counted() {
        let preset = StylePreset::lookup("business").unwrap();
        // A deck whose master offers only the title-slide layout, so the
        // preferred content layout (index 1) does not exist.
        let mut deck = crate::generate::title_only_deck().unwrap();
        let report =
            map_into(&records(), &mut deck, preset, LayoutPolicy::ContentOnly).unwrap();

        assert_eq!(report.slides_added, 2);
        assert_eq!(report.layout_fallbacks, 2);
    }

    #[test]
    fn test_graceful_degradation_without_content_role() {
        let preset = StylePreset::lookup("business").unwrap();
        let mut deck = crate::generate::title_only_deck().unwrap();

        let record = vec![SlideContent {
            title: "Only a title".to_string(),
            body: "Nowhere to go".to_string(),
        }];
        let report = map_into(&record, &mut deck, preset, LayoutPolicy::ContentOnly).unwrap();

        assert_eq!(report.slides_added, 1);
        assert_eq!(report.bodies_skipped, 1);
        assert_eq!(
            deck.slides().last().unwrap().title().as_deref(),
            Some("Only a title")
        );
    }
}
