//! Style-only repainting: apply a preset's colors, font and alignment
//! across an existing deck without touching its text or structure.
use crate::pptx::Slide;
use crate::pptx::Deck;
use crate::style::StylePreset;
use tracing::debug;

/// Repaint every slide in the deck with the given preset.
///
/// Backgrounds, run colors, fonts, bold flags and paragraph alignment are
/// overwritten; text content and shape structure are left alone.
/// Idempotent: a second application with the same preset changes nothing —
/// colors are integer triples, so equality is exact.
pub fn repaint(deck: &mut Deck, preset: &StylePreset) {
    for slide in deck.slides_mut() {
        restyle_slide(slide, preset);
    }
    debug!(slides = deck.slide_count(), "deck repainted");
}

/// Apply a preset to one slide: background, then every run of every
/// text-bearing shape. Title runs get the title color and bold; all other
/// runs the body color.
pub(crate) fn restyle_slide(slide: &mut Slide, preset: &StylePreset) {
    slide.set_background(preset.background);

    let title_pos = slide.shapes().iter().position(|s| s.is_title());
    for (i, shape) in slide.shapes_mut().iter_mut().enumerate() {
        let is_title = Some(i) == title_pos;
        let Some(frame) = shape.text_frame_mut() else {
            continue;
        };
        for para in &mut frame.paragraphs {
            para.alignment = Some(preset.alignment);
            for run in &mut para.runs {
                if run.is_break() {
                    continue;
                }
                run.font = Some(preset.font_family.to_string());
                run.bold = Some(is_title);
                run.color = Some(if is_title {
                    preset.title_color
                } else {
                    preset.body_color
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::color::RGBColor;
    use crate::generate::DeckBuilder;
    use crate::rewrite::OutlineSlide;
    use crate::style::{Alignment, StylePreset};

    fn one_slide_deck() -> Deck {
        DeckBuilder::new()
            .build(&[OutlineSlide {
                title: "Quarterly Review".to_string(),
                content: vec!["Revenue up".to_string()],
            }])
            .unwrap()
    }

    #[test]
    fn test_business_repaint_pins_colors() {
        let preset = StylePreset::lookup("business").unwrap();
        let mut deck = one_slide_deck();
        repaint(&mut deck, preset);

        let bytes = deck.to_bytes().unwrap();
        let reopened = Deck::from_bytes(&bytes).unwrap();
        let slide = &reopened.slides()[0];

        assert_eq!(slide.background(), Some(RGBColor::new(255, 255, 255)));

        let title = slide.title_shape().unwrap();
        let run = &title.text_frame().unwrap().paragraphs[0].runs[0];
        assert_eq!(run.color, Some(RGBColor::new(0, 51, 102)));
        assert_eq!(run.bold, Some(true));
        assert_eq!(run.font.as_deref(), Some("Calibri"));
    }

    #[test]
    fn test_repaint_preserves_text() {
        let preset = StylePreset::lookup("dark").unwrap();
        let mut deck = one_slide_deck();
        let before = crate::extract::extract(&deck);
        repaint(&mut deck, preset);
        let after = crate::extract::extract(&deck);
        assert_eq!(before, after);
    }

    #[test]
    fn test_repaint_is_idempotent() {
        let preset = StylePreset::lookup("warm").unwrap();

        let mut once = one_slide_deck();
        repaint(&mut once, preset);
        let once_bytes = once.to_bytes().unwrap();

        let mut twice = Deck::from_bytes(&once_bytes).unwrap();
        repaint(&mut twice, preset);
        assert_eq!(twice.to_bytes().unwrap(), once_bytes);
    }

    #[test]
    fn test_body_runs_get_body_color_and_alignment() {
        let preset = StylePreset::lookup("modern").unwrap();
        let mut deck = one_slide_deck();
        repaint(&mut deck, preset);

        let slide = &deck.slides()[0];
        let body = slide
            .shapes()
            .iter()
            .find(|s| !s.is_title() && s.has_text_frame())
            .unwrap();
        let para = &body.text_frame().unwrap().paragraphs[0];
        assert_eq!(para.alignment, Some(Alignment::Center));
        assert_eq!(para.runs[0].bold, Some(false));
        assert_eq!(para.runs[0].color, Some(preset.body_color));
    }
}
