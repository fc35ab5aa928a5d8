//! Attribute block injection.
//!
//! Up to three lines go into the card's text container, in this order:
//! filename, details (joined with " • "), resolution/HDR. A card gets at
//! most one block.

use crate::attributes::{Attribute, AttributeCategory, LineGroup};
use crate::dom::{CardElement, InjectedLine, ATTR_FILENAME, ATTR_SIZE};

pub const DETAIL_SEPARATOR: &str = " • ";

/// Inject `attributes` into `card`.
///
/// Returns false, leaving the card untouched, when there is nothing to
/// inject, no text container, or a block is already present.
pub fn render_attributes(card: &mut CardElement, attributes: &[Attribute]) -> bool {
    if attributes.is_empty() {
        return false;
    }
    let Some(text) = card.text_mut() else {
        return false;
    };
    if text.has_attribute_block() {
        return false;
    }

    let mut file_name: Option<&str> = None;
    let mut details: Vec<&str> = Vec::new();
    let mut resolution: Vec<&str> = Vec::new();
    for attr in attributes {
        match attr.line() {
            LineGroup::FileName => file_name = Some(attr.text.as_str()),
            LineGroup::Details => details.push(attr.text.as_str()),
            LineGroup::Resolution => resolution.push(attr.text.as_str()),
        }
    }

    if let Some(name) = file_name {
        text.attribute_lines.push(InjectedLine {
            group: LineGroup::FileName,
            text: name.to_string(),
        });
    }
    if !details.is_empty() {
        text.attribute_lines.push(InjectedLine {
            group: LineGroup::Details,
            text: details.join(DETAIL_SEPARATOR),
        });
    }
    if !resolution.is_empty() {
        text.attribute_lines.push(InjectedLine {
            group: LineGroup::Resolution,
            text: resolution.join(DETAIL_SEPARATOR),
        });
    }

    // Read back by the delete/identify handlers
    if let Some(size) = attributes
        .iter()
        .find(|a| a.category == AttributeCategory::FileSize)
    {
        card.set_attribute(ATTR_SIZE, &size.text);
    }
    if let Some(name) = file_name {
        card.set_attribute(ATTR_FILENAME, name);
    }
    true
}

/// Inject untagged strings, categorized by shape.
pub fn render_attribute_strings<S: AsRef<str>>(card: &mut CardElement, attributes: &[S]) -> bool {
    let tagged: Vec<Attribute> = attributes
        .iter()
        .map(|a| Attribute::infer(a.as_ref()))
        .collect();
    render_attributes(card, &tagged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::CardElement;

    fn card() -> CardElement {
        CardElement::movie(Some("abc")).with_text_container()
    }

    fn tagged() -> Vec<Attribute> {
        vec![
            Attribute::new(AttributeCategory::FileSize, "1.5 GB"),
            Attribute::new(AttributeCategory::FileName, "title.mkv"),
            Attribute::new(AttributeCategory::Container, "MKV"),
            Attribute::new(AttributeCategory::Resolution, "1920×1080"),
            Attribute::new(AttributeCategory::DynamicRange, "HDR10"),
            Attribute::new(AttributeCategory::AudioLanguage, "English"),
        ]
    }

    #[test]
    fn test_lines_in_order() {
        let mut card = card();
        assert!(render_attributes(&mut card, &tagged()));

        let lines = &card.text().unwrap().attribute_lines;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "title.mkv");
        assert_eq!(lines[1].text, "1.5 GB • MKV • English");
        assert_eq!(lines[2].text, "1920×1080 • HDR10");
        assert_eq!(card.attribute(ATTR_FILENAME), Some("title.mkv"));
        assert_eq!(card.attribute(ATTR_SIZE), Some("1.5 GB"));
    }

    #[test]
    fn test_render_at_most_once() {
        let mut card = card();
        assert!(render_attributes(&mut card, &tagged()));
        assert!(!render_attributes(&mut card, &tagged()));
        assert_eq!(card.text().unwrap().attribute_lines.len(), 3);
    }

    #[test]
    fn test_missing_text_container_is_noop() {
        let mut card = CardElement::movie(Some("abc"));
        assert!(!render_attributes(&mut card, &tagged()));
        assert!(!card.has_attribute(ATTR_FILENAME));
    }

    #[test]
    fn test_empty_attributes_is_noop() {
        let mut card = card();
        assert!(!render_attributes(&mut card, &[]));
        assert!(!card.has_attribute_block());
    }

    #[test]
    fn test_only_non_empty_groups_get_lines() {
        let mut card = card();
        render_attributes(
            &mut card,
            &[Attribute::new(AttributeCategory::DynamicRange, "SDR")],
        );
        let text = card.text().unwrap();
        assert_eq!(text.attribute_lines.len(), 1);
        assert_eq!(text.line(LineGroup::Resolution), Some("SDR"));
        assert_eq!(text.line(LineGroup::FileName), None);
    }

    #[test]
    fn test_untagged_strings_group_by_shape() {
        let mut card = card();
        assert!(render_attribute_strings(
            &mut card,
            &["2.0 KB", "b.mkv", "MKV", "3840×2160", "Dolby Vision"]
        ));
        let text = card.text().unwrap();
        assert_eq!(text.line(LineGroup::FileName), Some("b.mkv"));
        assert_eq!(text.line(LineGroup::Details), Some("2.0 KB • MKV"));
        assert_eq!(text.line(LineGroup::Resolution), Some("3840×2160 • Dolby Vision"));
    }
}
