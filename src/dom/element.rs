//! Card elements.
//!
//! A card is the host UI's tile for one library item. It carries string
//! attributes (`data-id`, `data-type`, the enhancement markers) and an
//! optional text container that injected lines and buttons go into.

use std::collections::BTreeMap;

use crate::attributes::LineGroup;

pub const ATTR_ITEM_ID: &str = "data-id";
pub const ATTR_TYPE: &str = "data-type";
pub const ATTR_ENHANCED: &str = "data-enhanced";
pub const ATTR_ENHANCED_ERROR: &str = "data-enhanced-error";
pub const ATTR_FILENAME: &str = "data-filename";
pub const ATTR_SIZE: &str = "data-size";

/// `data-type` value of the cards this crate enhances.
pub const MOVIE_TYPE: &str = "Movie";

/// Marker value for a set boolean attribute.
pub const MARKER_SET: &str = "1";

/// A line of the injected attribute block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedLine {
    pub group: LineGroup,
    pub text: String,
}

impl InjectedLine {
    pub fn class_name(&self) -> &'static str {
        match self.group {
            LineGroup::FileName => "cardText-secondary movie-attributes movie-attributes-filename",
            LineGroup::Details => "cardText-secondary movie-attributes movie-attributes-details",
            LineGroup::Resolution => "cardText-secondary movie-attributes movie-attributes-res",
        }
    }
}

/// What an injected button does when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardAction {
    Delete,
    Identify,
}

impl CardAction {
    pub fn label(self) -> &'static str {
        match self {
            CardAction::Delete => "Delete",
            CardAction::Identify => "Identify",
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            CardAction::Delete => "jellyfin-action-btn jellyfin-delete-btn",
            CardAction::Identify => "jellyfin-action-btn jellyfin-identify-btn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub action: CardAction,
    pub item_id: String,
}

/// The card's text container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardText {
    /// Lines the host rendered (title, year, ...).
    pub host_lines: Vec<String>,
    pub attribute_lines: Vec<InjectedLine>,
    pub action_buttons: Option<Vec<ActionButton>>,
}

impl CardText {
    pub fn has_attribute_block(&self) -> bool {
        !self.attribute_lines.is_empty()
    }

    pub fn line(&self, group: LineGroup) -> Option<&str> {
        self.attribute_lines
            .iter()
            .find(|l| l.group == group)
            .map(|l| l.text.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardElement {
    attributes: BTreeMap<String, String>,
    text: Option<CardText>,
}

impl CardElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// A movie card, with or without an item id.
    pub fn movie(item_id: Option<&str>) -> Self {
        let mut card = Self::new().with_attribute(ATTR_TYPE, MOVIE_TYPE);
        if let Some(id) = item_id {
            card.set_attribute(ATTR_ITEM_ID, id);
        }
        card
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_text_container(mut self) -> Self {
        self.text.get_or_insert_with(CardText::default);
        self
    }

    pub fn with_host_line(mut self, line: &str) -> Self {
        self.text
            .get_or_insert_with(CardText::default)
            .host_lines
            .push(line.to_string());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    /// The stable item id, if the card has a non-empty one.
    pub fn item_id(&self) -> Option<&str> {
        self.attribute(ATTR_ITEM_ID).filter(|id| !id.is_empty())
    }

    pub fn is_movie(&self) -> bool {
        self.attribute(ATTR_TYPE) == Some(MOVIE_TYPE)
    }

    pub fn is_marked_enhanced(&self) -> bool {
        self.attribute(ATTR_ENHANCED) == Some(MARKER_SET)
    }

    pub fn is_marked_errored(&self) -> bool {
        self.attribute(ATTR_ENHANCED_ERROR) == Some(MARKER_SET)
    }

    pub fn text(&self) -> Option<&CardText> {
        self.text.as_ref()
    }

    pub fn text_mut(&mut self) -> Option<&mut CardText> {
        self.text.as_mut()
    }

    pub fn has_attribute_block(&self) -> bool {
        self.text.as_ref().map(CardText::has_attribute_block).unwrap_or(false)
    }

    /// Remove injected attribute lines; returns how many were removed.
    pub fn clear_attribute_block(&mut self) -> usize {
        match self.text.as_mut() {
            Some(text) => std::mem::take(&mut text.attribute_lines).len(),
            None => 0,
        }
    }

    pub fn clear_action_buttons(&mut self) -> bool {
        self.text
            .as_mut()
            .and_then(|text| text.action_buttons.take())
            .is_some()
    }

    /// Drop both enhancement markers and everything injected.
    pub fn reset_enhancement(&mut self) {
        self.remove_attribute(ATTR_ENHANCED);
        self.remove_attribute(ATTR_ENHANCED_ERROR);
        self.clear_attribute_block();
        self.clear_action_buttons();
    }
}
