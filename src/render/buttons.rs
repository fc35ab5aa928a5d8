//! Action buttons.
//!
//! What a click does (native delete and identify dialogs) is the host's
//! business; this only places the buttons.

use crate::dom::{ActionButton, CardAction, CardElement};
use crate::settings::DisplayOptions;

/// Inject the enabled action buttons for `item_id` into `card`.
///
/// At most one button container per card. Returns false when both
/// toggles are off, the card has no text container, or buttons are
/// already there.
pub fn render_action_buttons(card: &mut CardElement, item_id: &str, options: &DisplayOptions) -> bool {
    if item_id.is_empty() || !options.any_button() {
        return false;
    }
    let Some(text) = card.text_mut() else {
        return false;
    };
    if text.action_buttons.is_some() {
        return false;
    }

    let mut buttons = Vec::new();
    if options.show_delete_button {
        buttons.push(ActionButton {
            action: CardAction::Delete,
            item_id: item_id.to_string(),
        });
    }
    if options.show_identify_button {
        buttons.push(ActionButton {
            action: CardAction::Identify,
            item_id: item_id.to_string(),
        });
    }
    text.action_buttons = Some(buttons);
    true
}
