//! Re-enhancement after a settings change.
//!
//! Already-enhanced cards are refetched with the cache bypassed, derived
//! again under the current options and re-rendered in place. A failure
//! leaves the card exactly as it was.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;

use crate::attributes::derive_attributes;
use crate::dom::{CardRef, Document};
use crate::logging::structured::LogContext;
use crate::metadata::client::{FetchRequest, ItemFetcher};
use crate::render::{render_action_buttons, render_attributes};
use crate::settings::{DisplayOptions, SettingsStore};

use super::context::{PassContext, PassKind};
use super::state::CardStates;

#[derive(Clone)]
pub struct ReEnhancer {
    document: Document,
    fetcher: Arc<ItemFetcher>,
    settings: SettingsStore,
    states: CardStates,
}

impl ReEnhancer {
    pub fn new(
        document: Document,
        fetcher: Arc<ItemFetcher>,
        settings: SettingsStore,
        states: CardStates,
    ) -> Self {
        Self {
            document,
            fetcher,
            settings,
            states,
        }
    }

    /// Re-render every enhanced card. Returns how many got a new block.
    pub async fn run(&self) -> usize {
        let ctx = PassContext::new(PassKind::ReEnhance);
        let log_ctx = ctx.log_context();
        let options = self.settings.current();

        let mut by_item: BTreeMap<String, Vec<CardRef>> = BTreeMap::new();
        for card_ref in self.document.find_movie_cards() {
            let item_id = self
                .document
                .with_card(card_ref, |card| {
                    if card.is_marked_enhanced() {
                        card.item_id().map(str::to_string)
                    } else {
                        None
                    }
                })
                .flatten();
            if let Some(item_id) = item_id {
                by_item.entry(item_id).or_default().push(card_ref);
            }
        }

        let updated: usize = join_all(
            by_item
                .iter()
                .map(|(item_id, cards)| self.refresh_item(&log_ctx, item_id, cards, &options)),
        )
        .await
        .into_iter()
        .sum();

        log::info!(
            "{} REENHANCE_COMPLETE items={} updated={} elapsed_ms={}",
            log_ctx,
            by_item.len(),
            updated,
            ctx.elapsed_ms()
        );
        updated
    }

    async fn refresh_item(
        &self,
        log_ctx: &LogContext,
        item_id: &str,
        cards: &[CardRef],
        options: &DisplayOptions,
    ) -> usize {
        let item_ctx = log_ctx.with_item(item_id);
        let request = FetchRequest::new(&self.fetcher.config().fields).forced();

        let item = match self.fetcher.fetch(item_id, &request).await {
            Ok(item) => item,
            Err(e) => {
                log::debug!("{} REENHANCE_FETCH_FAILED error={}", item_ctx, e);
                return 0;
            }
        };
        let attributes = derive_attributes(&item, options);

        let mut updated = 0;
        for &card_ref in cards {
            let rendered = self.document.with_card_mut(card_ref, |card| {
                card.clear_attribute_block();
                card.clear_action_buttons();
                let rendered = render_attributes(card, &attributes);
                render_action_buttons(card, item_id, options);
                rendered
            });
            if rendered == Some(true) {
                updated += 1;
            }
        }
        self.states.refresh_attributes(item_id, attributes);
        log::debug!("{} CARD_REENHANCED cards={}", item_ctx, updated);
        updated
    }
}
