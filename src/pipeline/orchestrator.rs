//! Enhancement pass.
//!
//! One pass over the currently attached movie cards:
//! 1. Discover unmarked cards and group them by item id
//! 2. Decide per item from the card-state record
//! 3. Fetch, derive and render every unprocessed item concurrently
//! 4. Record each item's terminal state and write the card markers
//!
//! An item already claimed by another pass is left to that pass. Its
//! settling step records the terminal state first and then looks the item's
//! cards up again, so a card attached while the fetch was in flight is
//! picked up either there or, once the state is recorded, by the next pass.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use crate::attributes::{derive_attributes, Attribute};
use crate::dom::{CardRef, Document, ATTR_ENHANCED, ATTR_ENHANCED_ERROR, MARKER_SET};
use crate::error::PassError;
use crate::logging::structured::LogContext;
use crate::metadata::client::{FetchRequest, ItemFetcher};
use crate::render::{render_action_buttons, render_attributes};
use crate::scheduler::PassRunner;
use crate::settings::{DisplayOptions, SettingsStore};

use super::context::{PassContext, PassKind};
use super::reenhance::ReEnhancer;
use super::state::{CardStatus, CardStates};

/// Cards of one item that this pass has to deal with.
struct ItemGroup {
    item_id: String,
    cards: Vec<CardRef>,
}

/// Coordinates fetch, derive and render for every eligible card.
#[derive(Clone)]
pub struct Orchestrator {
    document: Document,
    fetcher: Arc<ItemFetcher>,
    settings: SettingsStore,
    states: CardStates,
}

impl Orchestrator {
    pub fn new(document: Document, fetcher: Arc<ItemFetcher>, settings: SettingsStore) -> Self {
        Self {
            document,
            fetcher,
            settings,
            states: CardStates::new(),
        }
    }

    pub fn states(&self) -> &CardStates {
        &self.states
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn fetcher(&self) -> &Arc<ItemFetcher> {
        &self.fetcher
    }

    /// A re-enhancer sharing this orchestrator's document, fetcher,
    /// settings and card states.
    pub fn re_enhancer(&self) -> ReEnhancer {
        ReEnhancer::new(
            self.document.clone(),
            Arc::clone(&self.fetcher),
            self.settings.clone(),
            self.states.clone(),
        )
    }

    /// Run one pass. Returns how many cards got an attribute block.
    ///
    /// Per-card failures never fail the pass; they leave the card errored.
    pub async fn run_pass(&self) -> Result<usize, PassError> {
        let ctx = PassContext::new(PassKind::Enhance);
        let log_ctx = ctx.log_context();
        self.fetcher.config().validate()?;

        // Snapshot so every card in this pass renders under the same options
        let options = self.settings.current();

        // [1] DISCOVER
        let groups = self.discover(&log_ctx);
        log::info!("{} PASS_START items={}", log_ctx, groups.len());

        // [2] DECIDE
        let mut rendered = 0;
        let mut to_fetch = Vec::new();
        for group in groups {
            let item_ctx = log_ctx.with_item(&group.item_id);
            match self.states.status(&group.item_id) {
                Some(CardStatus::Enhanced) => {
                    let attributes = self
                        .states
                        .record(&group.item_id)
                        .map(|r| r.attributes)
                        .unwrap_or_default();
                    log::debug!(
                        "{} CARD_FROM_STATE cards={}",
                        item_ctx,
                        group.cards.len()
                    );
                    rendered +=
                        self.apply(&group.item_id, &group.cards, &attributes, &options);
                }
                Some(CardStatus::Errored) => {
                    log::debug!("{} CARD_SKIPPED reason=errored", item_ctx);
                    self.mark_errored(&group.cards);
                }
                Some(CardStatus::Pending) => {
                    log::debug!("{} CARD_SKIPPED reason=in_flight", item_ctx);
                }
                None => {
                    if self.states.claim(&group.item_id) {
                        to_fetch.push(group);
                    }
                }
            }
        }

        // [3] FAN OUT
        let outcomes = join_all(
            to_fetch
                .iter()
                .map(|group| self.enhance_item(&log_ctx, group, &options)),
        )
        .await;
        rendered += outcomes.into_iter().sum::<usize>();

        log::info!(
            "{} PASS_COMPLETE fetched={} rendered={} elapsed_ms={}",
            log_ctx,
            to_fetch.len(),
            rendered,
            ctx.elapsed_ms()
        );
        Ok(rendered)
    }

    /// Forget all card state and strip every marker and injected element.
    pub fn reset(&self) {
        let forgotten = self.states.reset();
        self.document.for_each_card_mut(|card| card.reset_enhancement());
        log::info!("STATE_RESET records={}", forgotten);
    }

    fn discover(&self, log_ctx: &LogContext) -> Vec<ItemGroup> {
        let mut groups: Vec<ItemGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for card_ref in self.document.find_movie_cards() {
            let item_id = self
                .document
                .with_card(card_ref, |card| {
                    if card.is_marked_enhanced() || card.is_marked_errored() {
                        return None;
                    }
                    match card.item_id() {
                        Some(id) => Some(id.to_string()),
                        None => {
                            log::debug!("{} CARD_SKIPPED reason=no_item_id", log_ctx);
                            None
                        }
                    }
                })
                .flatten();
            let Some(item_id) = item_id else {
                continue;
            };

            match index.get(&item_id) {
                Some(&i) => groups[i].cards.push(card_ref),
                None => {
                    index.insert(item_id.clone(), groups.len());
                    groups.push(ItemGroup {
                        item_id,
                        cards: vec![card_ref],
                    });
                }
            }
        }
        groups
    }

    async fn enhance_item(
        &self,
        log_ctx: &LogContext,
        group: &ItemGroup,
        options: &DisplayOptions,
    ) -> usize {
        let item_ctx = log_ctx.with_item(&group.item_id);
        let request = FetchRequest::new(&self.fetcher.config().fields);

        match self.fetcher.fetch(&group.item_id, &request).await {
            Ok(item) => {
                let attributes = derive_attributes(&item, options);
                self.states.mark_enhanced(&group.item_id, attributes.clone());
                let cards = self.settling_cards(group);
                let rendered = self.apply(&group.item_id, &cards, &attributes, options);
                log::debug!(
                    "{} CARD_ENHANCED attributes={} cards={} rendered={}",
                    item_ctx,
                    attributes.len(),
                    cards.len(),
                    rendered
                );
                rendered
            }
            Err(e) => {
                log::warn!("{} CARD_FETCH_FAILED error={}", item_ctx, e);
                self.states.mark_errored(&group.item_id);
                self.mark_errored(&self.settling_cards(group));
                0
            }
        }
    }

    /// Unmarked cards of the group's item as the document stands now.
    ///
    /// Called after the item's state is recorded. Includes cards attached
    /// after discovery, which a concurrent pass skipped as in flight.
    fn settling_cards(&self, group: &ItemGroup) -> Vec<CardRef> {
        self.document
            .cards_for_item(&group.item_id)
            .into_iter()
            .filter(|&card_ref| {
                self.document
                    .with_card(card_ref, |card| {
                        !card.is_marked_enhanced() && !card.is_marked_errored()
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Render into every card and mark it enhanced.
    fn apply(
        &self,
        item_id: &str,
        cards: &[CardRef],
        attributes: &[Attribute],
        options: &DisplayOptions,
    ) -> usize {
        let mut rendered = 0;
        for &card_ref in cards {
            let injected = self.document.with_card_mut(card_ref, |card| {
                let injected = render_attributes(card, attributes);
                render_action_buttons(card, item_id, options);
                card.set_attribute(ATTR_ENHANCED, MARKER_SET);
                injected
            });
            // Cards removed mid-pass come back as None
            if injected == Some(true) {
                rendered += 1;
            }
        }
        rendered
    }

    fn mark_errored(&self, cards: &[CardRef]) {
        for &card_ref in cards {
            self.document
                .with_card_mut(card_ref, |card| card.set_attribute(ATTR_ENHANCED_ERROR, MARKER_SET));
        }
    }
}

#[async_trait]
impl PassRunner for Orchestrator {
    async fn run_pass(&self) -> Result<usize, PassError> {
        Orchestrator::run_pass(self).await
    }
}
