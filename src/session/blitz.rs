use std::collections::BTreeMap;

use crate::deck::{CardId, CardStore};
use crate::session::context::{Continuation, SessionContext};
use crate::session::timer::TaskId;

/// Quick-reveal orbit mode: click to flip, move away to let it fade out.
#[derive(Debug, Default)]
pub struct BlitzBoard {
    fade_tasks: BTreeMap<CardId, TaskId>,
}

impl BlitzBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reveal a card and count the study. Already revealed cards stay as is.
    pub fn click(&mut self, ctx: &mut SessionContext, store: &mut CardStore, id: CardId) -> bool {
        if !ctx.queue.reveal(id) {
            return false;
        }
        store.increment_study_count(id);
        if let Some(card) = store.get(id) {
            ctx.queue.sync_study_count(id, card.study_count);
        }
        true
    }

    /// The pointer left a card. Revealed cards start fading out.
    pub fn pointer_leave(&mut self, ctx: &mut SessionContext, id: CardId) -> bool {
        if !ctx.queue.begin_fade(id) {
            return false;
        }
        let task = ctx.schedule(ctx.settings.fade_time, Continuation::BlitzFadeOut(id));
        self.fade_tasks.insert(id, task);
        true
    }

    pub fn fade_out(&mut self, ctx: &mut SessionContext, id: CardId) {
        self.fade_tasks.remove(&id);
        if !ctx.queue.is_fading(id) {
            return;
        }
        ctx.queue.remove_from_active(id);
        ctx.queue.fill(&mut ctx.rng);
        ctx.finish_if_exhausted();
    }

    /// Secondary click sends an unrevealed card back to the pending tail.
    pub fn requeue(&mut self, ctx: &mut SessionContext, id: CardId) -> bool {
        if ctx.queue.is_revealed(id) || !ctx.queue.requeue_active(id) {
            return false;
        }
        ctx.queue.fill(&mut ctx.rng);
        true
    }

    pub fn is_fading(&self, id: CardId) -> bool {
        self.fade_tasks.contains_key(&id)
    }
}
