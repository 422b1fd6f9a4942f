use std::time::Duration;

use rand::rngs::SmallRng;

use crate::deck::{CardId, CardStore};
use crate::engine::filter::{self, CategoryFilter};
use crate::engine::physics::{Bounds, FrameLoop, FrameToken, Spawner};
use crate::session::blitz::BlitzBoard;
use crate::session::challenge::ChallengeMachine;
use crate::session::context::{Continuation, SessionContext, SessionEvent, SessionSettings};
use crate::session::learn::LearnMachine;
use crate::session::queue::{SessionQueue, StudyMode};

pub enum ModeState {
    Learn(LearnMachine),
    Blitz(BlitzBoard),
    Challenge(ChallengeMachine),
}

/// One running study session: the queue, its mode machine and the frame loop.
///
/// Starting a new session replaces the old one wholesale; nothing scheduled by
/// a previous session can fire into a new one.
pub struct StudySession {
    ctx: SessionContext,
    state: ModeState,
    frames: FrameLoop,
}

impl StudySession {
    pub fn start(
        mode: StudyMode,
        store: &CardStore,
        filter: &CategoryFilter,
        settings: SessionSettings,
        bounds: Bounds,
        mut rng: SmallRng,
    ) -> Self {
        let ordered = filter::order(store.cards(), filter, &mut rng);
        let max_active = match mode {
            StudyMode::Learn => 1,
            StudyMode::Blitz | StudyMode::Challenge => settings.max_orbit_size,
        };
        let spawner = Spawner::new(bounds, settings.card_speed);
        let queue = SessionQueue::start(ordered, mode, max_active, spawner, &mut rng);
        let auto_random_next = settings.auto_random_next;
        let mut ctx = SessionContext::new(queue, settings, rng);
        let state = match mode {
            StudyMode::Learn => ModeState::Learn(LearnMachine::new(&mut ctx)),
            StudyMode::Blitz => ModeState::Blitz(BlitzBoard::new()),
            StudyMode::Challenge => ModeState::Challenge(ChallengeMachine::new(auto_random_next)),
        };
        log::debug!("started {} session with filter {}", mode.label(), filter.label());
        let mut session = Self {
            ctx,
            state,
            frames: FrameLoop::default(),
        };
        session.ctx.finish_if_exhausted();
        session.sync_frames();
        session
    }

    pub fn mode(&self) -> StudyMode {
        self.ctx.queue.mode()
    }

    pub fn queue(&self) -> &SessionQueue {
        &self.ctx.queue
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.ctx.settings
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    pub fn learn(&self) -> Option<&LearnMachine> {
        match &self.state {
            ModeState::Learn(m) => Some(m),
            _ => None,
        }
    }

    pub fn challenge(&self) -> Option<&ChallengeMachine> {
        match &self.state {
            ModeState::Challenge(m) => Some(m),
            _ => None,
        }
    }

    pub fn now(&self) -> Duration {
        self.ctx.scheduler.now()
    }

    /// Cards still to study, excluding revealed cards and a challenge card
    /// that is being resolved.
    pub fn remaining(&self) -> usize {
        let resolving = self.challenge().is_some_and(ChallengeMachine::is_resolving);
        self.ctx.queue.remaining().saturating_sub(usize::from(resolving))
    }

    pub fn is_finished(&self) -> bool {
        self.ctx.is_finished()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.ctx.drain_events()
    }

    /// Primary click or Enter. `target` is the card under the pointer in
    /// orbit modes.
    pub fn primary(&mut self, store: &mut CardStore, target: Option<CardId>) {
        match &mut self.state {
            ModeState::Learn(m) => {
                m.click(&mut self.ctx);
            }
            ModeState::Blitz(b) => {
                if let Some(id) = target {
                    b.click(&mut self.ctx, store, id);
                }
            }
            ModeState::Challenge(c) => {
                if let Some(id) = target {
                    c.select(&mut self.ctx, id);
                }
            }
        }
        self.sync_frames();
    }

    pub fn secondary(&mut self, target: Option<CardId>) {
        match &mut self.state {
            ModeState::Learn(m) => {
                m.secondary(&mut self.ctx);
            }
            ModeState::Blitz(b) => {
                if let Some(id) = target {
                    b.requeue(&mut self.ctx, id);
                }
            }
            ModeState::Challenge(c) => {
                if let Some(id) = target {
                    c.requeue(&mut self.ctx, id);
                }
            }
        }
        self.sync_frames();
    }

    pub fn pointer_leave(&mut self, id: CardId) {
        if let ModeState::Blitz(b) = &mut self.state {
            b.pointer_leave(&mut self.ctx, id);
        }
    }

    pub fn flip(&mut self) {
        if let ModeState::Learn(m) = &mut self.state {
            m.flip(&mut self.ctx);
        }
    }

    pub fn next(&mut self) {
        if let ModeState::Learn(m) = &mut self.state {
            m.next(&mut self.ctx);
        }
    }

    pub fn requeue(&mut self) {
        if let ModeState::Learn(m) = &mut self.state {
            m.requeue(&mut self.ctx);
        }
    }

    pub fn toggle_autoplay(&mut self) {
        if let ModeState::Learn(m) = &mut self.state {
            m.toggle_autoplay(&mut self.ctx);
        }
    }

    pub fn set_narration(&mut self, enabled: bool) {
        self.ctx.settings.tts_enabled = enabled;
        if let ModeState::Learn(m) = &mut self.state {
            m.on_card_changed(&mut self.ctx);
        }
    }

    pub fn set_answer(&mut self, answer: &str) {
        if let ModeState::Challenge(c) = &mut self.state {
            c.set_answer(answer);
        }
    }

    pub fn submit(&mut self) {
        if let ModeState::Challenge(c) = &mut self.state {
            c.submit(&mut self.ctx);
        }
    }

    pub fn skip(&mut self) {
        if let ModeState::Challenge(c) = &mut self.state {
            c.skip(&mut self.ctx);
        }
        self.sync_frames();
    }

    pub fn dismiss(&mut self) {
        if let ModeState::Challenge(c) = &mut self.state {
            c.dismiss(&mut self.ctx);
        }
        self.sync_frames();
    }

    pub fn toggle_auto_random_next(&mut self) {
        if let ModeState::Challenge(c) = &mut self.state {
            c.toggle_auto_random_next();
        }
    }

    pub fn resize(&mut self, bounds: Bounds) {
        self.ctx.queue.set_bounds(bounds);
    }

    /// Advance the virtual clock by `dt`, running every continuation that
    /// falls due against the live session state.
    pub fn advance(&mut self, dt: Duration, store: &mut CardStore) {
        let until = self.ctx.scheduler.now() + dt;
        while let Some(task) = self.ctx.scheduler.pop_due(until) {
            self.dispatch(task, store);
        }
        self.ctx.scheduler.advance_clock(until);
        self.sync_frames();
    }

    fn dispatch(&mut self, task: Continuation, store: &mut CardStore) {
        let ctx = &mut self.ctx;
        match (&mut self.state, task) {
            (ModeState::Learn(m), Continuation::LearnSettle(exit)) => m.settle(ctx, store, exit),
            (ModeState::Learn(m), Continuation::LearnAutoplay) => m.autoplay_tick(ctx),
            (ModeState::Learn(m), Continuation::LearnNarrate) => m.narrate_due(ctx),
            (ModeState::Blitz(b), Continuation::BlitzFadeOut(id)) => b.fade_out(ctx, id),
            (ModeState::Challenge(c), Continuation::ChallengeResolve(id)) => {
                c.resolve_correct(ctx, store, id)
            }
            (ModeState::Challenge(c), Continuation::ChallengeClearWrong(id)) => c.clear_wrong(id),
            (ModeState::Challenge(c), Continuation::ChallengeRequeue(id)) => {
                c.requeue_revealed(ctx, id)
            }
            (_, other) => log::warn!("dropping continuation {other:?} for another mode"),
        }
    }

    /// Physics runs in orbit modes while no challenge prompt is open.
    fn sync_frames(&mut self) {
        let prompt_open = self.challenge().is_some_and(|c| c.active_card().is_some());
        let should_run = self.mode().is_orbit() && !prompt_open && !self.ctx.is_finished();
        self.frames.sync(should_run);
    }

    pub fn frame_token(&self) -> Option<FrameToken> {
        self.frames.token()
    }

    /// Step physics once. Frames from a stopped or restarted loop are ignored.
    pub fn frame(&mut self, token: FrameToken) -> bool {
        if !self.frames.accepts(token) {
            return false;
        }
        self.ctx.queue.advance_physics();
        true
    }

    pub fn is_animating(&self) -> bool {
        self.frames.is_running()
    }

    /// Leave the mode: nothing scheduled survives and physics stops.
    pub fn stop(&mut self) {
        self.ctx.scheduler.cancel_all();
        self.frames.stop();
    }
}
