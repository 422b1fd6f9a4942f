use crate::deck::{CardStore, Face};
use crate::session::context::{Continuation, SessionContext, SessionEvent};
use crate::session::timer::{LEARN_TRANSITION, NARRATION_DELAY, TaskId};

/// What happens to the current card once its exit animation finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LearnExit {
    /// Done with the card: leave the session, count one study.
    Drop,
    /// See it again later: back to the pending tail.
    Requeue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LearnPhase {
    Showing(Face),
    Transitioning(LearnExit),
}

/// Single-card flip-through mode.
#[derive(Debug)]
pub struct LearnMachine {
    phase: LearnPhase,
    autoplay: bool,
    narration_task: Option<TaskId>,
    autoplay_task: Option<TaskId>,
}

impl LearnMachine {
    pub fn new(ctx: &mut SessionContext) -> Self {
        let mut machine = Self {
            phase: LearnPhase::Showing(Face::Front),
            autoplay: false,
            narration_task: None,
            autoplay_task: None,
        };
        machine.on_card_changed(ctx);
        ctx.finish_if_exhausted();
        machine
    }

    pub fn phase(&self) -> LearnPhase {
        self.phase
    }

    pub fn face(&self) -> Option<Face> {
        match self.phase {
            LearnPhase::Showing(face) => Some(face),
            LearnPhase::Transitioning(_) => None,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, LearnPhase::Transitioning(_))
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// Primary click: flip the front, finish the back.
    pub fn click(&mut self, ctx: &mut SessionContext) -> bool {
        match self.phase {
            LearnPhase::Showing(Face::Front) => self.flip(ctx),
            LearnPhase::Showing(Face::Back) => self.next(ctx),
            LearnPhase::Transitioning(_) => false,
        }
    }

    /// Secondary click: flip the front, requeue the back.
    pub fn secondary(&mut self, ctx: &mut SessionContext) -> bool {
        match self.phase {
            LearnPhase::Showing(Face::Front) => self.flip(ctx),
            LearnPhase::Showing(Face::Back) => self.requeue(ctx),
            LearnPhase::Transitioning(_) => false,
        }
    }

    pub fn flip(&mut self, ctx: &mut SessionContext) -> bool {
        if self.phase != LearnPhase::Showing(Face::Front) || ctx.queue.head().is_none() {
            return false;
        }
        self.phase = LearnPhase::Showing(Face::Back);
        self.on_card_changed(ctx);
        true
    }

    pub fn next(&mut self, ctx: &mut SessionContext) -> bool {
        self.begin_exit(ctx, LearnExit::Drop)
    }

    pub fn requeue(&mut self, ctx: &mut SessionContext) -> bool {
        self.begin_exit(ctx, LearnExit::Requeue)
    }

    /// Only a card showing its back can leave.
    fn begin_exit(&mut self, ctx: &mut SessionContext, exit: LearnExit) -> bool {
        if self.phase != LearnPhase::Showing(Face::Back) || ctx.queue.head().is_none() {
            return false;
        }
        self.phase = LearnPhase::Transitioning(exit);
        self.cancel_timers(ctx);
        ctx.schedule(LEARN_TRANSITION, Continuation::LearnSettle(exit));
        true
    }

    /// Apply the exit once the transition delay has elapsed.
    pub fn settle(&mut self, ctx: &mut SessionContext, store: &mut CardStore, exit: LearnExit) {
        if self.phase != LearnPhase::Transitioning(exit) {
            return;
        }
        if let Some(id) = ctx.queue.head().map(|q| q.id()) {
            match exit {
                LearnExit::Drop => {
                    ctx.queue.remove_from_active(id);
                    store.increment_study_count(id);
                }
                LearnExit::Requeue => {
                    ctx.queue.requeue_active(id);
                }
            }
            log::debug!("learn: card {id} settled with {exit:?}");
        }

        ctx.queue.promote_next();
        if exit == LearnExit::Drop {
            ctx.queue.completion_shuffle(&mut ctx.rng);
        }
        self.phase = LearnPhase::Showing(Face::Front);
        self.on_card_changed(ctx);
        ctx.finish_if_exhausted();
    }

    pub fn toggle_autoplay(&mut self, ctx: &mut SessionContext) {
        self.autoplay = !self.autoplay;
        self.schedule_autoplay(ctx);
    }

    pub fn autoplay_tick(&mut self, ctx: &mut SessionContext) {
        self.autoplay_task = None;
        if !self.autoplay {
            return;
        }
        match self.phase {
            LearnPhase::Showing(Face::Front) => {
                self.flip(ctx);
            }
            LearnPhase::Showing(Face::Back) => {
                self.requeue(ctx);
            }
            LearnPhase::Transitioning(_) => {}
        }
    }

    /// Narrate whatever face is showing now.
    pub fn narrate_due(&mut self, ctx: &mut SessionContext) {
        self.narration_task = None;
        let LearnPhase::Showing(face) = self.phase else {
            return;
        };
        let Some(head) = ctx.queue.head() else {
            return;
        };
        let reversed = ctx.settings.is_reversed;
        let text = head
            .card
            .face_text(face, &ctx.settings.langs, reversed)
            .to_string();
        let is_target = (face == Face::Back) != reversed;
        ctx.emit(SessionEvent::Narrate { text, is_target });
    }

    /// Re-arm narration and autoplay for the card/face now showing.
    pub fn on_card_changed(&mut self, ctx: &mut SessionContext) {
        if let Some(task) = self.narration_task.take() {
            ctx.scheduler.cancel(task);
        }
        if ctx.settings.tts_enabled && ctx.queue.head().is_some() && !self.is_transitioning() {
            self.narration_task = Some(ctx.schedule(NARRATION_DELAY, Continuation::LearnNarrate));
        }
        self.schedule_autoplay(ctx);
    }

    fn schedule_autoplay(&mut self, ctx: &mut SessionContext) {
        if let Some(task) = self.autoplay_task.take() {
            ctx.scheduler.cancel(task);
        }
        if self.autoplay && !self.is_transitioning() && ctx.queue.head().is_some() {
            let delay = ctx.settings.learn_delay;
            self.autoplay_task = Some(ctx.schedule(delay, Continuation::LearnAutoplay));
        }
    }

    fn cancel_timers(&mut self, ctx: &mut SessionContext) {
        for task in [self.narration_task.take(), self.autoplay_task.take()]
            .into_iter()
            .flatten()
        {
            ctx.scheduler.cancel(task);
        }
    }
}
