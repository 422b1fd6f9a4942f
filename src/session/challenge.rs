use crate::deck::{CardId, CardStore};
use crate::engine::normalize::answers_match;
use crate::session::context::{Continuation, SessionContext};
use crate::session::timer::{CHALLENGE_CORRECT, CHALLENGE_REVEAL, CHALLENGE_WRONG, TaskId};

pub const MAX_ATTEMPTS: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    None,
    Correct,
    Wrong,
    Revealing,
}

impl Feedback {
    /// Correct and Revealing always end in a queue mutation.
    pub fn is_terminal(self) -> bool {
        matches!(self, Feedback::Correct | Feedback::Revealing)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChallengeState {
    Idle,
    Active {
        card: CardId,
        attempts: u8,
        feedback: Feedback,
    },
}

/// Type-the-answer orbit mode.
#[derive(Debug)]
pub struct ChallengeMachine {
    state: ChallengeState,
    answer: String,
    auto_random_next: bool,
    feedback_task: Option<TaskId>,
}

impl ChallengeMachine {
    pub fn new(auto_random_next: bool) -> Self {
        Self {
            state: ChallengeState::Idle,
            answer: String::new(),
            auto_random_next,
            feedback_task: None,
        }
    }

    pub fn state(&self) -> ChallengeState {
        self.state
    }

    pub fn active_card(&self) -> Option<CardId> {
        match self.state {
            ChallengeState::Active { card, .. } => Some(card),
            ChallengeState::Idle => None,
        }
    }

    pub fn feedback(&self) -> Feedback {
        match self.state {
            ChallengeState::Active { feedback, .. } => feedback,
            ChallengeState::Idle => Feedback::None,
        }
    }

    /// A card whose removal or requeue is already scheduled.
    pub fn is_resolving(&self) -> bool {
        self.feedback().is_terminal()
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn set_answer(&mut self, answer: &str) {
        if !self.feedback().is_terminal() {
            self.answer = answer.to_string();
        }
    }

    pub fn auto_random_next(&self) -> bool {
        self.auto_random_next
    }

    pub fn toggle_auto_random_next(&mut self) {
        self.auto_random_next = !self.auto_random_next;
    }

    pub fn select(&mut self, ctx: &mut SessionContext, id: CardId) -> bool {
        if self.state != ChallengeState::Idle || !ctx.queue.is_active(id) {
            return false;
        }
        self.activate(id);
        true
    }

    fn activate(&mut self, id: CardId) {
        self.state = ChallengeState::Active {
            card: id,
            attempts: 0,
            feedback: Feedback::None,
        };
        self.answer.clear();
    }

    fn set_feedback(&mut self, feedback: Feedback, attempts: u8) {
        if let ChallengeState::Active { card, .. } = self.state {
            self.state = ChallengeState::Active {
                card,
                attempts,
                feedback,
            };
        }
    }

    fn replace_task(&mut self, ctx: &mut SessionContext, delay: std::time::Duration, next: Continuation) {
        if let Some(task) = self.feedback_task.take() {
            ctx.scheduler.cancel(task);
        }
        self.feedback_task = Some(ctx.schedule(delay, next));
    }

    /// Check the typed answer against the card's recall target.
    pub fn submit(&mut self, ctx: &mut SessionContext) -> Option<Feedback> {
        let ChallengeState::Active {
            card,
            attempts,
            feedback,
        } = self.state
        else {
            return None;
        };
        if feedback.is_terminal() {
            return None;
        }
        let target = ctx
            .queue
            .get_active(card)?
            .card
            .recall_target(&ctx.settings.langs, ctx.settings.is_reversed)
            .to_string();

        if answers_match(&self.answer, &target) {
            self.set_feedback(Feedback::Correct, attempts);
            self.replace_task(ctx, CHALLENGE_CORRECT, Continuation::ChallengeResolve(card));
            return Some(Feedback::Correct);
        }

        let attempts = attempts.saturating_add(1);
        if attempts >= MAX_ATTEMPTS {
            self.set_feedback(Feedback::Revealing, attempts);
            self.answer = target;
            self.replace_task(ctx, CHALLENGE_REVEAL, Continuation::ChallengeRequeue(card));
            Some(Feedback::Revealing)
        } else {
            self.set_feedback(Feedback::Wrong, attempts);
            self.replace_task(ctx, CHALLENGE_WRONG, Continuation::ChallengeClearWrong(card));
            Some(Feedback::Wrong)
        }
    }

    fn is_current(&self, id: CardId, feedback: Feedback) -> bool {
        self.active_card() == Some(id) && self.feedback() == feedback
    }

    /// Correct answer settled: the card leaves the session.
    pub fn resolve_correct(&mut self, ctx: &mut SessionContext, store: &mut CardStore, id: CardId) {
        if !self.is_current(id, Feedback::Correct) {
            return;
        }
        self.feedback_task = None;
        ctx.queue.remove_from_active(id);
        store.increment_study_count(id);
        self.advance_to_next(ctx, Some(id));
        ctx.finish_if_exhausted();
    }

    pub fn clear_wrong(&mut self, id: CardId) {
        if !self.is_current(id, Feedback::Wrong) {
            return;
        }
        self.feedback_task = None;
        if let ChallengeState::Active { attempts, .. } = self.state {
            self.set_feedback(Feedback::None, attempts);
        }
    }

    /// Out of attempts: the revealed card goes back to the pending tail.
    pub fn requeue_revealed(&mut self, ctx: &mut SessionContext, id: CardId) {
        if !self.is_current(id, Feedback::Revealing) {
            return;
        }
        self.feedback_task = None;
        ctx.queue.requeue_active(id);
        self.go_idle();
        ctx.queue.fill(&mut ctx.rng);
    }

    /// Give up on the active card and jump to a random other one.
    /// A card already resolving is left to its scheduled outcome.
    pub fn skip(&mut self, ctx: &mut SessionContext) -> bool {
        let Some(id) = self.active_card() else {
            return false;
        };
        if self.feedback().is_terminal() {
            return false;
        }
        if let Some(task) = self.feedback_task.take() {
            ctx.scheduler.cancel(task);
        }
        ctx.queue.requeue_active(id);
        self.advance_to_next(ctx, Some(id));
        true
    }

    /// Close the prompt without touching the queue.
    pub fn dismiss(&mut self, ctx: &mut SessionContext) -> bool {
        if self.active_card().is_none() || self.feedback().is_terminal() {
            return false;
        }
        if let Some(task) = self.feedback_task.take() {
            ctx.scheduler.cancel(task);
        }
        self.go_idle();
        true
    }

    /// Secondary click on an orbiting card while no prompt is open.
    pub fn requeue(&mut self, ctx: &mut SessionContext, id: CardId) -> bool {
        if self.state != ChallengeState::Idle || !ctx.queue.requeue_active(id) {
            return false;
        }
        ctx.queue.fill(&mut ctx.rng);
        true
    }

    fn advance_to_next(&mut self, ctx: &mut SessionContext, exclude: Option<CardId>) {
        let next = if self.auto_random_next {
            ctx.queue.pick_and_activate(exclude, &mut ctx.rng)
        } else {
            None
        };
        match next {
            Some(next) => self.activate(next),
            None => self.go_idle(),
        }
        ctx.queue.fill(&mut ctx.rng);
    }

    fn go_idle(&mut self) {
        self.state = ChallengeState::Idle;
        self.answer.clear();
    }
}
