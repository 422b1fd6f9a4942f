use std::time::Duration;

use rand::rngs::SmallRng;

use crate::deck::{CardId, LanguagePair};
use crate::session::learn::LearnExit;
use crate::session::queue::SessionQueue;
use crate::session::timer::{Scheduler, TaskId};

/// Deferred work a mode machine asked the scheduler to run later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    LearnSettle(LearnExit),
    LearnAutoplay,
    LearnNarrate,
    BlitzFadeOut(CardId),
    ChallengeResolve(CardId),
    ChallengeClearWrong(CardId),
    ChallengeRequeue(CardId),
}

/// Side effects the view layer has to carry out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Narrate { text: String, is_target: bool },
    Finished,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub max_orbit_size: usize,
    pub card_speed: f64,
    pub fade_time: Duration,
    pub is_reversed: bool,
    pub learn_delay: Duration,
    pub tts_enabled: bool,
    pub auto_random_next: bool,
    pub langs: LanguagePair,
    pub card_width: f64,
    pub card_height: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_orbit_size: 50,
            card_speed: 1.0,
            fade_time: Duration::from_millis(3000),
            is_reversed: false,
            learn_delay: Duration::from_secs(2),
            tts_enabled: false,
            auto_random_next: false,
            langs: LanguagePair::default(),
            card_width: 128.0,
            card_height: 80.0,
        }
    }
}

/// Everything a mode machine may touch besides the card store.
pub struct SessionContext {
    pub queue: SessionQueue,
    pub scheduler: Scheduler<Continuation>,
    pub settings: SessionSettings,
    pub rng: SmallRng,
    outbox: Vec<SessionEvent>,
    finished: bool,
}

impl SessionContext {
    pub fn new(queue: SessionQueue, settings: SessionSettings, rng: SmallRng) -> Self {
        Self {
            queue,
            scheduler: Scheduler::new(),
            settings,
            rng,
            outbox: Vec::new(),
            finished: false,
        }
    }

    pub fn schedule(&mut self, delay: Duration, continuation: Continuation) -> TaskId {
        self.scheduler.schedule(delay, continuation)
    }

    pub fn emit(&mut self, event: SessionEvent) {
        self.outbox.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Emit `Finished` once, the first time the queue runs dry.
    pub fn finish_if_exhausted(&mut self) {
        if !self.finished && self.queue.is_exhausted() {
            self.finished = true;
            log::debug!("{} session finished", self.queue.mode().label());
            self.emit(SessionEvent::Finished);
        }
    }
}
