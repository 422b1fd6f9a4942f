use std::collections::{BTreeSet, VecDeque};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::deck::{Card, CardId};
use crate::engine::physics::{self, Bounds, Physics, Spawner};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StudyMode {
    Learn,
    Blitz,
    Challenge,
}

impl StudyMode {
    pub const ALL: [StudyMode; 3] = [StudyMode::Learn, StudyMode::Blitz, StudyMode::Challenge];

    /// Blitz and Challenge float many cards around the screen.
    pub fn is_orbit(self) -> bool {
        !matches!(self, StudyMode::Learn)
    }

    pub fn label(self) -> &'static str {
        match self {
            StudyMode::Learn => "Learn",
            StudyMode::Blitz => "Blitz",
            StudyMode::Challenge => "Challenge",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueuedCard {
    pub card: Card,
    pub physics: Physics,
}

impl QueuedCard {
    pub fn id(&self) -> CardId {
        self.card.id
    }
}

/// Active set plus pending queue for one study session.
///
/// Every card of the source deck sits in exactly one of `active`, `pending`
/// or `removed` from `start` until the session is dropped.
#[derive(Clone, Debug)]
pub struct SessionQueue {
    mode: StudyMode,
    max_active: usize,
    active: Vec<QueuedCard>,
    pending: VecDeque<QueuedCard>,
    removed: Vec<CardId>,
    revealed: BTreeSet<CardId>,
    fading: BTreeSet<CardId>,
    source_len: usize,
    spawner: Spawner,
}

impl SessionQueue {
    pub fn start<R: Rng + ?Sized>(
        ordered: Vec<Card>,
        mode: StudyMode,
        max_active: usize,
        spawner: Spawner,
        rng: &mut R,
    ) -> Self {
        let max_active = max_active.max(1);
        let source_len = ordered.len();
        let mut queue = Self {
            mode,
            max_active,
            active: Vec::with_capacity(max_active.min(source_len)),
            pending: VecDeque::with_capacity(source_len.saturating_sub(max_active)),
            removed: Vec::new(),
            revealed: BTreeSet::new(),
            fading: BTreeSet::new(),
            source_len,
            spawner,
        };
        for (i, card) in ordered.into_iter().enumerate() {
            if i < max_active {
                let physics = queue.entry_physics(rng);
                queue.active.push(QueuedCard { card, physics });
            } else {
                queue.pending.push_back(QueuedCard {
                    card,
                    physics: Physics::default(),
                });
            }
        }
        log::debug!(
            "{} session: {} active, {} pending",
            mode.label(),
            queue.active.len(),
            queue.pending.len()
        );
        queue
    }

    fn entry_physics<R: Rng + ?Sized>(&self, rng: &mut R) -> Physics {
        if self.mode.is_orbit() {
            self.spawner.spawn(rng)
        } else {
            Physics::default()
        }
    }

    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn active(&self) -> &[QueuedCard] {
        &self.active
    }

    pub fn pending(&self) -> impl Iterator<Item = &QueuedCard> {
        self.pending.iter()
    }

    pub fn pending_ids(&self) -> Vec<CardId> {
        self.pending.iter().map(QueuedCard::id).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn removed(&self) -> &[CardId] {
        &self.removed
    }

    pub fn revealed(&self) -> &BTreeSet<CardId> {
        &self.revealed
    }

    pub fn fading(&self) -> &BTreeSet<CardId> {
        &self.fading
    }

    pub fn head(&self) -> Option<&QueuedCard> {
        self.active.first()
    }

    pub fn get_active(&self, id: CardId) -> Option<&QueuedCard> {
        self.active.iter().find(|q| q.id() == id)
    }

    pub fn is_active(&self, id: CardId) -> bool {
        self.get_active(id).is_some()
    }

    pub fn is_pending(&self, id: CardId) -> bool {
        self.pending.iter().any(|q| q.id() == id)
    }

    pub fn is_revealed(&self, id: CardId) -> bool {
        self.revealed.contains(&id)
    }

    pub fn is_fading(&self, id: CardId) -> bool {
        self.fading.contains(&id)
    }

    /// Keep the latest study count on a queued copy after the store changed it.
    pub fn sync_study_count(&mut self, id: CardId, study_count: u32) {
        for q in self.active.iter_mut().chain(self.pending.iter_mut()) {
            if q.id() == id {
                q.card.study_count = study_count;
            }
        }
    }

    fn take_active(&mut self, id: CardId) -> Option<QueuedCard> {
        let idx = self.active.iter().position(|q| q.id() == id)?;
        self.revealed.remove(&id);
        self.fading.remove(&id);
        Some(self.active.remove(idx))
    }

    /// Drop a card from this session. Does not refill.
    pub fn remove_from_active(&mut self, id: CardId) -> Option<Card> {
        let taken = self.take_active(id)?;
        self.removed.push(id);
        Some(taken.card)
    }

    /// Append to the pending tail. Cards already queued are ignored.
    pub fn requeue(&mut self, card: QueuedCard) -> bool {
        let id = card.id();
        if self.is_active(id) || self.is_pending(id) {
            return false;
        }
        self.pending.push_back(card);
        true
    }

    pub fn requeue_active(&mut self, id: CardId) -> bool {
        match self.take_active(id) {
            Some(card) => self.requeue(card),
            None => false,
        }
    }

    /// Move one pending card into a free orbit slot.
    pub fn refill_from_pending<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<CardId> {
        if !self.mode.is_orbit() || self.active.len() >= self.max_active {
            return None;
        }
        let mut next = self.pending.pop_front()?;
        next.physics = self.spawner.spawn(rng);
        let id = next.id();
        self.active.push(next);
        Some(id)
    }

    /// Refill until the orbit is full or nothing is pending.
    pub fn fill<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut moved = 0;
        while self.refill_from_pending(rng).is_some() {
            moved += 1;
        }
        moved
    }

    /// Learn path: the head of `pending` becomes the single active card.
    pub fn promote_next(&mut self) -> Option<CardId> {
        if !self.active.is_empty() {
            return None;
        }
        let mut next = self.pending.pop_front()?;
        next.physics = Physics::default();
        let id = next.id();
        self.active.push(next);
        Some(id)
    }

    /// Keep the upcoming card in place and shuffle everything behind it.
    pub fn completion_shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.pending.len() > 2 {
            self.pending.make_contiguous()[1..].shuffle(rng);
        }
    }

    /// Uniformly pick a card from `active ∪ pending`, minus `exclude`, and make
    /// sure it ends up in `active`.
    pub fn pick_and_activate<R: Rng + ?Sized>(
        &mut self,
        exclude: Option<CardId>,
        rng: &mut R,
    ) -> Option<CardId> {
        let allowed = |q: &&QueuedCard| Some(q.id()) != exclude;
        let in_active = self.active.iter().filter(allowed).count();
        let in_pending = self.pending.iter().filter(allowed).count();
        let total = in_active + in_pending;
        if total == 0 {
            return None;
        }
        let pick = rng.gen_range(0..total);
        if pick < in_active {
            return self.active.iter().filter(allowed).nth(pick).map(QueuedCard::id);
        }

        let id = self
            .pending
            .iter()
            .filter(allowed)
            .nth(pick - in_active)
            .map(QueuedCard::id)?;
        let idx = self.pending.iter().position(|q| q.id() == id)?;
        let mut card = self.pending.remove(idx)?;
        card.physics = self.entry_physics(rng);
        self.active.push(card);
        Some(id)
    }

    /// Blitz: flip a card face up. Each card reveals at most once.
    pub fn reveal(&mut self, id: CardId) -> bool {
        self.is_active(id) && self.revealed.insert(id)
    }

    /// Blitz: start fading a revealed card. A second call is a no-op.
    pub fn begin_fade(&mut self, id: CardId) -> bool {
        self.is_active(id) && self.revealed.contains(&id) && self.fading.insert(id)
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.spawner.bounds = bounds;
        for q in &mut self.active {
            q.physics.x = q.physics.x.clamp(0.0, bounds.max_x());
            q.physics.y = q.physics.y.clamp(0.0, bounds.max_y());
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.spawner.bounds
    }

    /// One physics frame for every orbiting card that is not face up.
    pub fn advance_physics(&mut self) {
        if !self.mode.is_orbit() {
            return;
        }
        let bounds = self.spawner.bounds;
        for q in &mut self.active {
            if !self.revealed.contains(&q.card.id) {
                q.physics = physics::step(q.physics, &bounds);
            }
        }
    }

    pub fn remaining(&self) -> usize {
        (self.active.len() + self.pending.len()).saturating_sub(self.revealed.len())
    }

    pub fn is_exhausted(&self) -> bool {
        self.active.is_empty() && self.pending.is_empty()
    }

    /// Every source card is in exactly one of active, pending, removed.
    pub fn is_conserved(&self) -> bool {
        let mut seen = BTreeSet::new();
        let all_unique = self
            .active
            .iter()
            .map(QueuedCard::id)
            .chain(self.pending.iter().map(QueuedCard::id))
            .chain(self.removed.iter().copied())
            .all(|id| seen.insert(id));
        all_unique && seen.len() == self.source_len
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::deck::LanguagePair;

    fn cards(n: u64) -> Vec<Card> {
        (1..=n)
            .map(|id| Card::new(id, &LanguagePair::default(), "f", "b", "A"))
            .collect()
    }

    fn spawner() -> Spawner {
        Spawner::new(Bounds::new(800.0, 600.0, 128.0, 80.0), 1.0)
    }

    fn queue(n: u64, mode: StudyMode, max_active: usize) -> (SessionQueue, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(11);
        let q = SessionQueue::start(cards(n), mode, max_active, spawner(), &mut rng);
        (q, rng)
    }

    fn active_ids(q: &SessionQueue) -> Vec<CardId> {
        q.active().iter().map(QueuedCard::id).collect()
    }

    #[test]
    fn start_partitions_in_order() {
        let (q, _) = queue(5, StudyMode::Blitz, 2);
        assert_eq!(active_ids(&q), vec![1, 2]);
        assert_eq!(q.pending_ids(), vec![3, 4, 5]);
        assert!(q.is_conserved());
    }

    #[test]
    fn learn_cards_have_zero_physics() {
        let (q, _) = queue(3, StudyMode::Learn, 1);
        assert_eq!(q.head().unwrap().physics, Physics::default());
    }

    #[test]
    fn remove_does_not_refill() {
        let (mut q, _) = queue(4, StudyMode::Blitz, 2);
        assert!(q.remove_from_active(1).is_some());
        assert!(q.remove_from_active(1).is_none());
        assert_eq!(active_ids(&q), vec![2]);
        assert_eq!(q.removed(), &[1]);
        assert!(q.is_conserved());
    }

    #[test]
    fn refill_moves_pending_head_in_orbit_modes_only() {
        let (mut q, mut rng) = queue(4, StudyMode::Blitz, 2);
        q.remove_from_active(1);
        assert_eq!(q.refill_from_pending(&mut rng), Some(3));
        assert_eq!(q.refill_from_pending(&mut rng), None);

        let (mut learn, mut rng) = queue(3, StudyMode::Learn, 1);
        learn.remove_from_active(1);
        assert_eq!(learn.refill_from_pending(&mut rng), None);
        assert_eq!(learn.promote_next(), Some(2));
    }

    #[test]
    fn orbit_of_one_still_refills() {
        let (mut q, mut rng) = queue(2, StudyMode::Challenge, 1);
        q.remove_from_active(1);
        assert_eq!(q.fill(&mut rng), 1);
        assert_eq!(active_ids(&q), vec![2]);
    }

    #[test]
    fn requeue_appends_without_duplicates() {
        let (mut q, _) = queue(3, StudyMode::Blitz, 2);
        assert!(q.requeue_active(1));
        assert!(!q.requeue_active(1));
        assert_eq!(q.pending_ids(), vec![3, 1]);
        let dup = q.pending().next().unwrap().clone();
        assert!(!q.requeue(dup));
        assert!(q.is_conserved());
    }

    #[test]
    fn completion_shuffle_keeps_the_preview_slot() {
        let (mut q, mut rng) = queue(10, StudyMode::Learn, 1);
        let before = q.pending_ids();
        let mut moved = false;
        for _ in 0..10 {
            q.completion_shuffle(&mut rng);
            let after = q.pending_ids();
            assert_eq!(after[0], before[0]);
            let mut sorted = after.clone();
            sorted.sort();
            assert_eq!(sorted, before);
            moved |= after != before;
        }
        assert!(moved);
    }

    #[test]
    fn pick_and_activate_draws_from_live_pool() {
        let (mut q, mut rng) = queue(3, StudyMode::Challenge, 1);
        q.requeue_active(1);
        for _ in 0..20 {
            let picked = q.pick_and_activate(Some(1), &mut rng).unwrap();
            assert_ne!(picked, 1);
            assert!(q.is_active(picked));
            assert!(q.is_conserved());
        }
    }

    #[test]
    fn pick_from_empty_pool_is_none() {
        let (mut q, mut rng) = queue(1, StudyMode::Challenge, 1);
        assert_eq!(q.pick_and_activate(Some(1), &mut rng), None);
        q.remove_from_active(1);
        assert_eq!(q.pick_and_activate(None, &mut rng), None);
    }

    #[test]
    fn reveal_and_fade_are_one_shot() {
        let (mut q, _) = queue(2, StudyMode::Blitz, 2);
        assert!(!q.begin_fade(1));
        assert!(q.reveal(1));
        assert!(!q.reveal(1));
        assert!(q.begin_fade(1));
        assert!(!q.begin_fade(1));
        assert_eq!(q.remaining(), 1);
        q.remove_from_active(1);
        assert!(q.revealed().is_empty() && q.fading().is_empty());
    }

    #[test]
    fn revealed_cards_do_not_move() {
        let (mut q, _) = queue(2, StudyMode::Blitz, 2);
        q.reveal(1);
        let frozen = q.get_active(1).unwrap().physics;
        for _ in 0..5 {
            q.advance_physics();
        }
        assert_eq!(q.get_active(1).unwrap().physics, frozen);
    }
}
