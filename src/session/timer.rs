use std::time::Duration;

pub const LEARN_TRANSITION: Duration = Duration::from_millis(600);
pub const CHALLENGE_CORRECT: Duration = Duration::from_millis(800);
pub const CHALLENGE_WRONG: Duration = Duration::from_millis(1000);
pub const CHALLENGE_REVEAL: Duration = Duration::from_millis(2500);
pub const NARRATION_DELAY: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

#[derive(Clone, Debug)]
struct Task<T> {
    id: TaskId,
    due: Duration,
    payload: T,
}

/// Cancellable one-shot continuations on a virtual clock.
///
/// The clock only moves when the owner calls [`Scheduler::pop_due`] or
/// [`Scheduler::advance_clock`], so tests drive time explicitly. Tasks due at
/// the same instant run in scheduling order.
#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    tasks: Vec<Task<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            tasks: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, delay: Duration, payload: T) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.tasks.push(Task {
            id,
            due: self.now + delay,
            payload,
        });
        id
    }

    /// Returns false when the task already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) {
        self.tasks.retain(|t| !pred(&t.payload));
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Time of the earliest pending task.
    pub fn next_due(&self) -> Option<Duration> {
        self.tasks.iter().map(|t| t.due).min()
    }

    /// Remove and return the earliest task due at or before `until`, moving
    /// the clock to its due time. Returns `None` once nothing else is due.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(idx, _)| idx)?;
        let task = self.tasks.remove(idx);
        self.now = self.now.max(task.due);
        Some(task.payload)
    }

    pub fn advance_clock(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn pops_in_due_order_and_moves_clock() {
        let mut s = Scheduler::new();
        s.schedule(ms(800), "b");
        s.schedule(ms(100), "a");
        assert_eq!(s.pop_due(ms(50)), None);
        assert_eq!(s.pop_due(ms(1000)), Some("a"));
        assert_eq!(s.now(), ms(100));
        assert_eq!(s.pop_due(ms(1000)), Some("b"));
        assert_eq!(s.now(), ms(800));
        assert_eq!(s.pop_due(ms(1000)), None);
    }

    #[test]
    fn ties_run_in_scheduling_order() {
        let mut s = Scheduler::new();
        s.schedule(ms(10), 1);
        s.schedule(ms(10), 2);
        assert_eq!(s.pop_due(ms(10)), Some(1));
        assert_eq!(s.pop_due(ms(10)), Some(2));
    }

    #[test]
    fn delays_are_relative_to_the_current_clock() {
        let mut s = Scheduler::new();
        s.advance_clock(ms(500));
        s.schedule(ms(100), ());
        assert_eq!(s.next_due(), Some(ms(600)));
        assert_eq!(s.pop_due(ms(599)), None);
        assert_eq!(s.pop_due(ms(600)), Some(()));
    }

    #[test]
    fn cancelled_tasks_never_run() {
        let mut s = Scheduler::new();
        let id = s.schedule(ms(10), "x");
        s.schedule(ms(20), "y");
        assert!(s.is_pending(id));
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        s.cancel_where(|p| *p == "y");
        assert_eq!(s.pending_count(), 0);
        assert_eq!(s.pop_due(ms(100)), None);
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut s: Scheduler<()> = Scheduler::new();
        s.advance_clock(ms(300));
        s.advance_clock(ms(100));
        assert_eq!(s.now(), ms(300));
    }
}
