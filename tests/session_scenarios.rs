use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use cardorbit::deck::{Card, CardId, CardStore, Face, LanguagePair};
use cardorbit::engine::filter::CategoryFilter;
use cardorbit::engine::physics::Bounds;
use cardorbit::session::challenge::Feedback;
use cardorbit::session::learn::{LearnExit, LearnPhase};
use cardorbit::session::{SessionEvent, SessionSettings, StudyMode, StudySession};

fn card(id: CardId, front: &str, back: &str, count: u32) -> Card {
    let mut c = Card::new(id, &LanguagePair::default(), front, back, "Test");
    c.study_count = count;
    c
}

fn store(cards: Vec<Card>) -> CardStore {
    CardStore::from_cards(cards, LanguagePair::default())
}

fn deck(n: u64) -> CardStore {
    store(
        (1..=n)
            .map(|i| card(i, &format!("word {i}"), &format!("palabra {i}"), 0))
            .collect(),
    )
}

fn bounds() -> Bounds {
    Bounds::new(800.0, 480.0, 128.0, 80.0)
}

fn start(mode: StudyMode, store: &CardStore, settings: SessionSettings, seed: u64) -> StudySession {
    StudySession::start(
        mode,
        store,
        &CategoryFilter::default(),
        settings,
        bounds(),
        SmallRng::seed_from_u64(seed),
    )
}

fn active_ids(session: &StudySession) -> Vec<CardId> {
    session.queue().active().iter().map(|qc| qc.id()).collect()
}

fn counts(store: &CardStore) -> Vec<u32> {
    store.cards().iter().map(|c| c.study_count).collect()
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn learn_starts_with_least_studied_card() {
    let store = store(vec![card(3, "C", "c", 2), card(1, "A", "a", 0), card(2, "B", "b", 1)]);
    let session = start(StudyMode::Learn, &store, SessionSettings::default(), 1);

    assert_eq!(active_ids(&session), vec![1]);
    assert_eq!(session.queue().pending_ids(), vec![2, 3]);
    assert_eq!(session.remaining(), 3);
    assert!(session.queue().is_conserved());
}

#[test]
fn challenge_reveals_after_three_misses_and_requeues_to_tail() {
    let mut store = deck(3);
    let settings = SessionSettings {
        max_orbit_size: 2,
        ..SessionSettings::default()
    };
    let mut session = start(StudyMode::Challenge, &store, settings, 2);
    let target = active_ids(&session)[0];

    session.primary(&mut store, Some(target));
    assert_eq!(session.challenge().and_then(|c| c.active_card()), Some(target));
    assert!(!session.is_animating());

    let mut seen = Vec::new();
    for _ in 0..3 {
        session.set_answer("definitely wrong");
        session.submit();
        seen.push(session.challenge().map(|c| c.feedback()));
    }
    assert_eq!(
        seen,
        vec![
            Some(Feedback::Wrong),
            Some(Feedback::Wrong),
            Some(Feedback::Revealing)
        ]
    );
    let expected = format!("palabra {target}");
    assert_eq!(session.challenge().map(|c| c.answer()), Some(expected.as_str()));

    session.advance(ms(2499), &mut store);
    assert!(session.queue().is_active(target));

    session.advance(ms(1), &mut store);
    assert_eq!(session.queue().pending_ids().last(), Some(&target));
    assert!(!session.queue().is_active(target));
    assert_eq!(session.challenge().and_then(|c| c.active_card()), None);
    assert_eq!(counts(&store), vec![0, 0, 0]);
    assert!(session.queue().is_conserved());
}

#[test]
fn challenge_revealed_answer_is_the_recall_target() {
    let mut store = store(vec![card(1, "dog", "perro", 0)]);
    let mut session = start(StudyMode::Challenge, &store, SessionSettings::default(), 3);
    session.primary(&mut store, Some(1));
    for _ in 0..3 {
        session.set_answer("gato");
        session.submit();
    }
    assert_eq!(session.challenge().map(|c| c.answer()), Some("perro"));
}

#[test]
fn challenge_correct_answer_counts_after_resolution() {
    let mut store = store(vec![card(1, "dog", "perro", 0), card(2, "cat", "gato", 0)]);
    let settings = SessionSettings {
        auto_random_next: true,
        ..SessionSettings::default()
    };
    let mut session = start(StudyMode::Challenge, &store, settings, 4);

    session.primary(&mut store, Some(1));
    session.set_answer("  PERRO! ");
    session.submit();
    assert_eq!(session.challenge().map(|c| c.feedback()), Some(Feedback::Correct));
    assert_eq!(session.remaining(), 1);
    assert_eq!(store.get(1).map(|c| c.study_count), Some(0));

    session.advance(ms(800), &mut store);
    assert_eq!(store.get(1).map(|c| c.study_count), Some(1));
    assert!(!session.queue().is_active(1));
    // Auto-next picked the only other card.
    assert_eq!(session.challenge().and_then(|c| c.active_card()), Some(2));
}

#[test]
fn blitz_reveal_then_fade_out() {
    let mut store = deck(3);
    let settings = SessionSettings {
        fade_time: ms(3000),
        ..SessionSettings::default()
    };
    let mut session = start(StudyMode::Blitz, &store, settings, 5);
    let target = active_ids(&session)[1];

    session.primary(&mut store, Some(target));
    assert!(session.queue().is_revealed(target));
    assert_eq!(store.get(target).map(|c| c.study_count), Some(1));
    assert_eq!(session.remaining(), 2);

    // A second click on a revealed card does nothing.
    session.primary(&mut store, Some(target));
    assert_eq!(store.get(target).map(|c| c.study_count), Some(1));

    session.pointer_leave(target);
    assert!(session.queue().is_fading(target));
    session.advance(ms(2999), &mut store);
    assert!(session.queue().is_active(target));
    session.advance(ms(1), &mut store);
    assert!(!session.queue().is_active(target));
    assert!(!session.queue().is_revealed(target));
    assert_eq!(session.queue().removed(), &[target]);
    assert!(session.queue().is_conserved());
}

#[test]
fn learn_next_keeps_the_preview_slot() {
    let mut store = deck(6);
    let mut session = start(StudyMode::Learn, &store, SessionSettings::default(), 6);
    let first = active_ids(&session)[0];
    let pending_before = session.queue().pending_ids();
    let successor = pending_before[0];

    session.flip();
    session.next();
    session.advance(ms(600), &mut store);

    assert_eq!(active_ids(&session), vec![successor]);
    let pending_after = session.queue().pending_ids();
    assert_eq!(pending_after[0], pending_before[1]);

    let mut expected: Vec<CardId> = pending_before[1..].to_vec();
    let mut actual = pending_after.clone();
    expected.sort_unstable();
    actual.sort_unstable();
    assert_eq!(actual, expected);
    assert_eq!(store.get(first).map(|c| c.study_count), Some(1));
    assert!(session.queue().removed().contains(&first));
}

#[test]
fn learn_exit_is_idempotent_within_transition() {
    let mut store = deck(4);
    let mut session = start(StudyMode::Learn, &store, SessionSettings::default(), 7);
    let first = active_ids(&session)[0];

    session.flip();
    session.next();
    session.next();
    session.requeue();
    assert_eq!(
        session.learn().map(|m| m.phase()),
        Some(LearnPhase::Transitioning(LearnExit::Drop))
    );
    session.advance(ms(600), &mut store);

    assert_eq!(store.get(first).map(|c| c.study_count), Some(1));
    assert_eq!(session.queue().removed(), &[first]);
    assert_eq!(session.queue().pending_len(), 2);
}

#[test]
fn conservation_holds_through_mixed_operations() {
    let mut store = deck(8);
    let settings = SessionSettings {
        max_orbit_size: 3,
        ..SessionSettings::default()
    };

    let mut session = start(StudyMode::Blitz, &store, settings.clone(), 8);
    for step in 0..12 {
        let ids = active_ids(&session);
        let Some(&id) = ids.get(step % ids.len().max(1)) else {
            break;
        };
        if step % 3 == 0 {
            session.secondary(Some(id));
        } else {
            session.primary(&mut store, Some(id));
            session.pointer_leave(id);
        }
        session.advance(ms(1000), &mut store);
        assert!(session.queue().is_conserved());
        assert!(session.queue().active().len() <= 3);
    }

    let mut session = start(StudyMode::Challenge, &store, settings, 9);
    for _ in 0..6 {
        let ids = active_ids(&session);
        let Some(&id) = ids.first() else {
            break;
        };
        session.primary(&mut store, Some(id));
        session.skip();
        session.dismiss();
        session.advance(ms(100), &mut store);
        assert!(session.queue().is_conserved());
    }
}

#[test]
fn study_counts_never_decrease_and_skips_do_not_count() {
    let mut store = deck(4);
    let before = counts(&store);
    let mut session = start(StudyMode::Challenge, &store, SessionSettings::default(), 10);
    let id = active_ids(&session)[0];

    session.primary(&mut store, Some(id));
    session.skip();
    session.secondary(Some(id));
    session.advance(ms(5000), &mut store);
    assert_eq!(counts(&store), before);

    let mut session = start(StudyMode::Learn, &store, SessionSettings::default(), 11);
    for _ in 0..4 {
        session.flip();
        session.next();
        session.advance(ms(600), &mut store);
        let now = counts(&store);
        assert!(now.iter().zip(&before).all(|(a, b)| a >= b));
    }
    assert_eq!(counts(&store), vec![1, 1, 1, 1]);
    assert!(session.is_finished());
}

#[test]
fn finished_is_emitted_once() {
    let mut store = deck(1);
    let mut session = start(StudyMode::Learn, &store, SessionSettings::default(), 12);
    session.flip();
    session.next();
    session.advance(ms(600), &mut store);
    let finished = session
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::Finished))
        .count();
    assert_eq!(finished, 1);
    session.advance(ms(600), &mut store);
    assert!(session.drain_events().is_empty());
}

#[test]
fn empty_filter_result_finishes_immediately() {
    let store = deck(3);
    let session = StudySession::start(
        StudyMode::Blitz,
        &store,
        &CategoryFilter::new(["Nope"]),
        SessionSettings::default(),
        bounds(),
        SmallRng::seed_from_u64(13),
    );
    assert!(session.is_finished());
    assert_eq!(session.remaining(), 0);
    assert!(!session.is_animating());
}

#[test]
fn stopping_cancels_pending_work() {
    let mut store = deck(3);
    let mut session = start(StudyMode::Blitz, &store, SessionSettings::default(), 14);
    let id = active_ids(&session)[0];
    session.primary(&mut store, Some(id));
    session.pointer_leave(id);
    assert!(session.is_animating());

    session.stop();
    assert!(!session.is_animating());
    session.advance(ms(10_000), &mut store);
    assert!(session.queue().is_active(id));
}

#[test]
fn learn_exits_from_the_front_face_are_ignored() {
    let mut store = deck(3);
    let mut session = start(StudyMode::Learn, &store, SessionSettings::default(), 15);
    let first = active_ids(&session)[0];

    session.next();
    session.requeue();
    assert_eq!(session.learn().map(|m| m.phase()), Some(LearnPhase::Showing(Face::Front)));
    session.advance(ms(600), &mut store);

    assert_eq!(active_ids(&session), vec![first]);
    assert_eq!(counts(&store), vec![0, 0, 0]);
    assert!(session.queue().removed().is_empty());
}

#[test]
fn skip_during_correct_still_counts_and_removes() {
    let mut store = store(vec![card(1, "dog", "perro", 0), card(2, "cat", "gato", 0)]);
    let mut session = start(StudyMode::Challenge, &store, SessionSettings::default(), 16);

    session.primary(&mut store, Some(1));
    session.set_answer("perro");
    session.submit();
    session.skip();
    assert_eq!(session.challenge().map(|c| c.feedback()), Some(Feedback::Correct));

    session.advance(ms(1000), &mut store);
    assert_eq!(store.get(1).map(|c| c.study_count), Some(1));
    assert_eq!(session.queue().removed(), &[1]);
    assert!(!session.queue().pending_ids().contains(&1));
    // Auto-next is off by default.
    assert_eq!(session.challenge().and_then(|c| c.active_card()), None);
}

#[test]
fn skip_during_reveal_keeps_the_scheduled_requeue() {
    let mut store = deck(3);
    let settings = SessionSettings {
        max_orbit_size: 3,
        ..SessionSettings::default()
    };
    let mut session = start(StudyMode::Challenge, &store, settings, 17);
    let target = active_ids(&session)[0];

    session.primary(&mut store, Some(target));
    for _ in 0..3 {
        session.set_answer("nope");
        session.submit();
    }
    session.skip();
    assert_eq!(session.challenge().and_then(|c| c.active_card()), Some(target));

    session.advance(ms(2500), &mut store);
    assert_eq!(session.challenge().and_then(|c| c.active_card()), None);
    assert!(session.queue().is_conserved());
    assert_eq!(counts(&store), vec![0, 0, 0]);
}

#[test]
fn remaining_excludes_a_resolving_challenge_card() {
    let mut store = deck(3);
    let mut session = start(StudyMode::Challenge, &store, SessionSettings::default(), 18);
    let target = active_ids(&session)[0];
    assert_eq!(session.remaining(), 3);

    session.primary(&mut store, Some(target));
    for _ in 0..2 {
        session.set_answer("nope");
        session.submit();
    }
    assert_eq!(session.challenge().map(|c| c.feedback()), Some(Feedback::Wrong));
    assert_eq!(session.remaining(), 3);

    session.set_answer("nope");
    session.submit();
    assert_eq!(session.challenge().map(|c| c.feedback()), Some(Feedback::Revealing));
    assert_eq!(session.remaining(), 2);

    session.advance(ms(2500), &mut store);
    assert_eq!(session.remaining(), 3);
}
