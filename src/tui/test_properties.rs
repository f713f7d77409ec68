//! Property-based tests for viewport, classifier, merge and reducer invariants.

use std::sync::Arc;

use proptest::prelude::*;

use super::input::Key;
use super::model::{DashboardModel, DashboardMsg, DashboardSettings};
use super::selection::RefreshContext;
use super::update::update;
use super::viewport::{ScrollOutcome, ViewportController};
use crate::logs::classify::{BOUNDARY_MARKERS, LineCategory, classify};
use crate::logs::merger::concat_oldest_first;
use crate::source::RawEvent;
use crate::source::memory::MemoryBackend;

// ──────────────────── strategies ────────────────────

#[derive(Debug, Clone)]
enum ViewportOp {
    Append(usize),
    SetTotal(usize),
    Scroll(isize),
    FollowTail,
    Resize(usize),
    Reset,
    Cursor(isize),
}

fn arb_viewport_op() -> impl Strategy<Value = ViewportOp> {
    prop_oneof![
        (0usize..50).prop_map(ViewportOp::Append),
        (0usize..200).prop_map(ViewportOp::SetTotal),
        (-60isize..60).prop_map(ViewportOp::Scroll),
        Just(ViewportOp::FollowTail),
        (0usize..40).prop_map(ViewportOp::Resize),
        Just(ViewportOp::Reset),
        (-3isize..=3).prop_map(ViewportOp::Cursor),
    ]
}

fn apply(view: &mut ViewportController, op: &ViewportOp) {
    match *op {
        ViewportOp::Append(n) => view.append(n),
        ViewportOp::SetTotal(n) => view.set_total_lines(n),
        ViewportOp::Scroll(d) => {
            view.scroll_by(d);
        }
        ViewportOp::FollowTail => view.follow_tail(),
        ViewportOp::Resize(h) => view.set_visible_height(h),
        ViewportOp::Reset => view.reset(),
        ViewportOp::Cursor(d) => view.cursor_move(d),
    }
}

fn assert_viewport_invariants(view: &ViewportController) {
    let state = view.state();
    assert!(state.origin <= view.max_origin(), "origin out of range: {view:?}");
    if view.total_lines() == 0 {
        assert_eq!(state.cursor, 0);
    } else {
        assert!(state.cursor < view.total_lines(), "cursor out of range: {view:?}");
    }
    if state.autoscroll && view.total_lines() > 0 {
        assert!(view.is_visible(view.total_lines() - 1), "tail hidden: {view:?}");
    }
}

fn arb_key() -> impl Strategy<Value = Key> {
    prop_oneof![
        Just(Key::Up),
        Just(Key::Down),
        Just(Key::PageUp),
        Just(Key::PageDown),
        Just(Key::Home),
        Just(Key::End),
        Just(Key::Enter),
        Just(Key::Tab),
        Just(Key::Char('j')),
        Just(Key::Char('k')),
        Just(Key::Char('G')),
        Just(Key::Char('x')),
        Just(Key::Char('q')),
    ]
}

#[derive(Debug, Clone)]
enum Step {
    Key(Key),
    Resize(u16, u16),
    /// Deliver the oldest pending refresh.
    Deliver,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        6 => arb_key().prop_map(Step::Key),
        1 => (20u16..200, 4u16..80).prop_map(|(c, r)| Step::Resize(c, r)),
        3 => Just(Step::Deliver),
    ]
}

fn backend() -> Arc<MemoryBackend> {
    let events = |n: i64| -> Vec<RawEvent> {
        (0..n).map(|i| RawEvent::new(i, format!("line {i}"))).collect()
    };
    Arc::new(
        MemoryBackend::new()
            .with_entity("alpha", &[("runtime", "python3.12")])
            .with_entity("beta", &[])
            .with_entity("gamma", &[])
            .with_stream("alpha", "a1", 50, events(30))
            .with_stream("alpha", "a2", 40, events(12))
            .with_stream("beta", "b1", 10, events(3)),
    )
}

// ──────────────────── properties ────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any sequence of viewport operations keeps origin and cursor in range.
    #[test]
    fn viewport_invariants_hold(
        height in 1usize..30,
        ops in prop::collection::vec(arb_viewport_op(), 1..60)
    ) {
        let mut view = ViewportController::new(height);
        for op in &ops {
            apply(&mut view, op);
            assert_viewport_invariants(&view);
        }
    }

    /// Scrolling forward far enough always re-engages live tail.
    #[test]
    fn large_forward_scroll_follows_tail(
        height in 1usize..30,
        total in 0usize..300,
        back in 0isize..300,
    ) {
        let mut view = ViewportController::new(height);
        view.append(total);
        view.scroll_by(-back);
        let outcome = view.scroll_by(isize::try_from(total + height).unwrap_or(isize::MAX).max(1));
        prop_assert_eq!(outcome, ScrollOutcome::FollowingTail);
        prop_assert!(view.state().autoscroll);
        prop_assert_eq!(view.state().origin, view.max_origin());
    }

    /// Scrolling up never leaves autoscroll engaged.
    #[test]
    fn backward_scroll_pauses(total in 0usize..200, delta in 1isize..100) {
        let mut view = ViewportController::new(10);
        view.append(total);
        prop_assert_eq!(view.scroll_by(-delta), ScrollOutcome::Moved);
        prop_assert!(!view.state().autoscroll);
    }

    /// Classification is a pure function of the message prefix.
    #[test]
    fn classifier_matches_marker_prefix(text in ".{0,80}", marker in 0usize..3, prefixed in any::<bool>()) {
        let message = if prefixed {
            format!("{}{text}", BOUNDARY_MARKERS[marker])
        } else {
            text.clone()
        };
        let expected = if BOUNDARY_MARKERS.iter().any(|m| message.starts_with(m)) {
            LineCategory::Boundary
        } else {
            LineCategory::Plain
        };
        prop_assert_eq!(classify(&message), expected);
        prop_assert_eq!(classify(&message), classify(&message));
    }

    /// Merging keeps every event, reverses stream order, and never reorders
    /// events within a stream.
    #[test]
    fn merge_concatenates_without_resorting(
        streams in prop::collection::vec(
            prop::collection::vec((any::<i32>(), "[a-z ]{0,12}"), 0..20),
            0..3,
        )
    ) {
        let raw: Vec<Vec<RawEvent>> = streams
            .iter()
            .map(|s| s.iter().map(|(ts, m)| RawEvent::new(i64::from(*ts), m.clone())).collect())
            .collect();
        let expected: Vec<(i64, String)> = raw
            .iter()
            .rev()
            .flatten()
            .map(|e| (e.timestamp, e.message.clone()))
            .collect();

        let merged = concat_oldest_first(raw);
        let actual: Vec<(i64, String)> = merged.into_iter().map(|l| (l.timestamp, l.text)).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Arbitrary input and refresh deliveries keep the dashboard consistent.
    #[test]
    fn reducer_preserves_invariants(steps in prop::collection::vec(arb_step(), 1..60)) {
        let backend = backend();
        let ctx = RefreshContext::new(backend.clone(), backend);
        let mut model = DashboardModel::new(
            vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()],
            DashboardSettings::default(),
            (100, 30),
        );
        let mut pending = Vec::new();
        let mut ever_quit = false;

        for step in steps {
            let cmd = match step {
                Step::Key(key) => update(&mut model, DashboardMsg::Key(key)),
                Step::Resize(cols, rows) => update(&mut model, DashboardMsg::Resize { cols, rows }),
                Step::Deliver => {
                    if pending.is_empty() {
                        continue;
                    }
                    let ticket = pending.remove(0);
                    update(&mut model, DashboardMsg::RefreshLoaded(Box::new(ctx.run(ticket))))
                }
            };
            if let super::model::DashboardCmd::StartRefresh(ticket) = cmd {
                pending.push(ticket);
            }

            assert_viewport_invariants(&model.panels.log_view);
            assert_viewport_invariants(&model.entity_view);
            prop_assert!(model.entity_view.state().cursor < model.entities.len());
            prop_assert_eq!(model.panels.log_view.total_lines(), model.panels.log_lines.len());
            if let Some((entity, _)) = &model.panels.metadata {
                prop_assert!(model.entities.contains(entity));
            }
            if ever_quit {
                prop_assert!(model.quit);
            }
            ever_quit |= model.quit;
        }
    }
}
