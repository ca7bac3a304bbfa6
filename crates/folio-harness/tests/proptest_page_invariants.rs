//! Property-based invariant tests for the page controller.
//!
//! Arbitrary visitor sessions against the stock portfolio page must keep:
//!
//! 1. Toggle `aria-expanded`, panel `open` class and `nav_open` in agreement.
//! 2. Revealed elements stay revealed (set only grows, class stays on).
//! 3. Every bar width is written at most once, with the configured percentage.
//! 4. At most one nav link is active, and it is the one in `active_link`.
//! 5. After a frame, the header class reflects `scroll_y > threshold`.
//! 6. A rejected submission shows errors; an accepted one shows none.
//! 7. Host time never moves backwards.
//! 8. Determinism: the same events replay to the same snapshot.

use std::collections::BTreeSet;

use folio_core::PageConfig;
use folio_core::controller::FormStatus;
use folio_core::dom::Dom;
use folio_core::form::ContactField;
use folio_harness::synthetic::{SECTION_IDS, SKILL_PERCENTAGES};
use folio_harness::{ScenarioEvent, Session, portfolio, replay};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

fn field_strategy() -> impl Strategy<Value = ContactField> {
    prop_oneof![
        Just(ContactField::Name),
        Just(ContactField::Email),
        Just(ContactField::Message),
    ]
}

fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        Just("Ann".to_string()),
        Just("ann@example.com".to_string()),
        Just("not-an-email".to_string()),
        Just("A message long enough to pass.".to_string()),
        "[a-z@. ]{0,16}",
    ]
}

fn event_strategy() -> impl Strategy<Value = ScenarioEvent> {
    let href = prop_oneof![
        prop::sample::select(SECTION_IDS.to_vec()).prop_map(|id| format!("#{id}")),
        Just("#".to_string()),
    ];
    let key = prop_oneof![
        Just("Escape".to_string()),
        Just("Enter".to_string()),
        Just("a".to_string()),
    ];
    prop_oneof![
        1 => Just(ScenarioEvent::Load),
        3 => Just(ScenarioEvent::ToggleClick),
        1 => key.prop_map(|key| ScenarioEvent::KeyDown { key }),
        2 => href.prop_map(|href| ScenarioEvent::LinkClick { href }),
        4 => (0.0f64..5200.0).prop_map(|y| ScenarioEvent::Scroll { y }),
        3 => Just(ScenarioEvent::Frame),
        2 => (field_strategy(), value_strategy())
            .prop_map(|(field, value)| ScenarioEvent::Fill { field, value }),
        1 => Just(ScenarioEvent::Submit),
        1 => Just(ScenarioEvent::Reset),
        2 => (0u64..1500).prop_map(|ms| ScenarioEvent::Advance { ms }),
    ]
}

fn events_strategy() -> impl Strategy<Value = Vec<ScenarioEvent>> {
    prop::collection::vec(event_strategy(), 1..60)
}

fn start() -> Session {
    let (page, _) = portfolio();
    Session::start(page, PageConfig::default()).expect("default config is valid")
}

// ── Invariants ────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn session_invariants_hold(events in events_strategy()) {
        let mut session = start();
        let threshold = session.controller().config().header_threshold_px;
        let mut revealed_before = BTreeSet::new();
        let mut now_before = 0;

        for event in &events {
            session.apply(event);
            let snap = session.snapshot();
            let page = session.page();
            let ctl = session.controller();
            let state = ctl.state();
            let elements = ctl.elements();

            // 1
            prop_assert_eq!(snap.nav_open, snap.panel_open_class);
            prop_assert_eq!(
                snap.toggle_expanded.as_deref() == Some("true"),
                snap.nav_open
            );

            // 2
            prop_assert!(revealed_before.is_subset(&state.revealed));
            for node in &state.revealed {
                prop_assert!(page.has_class(*node, "active"));
            }
            revealed_before = state.revealed.clone();

            // 3
            for (slot, pct) in elements.progress.iter().zip(SKILL_PERCENTAGES) {
                let bar = slot.bar.expect("stock bars exist");
                prop_assert!(page.style_write_count(bar, "width") <= 1);
                if let Some(width) = page.element(bar).style.get("width") {
                    prop_assert_eq!(width, &format!("{pct}%"));
                }
            }

            // 4
            prop_assert!(snap.active_links.len() <= 1);
            let active: Vec<_> = elements
                .nav_links
                .iter()
                .copied()
                .filter(|l| page.has_class(*l, "active"))
                .collect();
            prop_assert_eq!(active.first().copied(), state.active_link);

            // 5
            if matches!(event, ScenarioEvent::Frame) {
                prop_assert_eq!(snap.header_scrolled, snap.scroll_y > threshold);
            }

            // 6
            if matches!(event, ScenarioEvent::Submit) && snap.status == FormStatus::Rejected {
                prop_assert!(!state.form.errors.is_empty());
                prop_assert!(snap.errors.values().any(|t| !t.is_empty()));
            }
            if snap.status == FormStatus::Sent {
                prop_assert!(state.form.errors.is_empty());
            }

            // 7
            prop_assert!(snap.now_ms >= now_before);
            now_before = snap.now_ms;
        }
    }

    #[test]
    fn replay_matches_live_session(events in events_strategy()) {
        let mut live = start();
        live.apply_all(&events);
        let replayed = replay(portfolio().0, PageConfig::default(), &events).unwrap();
        // 8
        prop_assert_eq!(replayed, live.snapshot());
    }

    #[test]
    fn escape_never_opens(events in events_strategy()) {
        let mut session = start();
        session.apply_all(&events);
        session.apply(&ScenarioEvent::KeyDown { key: "Escape".to_string() });
        prop_assert!(!session.snapshot().nav_open);
    }
}
