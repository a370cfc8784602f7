#![cfg(not(target_arch = "wasm32"))]

mod common;

use std::collections::BTreeSet;

use proptest::prelude::*;

use todo_universe::account::TodoId;
use todo_universe::clock::{Clock, ManualClock};
use todo_universe::storage::MemoryStorage;
use todo_universe::{Universe, UniverseError};

use common::{harness, START_MS};

fn todo_ids(u: &Universe<MemoryStorage, &ManualClock>) -> BTreeSet<TodoId> {
    let user = u.session().current_user.as_deref().unwrap_or_default();
    u.store()
        .account(user)
        .map(|a| a.todos.iter().map(|t| t.id).collect())
        .unwrap_or_default()
}

fn node_ids(u: &Universe<MemoryStorage, &ManualClock>) -> BTreeSet<TodoId> {
    u.stage().scene.nodes.ids().collect()
}

#[derive(Debug, Clone)]
enum Op {
    Add(String),
    Toggle(usize),
    Delete(usize),
    DeleteUnknown,
    ToggleView,
    Tick(u16),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => "[a-z ]{0,10}".prop_map(Op::Add),
        2 => any::<usize>().prop_map(Op::Toggle),
        2 => any::<usize>().prop_map(Op::Delete),
        1 => Just(Op::DeleteUnknown),
        1 => Just(Op::ToggleView),
        1 => any::<u16>().prop_map(Op::Tick),
    ]
}

fn pick(u: &Universe<MemoryStorage, &ManualClock>, i: usize) -> Option<TodoId> {
    let ids: Vec<_> = todo_ids(u).into_iter().collect();
    (!ids.is_empty()).then(|| ids[i % ids.len()])
}

proptest! {
    #[test]
    fn nodes_track_todos_through_any_sequence(ops in prop::collection::vec(op(), 1..40)) {
        let clock = ManualClock::new(START_MS);
        let mut h = harness(&clock, true);
        h.universe.demo_login().unwrap();
        prop_assert_eq!(todo_ids(&h.universe), node_ids(&h.universe));

        for op in ops {
            match op {
                Op::Add(text) => {
                    let result = h.universe.add_todo(&text);
                    prop_assert_eq!(result.is_ok(), !text.trim().is_empty());
                }
                Op::Toggle(i) => {
                    if let Some(id) = pick(&h.universe, i) {
                        prop_assert!(h.universe.toggle_todo(id).unwrap());
                        let completed = h.universe.store().account("demo").unwrap()
                            .todos.iter().find(|t| t.id == id).unwrap().completed;
                        prop_assert_eq!(h.universe.stage().scene.nodes.get(id).unwrap().completed(), completed);
                    }
                }
                Op::Delete(i) => {
                    if let Some(id) = pick(&h.universe, i) {
                        prop_assert!(h.universe.delete_todo(id, || true).unwrap());
                    }
                }
                Op::DeleteUnknown => {
                    prop_assert!(!h.universe.delete_todo(TodoId(-1), || true).unwrap());
                }
                Op::ToggleView => {
                    h.universe.toggle_view();
                }
                Op::Tick(ms) => {
                    clock.advance(i64::from(ms));
                    h.universe.tick(clock.now_ms());
                }
            }
            prop_assert_eq!(todo_ids(&h.universe), node_ids(&h.universe));
        }
    }
}

#[test]
fn demo_login_creates_one_node_per_todo() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();
    assert_eq!(h.universe.stage().scene.nodes.len(), 5);

    let done: Vec<_> = h.universe.stage().scene.nodes.iter().filter(|n| n.completed()).map(|n| n.id).collect();
    assert_eq!(done, vec![TodoId(2), TodoId(5)]);
}

#[test]
fn blank_text_is_rejected_without_side_effects() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();
    h.universe.notifier_mut().drain_pending();

    for text in ["", "   ", "\t\n"] {
        assert!(matches!(h.universe.add_todo(text), Err(UniverseError::EmptyInput)));
    }
    assert_eq!(h.universe.stage().scene.nodes.len(), 5);
    let popups = h.universe.notifier_mut().drain_pending();
    assert_eq!(popups.len(), 3);
    assert!(popups.iter().all(|n| n.message == "Please enter a mission description."));
}

#[test]
fn same_millisecond_adds_get_distinct_ids() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.login("nova", "pw").unwrap();

    let a = h.universe.add_todo("first").unwrap();
    let b = h.universe.add_todo("second").unwrap();
    assert_eq!(a, TodoId(START_MS));
    assert_eq!(b, TodoId(START_MS + 1));
    assert_eq!(h.universe.stage().scene.nodes.len(), 2);
}

#[test]
fn deleting_unknown_id_never_prompts() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();

    let removed = h
        .universe
        .delete_todo(TodoId(999), || panic!("confirmation must not be requested"))
        .unwrap();
    assert!(!removed);
    assert_eq!(h.universe.stage().scene.nodes.len(), 5);
}

#[test]
fn declined_confirmation_keeps_todo_and_node() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();

    assert!(!h.universe.delete_todo(TodoId(3), || false).unwrap());
    assert!(h.universe.stage().scene.nodes.get(TodoId(3)).is_some());

    assert!(h.universe.delete_todo(TodoId(3), || true).unwrap());
    assert!(h.universe.stage().scene.nodes.get(TodoId(3)).is_none());
    assert_eq!(todo_ids(&h.universe), node_ids(&h.universe));
}

#[test]
fn logout_clears_nodes_and_relogin_rebuilds_them() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();
    h.universe.add_todo("Chart a course").unwrap();

    h.universe.logout();
    assert!(h.universe.stage().scene.nodes.is_empty());
    assert!(h.universe.session().current_user.is_none());
    assert!(h.universe.list_view().is_none());

    h.universe.demo_login().unwrap();
    assert_eq!(h.universe.stage().scene.nodes.len(), 6);
}

#[test]
fn switching_users_replaces_the_node_set() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();
    h.universe.login("nova", "pw").unwrap();

    assert!(h.universe.stage().scene.nodes.is_empty());
    assert_eq!(h.universe.session().current_user.as_deref(), Some("nova"));
}

#[test]
fn mutations_without_a_session_are_refused() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    assert!(matches!(h.universe.add_todo("orphan"), Err(UniverseError::NoSession)));
    assert!(matches!(h.universe.toggle_todo(TodoId(1)), Err(UniverseError::NoSession)));
    assert!(h.universe.stage().scene.nodes.is_empty());
}

#[test]
fn toggle_restyles_and_pulses_on_completion() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();

    assert!(h.universe.toggle_todo(TodoId(1)).unwrap());
    let node = h.universe.stage().scene.nodes.get(TodoId(1)).unwrap();
    assert!(node.completed());
    assert!(node.pulse.is_some());

    // Reactivating does not pulse.
    assert!(h.universe.toggle_todo(TodoId(2)).unwrap());
    let node = h.universe.stage().scene.nodes.get(TodoId(2)).unwrap();
    assert!(!node.completed());
    assert!(node.pulse.is_none());

    assert!(!h.universe.toggle_todo(TodoId(77)).unwrap());
}

#[test]
fn edit_round_trip_and_blank_rename() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);
    h.universe.demo_login().unwrap();

    h.universe.begin_edit(TodoId(1));
    assert!(h.universe.list_view().unwrap().items.iter().any(|i| i.id == TodoId(1) && i.editing));

    assert!(!h.universe.save_edit(TodoId(1), "   ").unwrap());
    assert_eq!(h.universe.session().editing, None);

    h.universe.begin_edit(TodoId(1));
    assert!(h.universe.save_edit(TodoId(1), "  Survey the rings ").unwrap());
    let todo = &h.universe.store().account("demo").unwrap().todos[0];
    assert_eq!(todo.text, "Survey the rings");
}

#[test]
fn edit_targets_only_the_current_users_todos() {
    let clock = ManualClock::new(START_MS);
    let mut h = harness(&clock, true);

    h.universe.begin_edit(TodoId(1));
    assert_eq!(h.universe.session().editing, None);

    h.universe.demo_login().unwrap();
    h.universe.begin_edit(TodoId(77));
    assert_eq!(h.universe.session().editing, None);
    h.universe.begin_edit(TodoId(3));
    assert_eq!(h.universe.session().editing, Some(TodoId(3)));

    // Demo ids mean nothing inside another account.
    h.universe.logout();
    h.universe.login("ada", "pw").unwrap();
    h.universe.begin_edit(TodoId(3));
    assert_eq!(h.universe.session().editing, None);
}

struct ReadOnly;

impl todo_universe::storage::Storage for ReadOnly {
    fn get(&self, _key: &str) -> Result<Option<String>, todo_universe::StorageError> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), todo_universe::StorageError> {
        Err(todo_universe::StorageError::Unavailable("quota exceeded".into()))
    }
}

#[test]
fn failed_save_is_reported_and_mutation_kept() {
    use rand::SeedableRng;
    use todo_universe::notify::Severity;
    use todo_universe::render::NullRenderer;

    let clock = ManualClock::new(START_MS);
    let mut universe = Universe::new(
        common::config(),
        ReadOnly,
        &clock,
        todo_universe::Renderers {
            normal: Box::new(NullRenderer::default()),
            stereo: None,
            device_pixel_ratio: 1.0,
        },
        rand::rngs::SmallRng::seed_from_u64(3),
    );
    universe.demo_login().unwrap();
    universe.notifier_mut().drain_pending();

    let id = universe.add_todo("Refuel").unwrap();
    assert!(universe.stage().scene.nodes.get(id).is_some());
    assert!(universe.store().account("demo").unwrap().todos.iter().any(|t| t.id == id));

    let popups = universe.notifier_mut().drain_pending();
    assert!(popups.iter().any(|n| n.severity == Severity::Error));
    assert!(popups.iter().any(|n| n.message == "Mission added successfully!"));
}
