#![allow(clippy::float_cmp)]

use super::*;
use crate::element::ElementType;
use crate::fake_surface::FixedMeasure;

fn make_element() -> Element {
    Element::new(ElementType::Text, 10.0, &FixedMeasure)
}

// =============================================================
// ElementStore
// =============================================================

#[test]
fn store_keeps_insertion_order() {
    let mut store = ElementStore::new();
    let a = make_element();
    let b = make_element();
    let c = make_element();
    let ids = vec![a.id, b.id, c.id];
    store.insert(a);
    store.insert(b);
    store.insert(c);
    assert_eq!(store.ids(), ids);
    assert_eq!(store.iter().rev().map(|e| e.id).next(), Some(ids[2]));
}

#[test]
fn store_insert_same_id_replaces_in_place() {
    let mut store = ElementStore::new();
    let a = make_element();
    let b = make_element();
    let (a_id, b_id) = (a.id, b.id);
    store.insert(a);
    store.insert(b);
    let mut replacement = make_element();
    replacement.id = a_id;
    replacement.x = 42.0;
    store.insert(replacement);
    assert_eq!(store.len(), 2);
    assert_eq!(store.ids(), vec![a_id, b_id]);
    assert!(store.get(&a_id).is_some_and(|e| e.x == 42.0));
}

#[test]
fn store_remove_returns_element() {
    let mut store = ElementStore::new();
    let a = make_element();
    let id = a.id;
    store.insert(a);
    assert!(store.remove(&id).is_some());
    assert!(store.remove(&id).is_none());
    assert!(store.is_empty());
}

#[test]
fn store_get_mut_edits() {
    let mut store = ElementStore::new();
    let a = make_element();
    let id = a.id;
    store.insert(a);
    if let Some(e) = store.get_mut(&id) {
        e.locked = true;
    }
    assert!(store.get(&id).is_some_and(|e| e.locked));
}

#[test]
fn store_clear_empties() {
    let mut store = ElementStore::new();
    store.insert(make_element());
    store.insert(make_element());
    store.clear();
    assert_eq!(store.len(), 0);
}

// =============================================================
// Selection
// =============================================================

#[test]
fn selection_toggle_twice_restores() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut sel = Selection::new();
    sel.set([a]);
    let before = sel.clone();
    sel.toggle(b);
    assert!(sel.contains(&b));
    sel.toggle(b);
    assert_eq!(sel, before);
    sel.toggle(a);
    sel.toggle(a);
    assert_eq!(sel.ids(), &[a]);
}

#[test]
fn selection_set_dedupes_and_reports_change() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut sel = Selection::new();
    assert!(sel.set([a, b, a]));
    assert_eq!(sel.ids(), &[a, b]);
    assert!(!sel.set([a, b]));
}

#[test]
fn selection_clear_reports_change() {
    let mut sel = Selection::new();
    assert!(!sel.clear());
    sel.toggle(Uuid::new_v4());
    assert!(sel.clear());
    assert!(sel.is_empty());
}
