//! Typed event bus.
//!
//! There are exactly five event kinds, each with its own payload type and
//! subscriber list. The controller never calls subscribers directly: it
//! queues [`Event`]s, and the browser shell drains the queue and dispatches
//! once it no longer holds the engine borrowed, so a subscriber is free to
//! call back into the engine.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use std::rc::Rc;

use serde::Serialize;

use crate::doc::ElementId;
use crate::settings::ImageRef;

/// Handle returned by the `on_*` methods, accepted by [`EventBus::unsubscribe`].
pub type SubscriptionId = u64;

/// Element geometry or settings changed through user interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementsUpdated;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionChanged {
    pub selected: Vec<ElementId>,
}

/// Elements were added or removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementListChanged {
    pub elements: Vec<ElementId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageChanged {
    pub image: Option<ImageRef>,
}

/// The host should focus the named input control.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FocusRequested {
    pub control: String,
}

/// A queued event awaiting dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ElementsUpdated(ElementsUpdated),
    SelectionChanged(SelectionChanged),
    ElementListChanged(ElementListChanged),
    ImageChanged(ImageChanged),
    FocusRequested(FocusRequested),
}

struct Channel<T> {
    subscribers: Vec<(SubscriptionId, Rc<dyn Fn(&T)>)>,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self { subscribers: Vec::new() }
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self { subscribers: self.subscribers.clone() }
    }
}

impl<T> Channel<T> {
    fn add(&mut self, id: SubscriptionId, f: Rc<dyn Fn(&T)>) {
        self.subscribers.push((id, f));
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn emit(&self, payload: &T) {
        for (_, f) in &self.subscribers {
            f(payload);
        }
    }
}

/// Subscriber registry. Cloning is cheap and yields a snapshot that can
/// dispatch while the original is being modified.
#[derive(Clone, Default)]
pub struct EventBus {
    next_id: SubscriptionId,
    elements_updated: Channel<ElementsUpdated>,
    selection_changed: Channel<SelectionChanged>,
    element_list_changed: Channel<ElementListChanged>,
    image_changed: Channel<ImageChanged>,
    focus_requested: Channel<FocusRequested>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("subscribers", &self.len()).finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> SubscriptionId {
        self.next_id += 1;
        self.next_id
    }

    pub fn on_elements_updated(&mut self, f: impl Fn(&ElementsUpdated) + 'static) -> SubscriptionId {
        let id = self.next();
        self.elements_updated.add(id, Rc::new(f));
        id
    }

    pub fn on_selection_changed(&mut self, f: impl Fn(&SelectionChanged) + 'static) -> SubscriptionId {
        let id = self.next();
        self.selection_changed.add(id, Rc::new(f));
        id
    }

    pub fn on_element_list_changed(&mut self, f: impl Fn(&ElementListChanged) + 'static) -> SubscriptionId {
        let id = self.next();
        self.element_list_changed.add(id, Rc::new(f));
        id
    }

    pub fn on_image_changed(&mut self, f: impl Fn(&ImageChanged) + 'static) -> SubscriptionId {
        let id = self.next();
        self.image_changed.add(id, Rc::new(f));
        id
    }

    pub fn on_focus_requested(&mut self, f: impl Fn(&FocusRequested) + 'static) -> SubscriptionId {
        let id = self.next();
        self.focus_requested.add(id, Rc::new(f));
        id
    }

    /// Remove a subscriber from whichever channel holds it. Returns whether
    /// anything was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.elements_updated.remove(id)
            || self.selection_changed.remove(id)
            || self.element_list_changed.remove(id)
            || self.image_changed.remove(id)
            || self.focus_requested.remove(id)
    }

    /// Deliver `event` to every subscriber of its kind, in subscription order.
    pub fn dispatch(&self, event: &Event) {
        match event {
            Event::ElementsUpdated(p) => self.elements_updated.emit(p),
            Event::SelectionChanged(p) => self.selection_changed.emit(p),
            Event::ElementListChanged(p) => self.element_list_changed.emit(p),
            Event::ImageChanged(p) => self.image_changed.emit(p),
            Event::FocusRequested(p) => self.focus_requested.emit(p),
        }
    }

    /// Total number of subscribers across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements_updated.subscribers.len()
            + self.selection_changed.subscribers.len()
            + self.element_list_changed.subscribers.len()
            + self.image_changed.subscribers.len()
            + self.focus_requested.subscribers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
