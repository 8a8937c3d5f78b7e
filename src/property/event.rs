//! Mutation events and property subscribers.
//!
//! Every successful Add/Replace/Delete publishes an [`Event`] describing the
//! mutated property. Subscribers on the source property are notified first,
//! in registration order, then the event propagates through the parent
//! chain. Subscribers must not publish new events synchronously; follow-up
//! events are queued and dispatched after the current one completes, which
//! keeps notification single-pass.

use super::tree::{PropertyIndex, PropertyTree, PropertyValue};
use crate::schema::{annotations, Attribute, AttributeType};
use std::collections::VecDeque;

/// What a mutation did to the source property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The property now holds a value
    Assigned,
    /// The property no longer holds a value
    Unassigned,
}

/// A mutation notification.
#[derive(Debug, Clone)]
pub struct Event {
    /// What happened
    pub kind: EventKind,
    /// The property the mutation happened on
    pub source: PropertyIndex,
    propagate: bool,
}

impl Event {
    pub(crate) fn new(kind: EventKind, source: PropertyIndex) -> Self {
        Self {
            kind,
            source,
            propagate: true,
        }
    }

    /// Whether the event continues up the parent chain after the current
    /// property's subscribers return.
    pub fn will_propagate(&self) -> bool {
        self.propagate
    }
}

/// Behaviors installed on properties at construction, selected by attribute
/// annotations.
#[derive(Debug, Clone)]
pub(crate) enum Subscriber {
    /// Demotes other elements' `primary` flag when one is set true
    ExclusivePrimary,
    /// Drops unassigned elements from a multi-valued property
    AutoCompact,
    /// Re-publishes a complex element's assigned state when children change
    StateSummary { had_value: bool },
}

impl Subscriber {
    pub(crate) fn for_attribute(attr: &Attribute) -> Vec<Subscriber> {
        let mut subscribers = Vec::new();
        if attr.multi_valued {
            if attr.has_annotation(annotations::EXCLUSIVE_PRIMARY) {
                subscribers.push(Subscriber::ExclusivePrimary);
            }
            if attr.has_annotation(annotations::AUTO_COMPACT) {
                subscribers.push(Subscriber::AutoCompact);
            }
        } else if attr.data_type == AttributeType::Complex
            && attr.has_annotation(annotations::STATE_SUMMARY)
        {
            subscribers.push(Subscriber::StateSummary { had_value: false });
        }
        subscribers
    }
}

impl PropertyTree {
    /// Publish a mutation event and drain any follow-ups it provokes.
    pub(crate) fn publish(&mut self, source: PropertyIndex, kind: EventKind) {
        debug_assert_eq!(self.notify_depth, 0, "re-entrant event notification");
        self.notify_depth += 1;

        let mut queue = VecDeque::new();
        queue.push_back(Event::new(kind, source));
        while let Some(event) = queue.pop_front() {
            let mut target = Some(event.source);
            while let Some(index) = target {
                for slot in 0..self.node(index).subscribers.len() {
                    self.dispatch(index, slot, &event, &mut queue);
                }
                target = if event.will_propagate() {
                    self.node(index).parent
                } else {
                    None
                };
            }
        }

        self.notify_depth -= 1;
    }

    fn dispatch(
        &mut self,
        index: PropertyIndex,
        slot: usize,
        event: &Event,
        queue: &mut VecDeque<Event>,
    ) {
        match self.node(index).subscribers[slot].clone() {
            Subscriber::ExclusivePrimary => self.enforce_exclusive_primary(index, event),
            Subscriber::AutoCompact => {
                if event.kind == EventKind::Unassigned {
                    self.compact(index);
                }
            }
            Subscriber::StateSummary { had_value } => {
                let now = !self.is_unassigned(index);
                if now != had_value {
                    if let Subscriber::StateSummary { had_value } =
                        &mut self.node_mut(index).subscribers[slot]
                    {
                        *had_value = now;
                    }
                    if event.source != index {
                        let kind = if now {
                            EventKind::Assigned
                        } else {
                            EventKind::Unassigned
                        };
                        queue.push_back(Event::new(kind, index));
                    }
                }
            }
        }
    }

    /// Demote `primary=true` on every element other than the one containing
    /// the event source. Demotion writes directly, without publishing, so
    /// the notification in flight stays single-pass.
    fn enforce_exclusive_primary(&mut self, multi: PropertyIndex, event: &Event) {
        if event.kind != EventKind::Assigned {
            return;
        }
        let source = event.source;
        if !self.node(source).attr.name.eq_ignore_ascii_case("primary") {
            return;
        }
        if !matches!(self.node(source).value, PropertyValue::Boolean(Some(true))) {
            return;
        }
        let Some(owner) = self.element_containing(multi, source) else {
            return;
        };

        for element in self.children(multi).to_vec() {
            if element == owner {
                continue;
            }
            let Some(primary) = self.find_child(element, "primary") else {
                continue;
            };
            if matches!(self.node(primary).value, PropertyValue::Boolean(Some(true))) {
                self.node_mut(primary).value = PropertyValue::Boolean(Some(false));
                self.node_mut(primary).touched = true;
            }
        }
    }

    /// The direct element of `multi` on the parent chain of `descendant`.
    fn element_containing(
        &self,
        multi: PropertyIndex,
        descendant: PropertyIndex,
    ) -> Option<PropertyIndex> {
        let mut current = descendant;
        while let Some(parent) = self.node(current).parent {
            if parent == multi {
                return Some(current);
            }
            current = parent;
        }
        None
    }
}
