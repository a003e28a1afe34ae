// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! An unbounded FIFO handoff queue.
//!
//! The [Store] is the primitive every pipeline stage uses to hand objects to
//! its consumer process. A `put` is synchronous and fire-and-forget: it never
//! blocks the producer. A [`get`](Store::get) consumes the oldest buffered
//! item, or suspends the calling process until the next `put` when the store
//! is empty.
//!
//! The store itself is unbounded: any admission policy (for example a
//! byte-limited drop policy) belongs to the stage in front of it, which
//! decides whether to call `put` at all.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use voqsim_track::entity::Entity;
use voqsim_track::id::Unique;
use voqsim_track::{enter, exit};

use crate::events::repeated::Repeated;
use crate::traits::{Event, SimObject};
use crate::types::SimResult;

struct StoreState<T>
where
    T: SimObject,
{
    items: RefCell<VecDeque<T>>,
    items_changed: Repeated<()>,
}

/// An unbounded FIFO queue connecting a producer to one consumer process.
pub struct Store<T>
where
    T: SimObject,
{
    pub entity: Rc<Entity>,
    state: Rc<StoreState<T>>,
}

impl<T> Store<T>
where
    T: SimObject,
{
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        let entity = Rc::new(Entity::new(parent, name));
        Self {
            entity,
            state: Rc::new(StoreState {
                items: RefCell::new(VecDeque::new()),
                items_changed: Repeated::default(),
            }),
        }
    }

    /// Append an object to the store and wake the consumer if it is waiting.
    ///
    /// Never blocks the caller.
    pub fn put(&self, value: T) -> SimResult {
        enter!(self.entity ; value.id());
        self.state.items.borrow_mut().push_back(value);
        self.state.items_changed.notify()
    }

    /// Remove and return the oldest buffered object, waiting for the next
    /// [`put`](Store::put) if the store is empty.
    pub async fn get(&self) -> T {
        loop {
            let value = self.state.items.borrow_mut().pop_front();
            if let Some(value) = value {
                exit!(self.entity ; value.id());
                return value;
            }
            self.state.items_changed.listen().await;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.items.borrow().is_empty()
    }
}
