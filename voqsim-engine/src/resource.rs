// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A capacity-one shared resource with FIFO fairness.
//!
//! A [Resource] models an exclusive facility (for example an output-port
//! transmitter) shared by several processes. At most one requester holds the
//! resource at a time; the others queue in arrival order. A grant is
//! represented by a [ResourceGuard] whose `Drop` hands the resource to the
//! head of the wait list, so every exit path - including a process being
//! abandoned at the simulation horizon - performs the release.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use voqsim_track::entity::Entity;
use voqsim_track::trace;

use crate::events::once::Once;
use crate::traits::Event;

struct ResourceState {
    occupied: Cell<bool>,
    waiting: RefCell<VecDeque<Once<()>>>,
}

/// An exclusive resource shared by many processes.
pub struct Resource {
    pub entity: Rc<Entity>,
    state: Rc<ResourceState>,
}

impl Resource {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        let entity = Rc::new(Entity::new(parent, name));
        Self {
            entity,
            state: Rc::new(ResourceState {
                occupied: Cell::new(false),
                waiting: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Acquire the resource, waiting in FIFO order if it is occupied.
    ///
    /// The returned guard holds the resource until it is dropped.
    pub async fn request(&self) -> ResourceGuard {
        if self.state.occupied.get() {
            let grant = Once::default();
            self.state.waiting.borrow_mut().push_back(grant.clone());
            trace!(self.entity ; "request queued ({} waiting)", self.state.waiting.borrow().len());
            // Occupancy is handed over directly by the releasing guard
            grant.listen().await;
        } else {
            self.state.occupied.set(true);
        }
        ResourceGuard {
            state: self.state.clone(),
        }
    }

    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.state.occupied.get()
    }

    #[must_use]
    pub fn num_waiting(&self) -> usize {
        self.state.waiting.borrow().len()
    }
}

/// Grant of a [Resource], released on drop.
pub struct ResourceGuard {
    state: Rc<ResourceState>,
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        let next = self.state.waiting.borrow_mut().pop_front();
        match next {
            Some(grant) => grant.notify().unwrap(),
            None => self.state.occupied.set(false),
        }
    }
}
