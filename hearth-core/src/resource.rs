//! ## hearth-core::resource
//! **Bounded concurrency pool with FIFO admission**
//!
//! A [`CapacityResource`] models the processing slots of a server. Acquiring a slot
//! either succeeds immediately or parks the requester in a FIFO queue; releasing a
//! slot hands it straight to the longest-waiting requester. Because the scheduler is
//! single-threaded, suspension is expressed by the caller: a queued requester simply
//! does not continue until a later `release` returns it.

use std::collections::VecDeque;

use crate::SimulationError;

/// Proof of slot ownership. Consumed by [`CapacityResource::release`], so a slot
/// cannot be released twice.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a grant that is dropped never frees its slot"]
pub struct Grant {
    issuer: u64,
    serial: u64,
}

impl Grant {
    /// Identifier of the resource that issued this grant.
    pub fn issuer(&self) -> u64 {
        self.issuer
    }

    /// Grant number, increasing per resource in grant order.
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

/// Outcome of [`CapacityResource::acquire`].
#[derive(Debug, PartialEq, Eq)]
pub enum Acquisition<T> {
    /// A slot was free; the requester is handed back with its grant.
    Granted(T, Grant),
    /// All slots are busy; the requester waits at `position` (0 = next in line).
    Queued { position: usize },
}

#[derive(Debug)]
pub struct CapacityResource<T> {
    id: u64,
    capacity: usize,
    occupancy: usize,
    waiters: VecDeque<T>,
    issued: u64,
}

impl<T> CapacityResource<T> {
    /// Creates a resource with `capacity` slots. `id` tags every grant so that a
    /// grant can only be returned to the resource that issued it.
    pub fn new(id: u64, capacity: usize) -> Result<Self, SimulationError> {
        if capacity == 0 {
            return Err(SimulationError::InvalidCapacity(capacity));
        }
        Ok(Self {
            id,
            capacity,
            occupancy: 0,
            waiters: VecDeque::new(),
            issued: 0,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held.
    pub fn occupancy(&self) -> usize {
        self.occupancy
    }

    /// Requesters waiting for a slot.
    pub fn queue_len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_full(&self) -> bool {
        self.occupancy >= self.capacity
    }

    /// Requests a slot for `requester`.
    pub fn acquire(&mut self, requester: T) -> Acquisition<T> {
        if self.is_full() || !self.waiters.is_empty() {
            self.waiters.push_back(requester);
            return Acquisition::Queued {
                position: self.waiters.len() - 1,
            };
        }
        let grant = self.issue();
        Acquisition::Granted(requester, grant)
    }

    /// Frees the slot held by `grant`. If anyone is waiting, the slot passes to the
    /// longest-waiting requester, which is returned together with its new grant.
    pub fn release(&mut self, grant: Grant) -> Result<Option<(T, Grant)>, SimulationError> {
        if grant.issuer != self.id {
            return Err(SimulationError::ForeignGrant {
                issuer: grant.issuer,
                resource: self.id,
            });
        }
        debug_assert!(self.occupancy > 0, "release on an idle resource");
        self.occupancy = self.occupancy.saturating_sub(1);

        match self.waiters.pop_front() {
            Some(next) => {
                let grant = self.issue();
                Ok(Some((next, grant)))
            }
            None => Ok(None),
        }
    }

    fn issue(&mut self) -> Grant {
        self.occupancy += 1;
        self.issued += 1;
        Grant {
            issuer: self.id,
            serial: self.issued,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_zero_capacity() {
        assert!(matches!(
            CapacityResource::<u32>::new(1, 0),
            Err(SimulationError::InvalidCapacity(0))
        ));
    }

    #[test]
    fn grants_until_full_then_queues() {
        let mut resource = CapacityResource::new(7, 2).unwrap();
        assert!(matches!(resource.acquire("a"), Acquisition::Granted("a", _)));
        assert!(matches!(resource.acquire("b"), Acquisition::Granted("b", _)));
        assert_eq!(resource.acquire("c"), Acquisition::Queued { position: 0 });
        assert_eq!(resource.acquire("d"), Acquisition::Queued { position: 1 });
        assert_eq!(resource.occupancy(), 2);
        assert_eq!(resource.queue_len(), 2);
    }

    #[test]
    fn release_hands_slot_to_longest_waiter() {
        let mut resource = CapacityResource::new(7, 1).unwrap();
        let Acquisition::Granted(_, grant) = resource.acquire(1) else {
            panic!("first request should be granted");
        };
        assert!(matches!(resource.acquire(2), Acquisition::Queued { .. }));
        assert!(matches!(resource.acquire(3), Acquisition::Queued { .. }));

        let (next, grant) = resource.release(grant).unwrap().unwrap();
        assert_eq!(next, 2);
        assert_eq!(resource.occupancy(), 1);

        let (next, grant) = resource.release(grant).unwrap().unwrap();
        assert_eq!(next, 3);

        assert!(resource.release(grant).unwrap().is_none());
        assert_eq!(resource.occupancy(), 0);
    }

    #[test]
    fn new_requests_do_not_jump_the_queue() {
        let mut resource = CapacityResource::new(7, 1).unwrap();
        let Acquisition::Granted(_, grant) = resource.acquire("holder") else {
            panic!("first request should be granted");
        };
        assert!(matches!(resource.acquire("waiter"), Acquisition::Queued { .. }));

        let (next, _grant) = resource.release(grant).unwrap().unwrap();
        assert_eq!(next, "waiter");
        assert!(matches!(resource.acquire("late"), Acquisition::Queued { position: 0 }));
    }

    #[test]
    fn refuses_foreign_grants() {
        let mut a = CapacityResource::new(1, 1).unwrap();
        let mut b = CapacityResource::<()>::new(2, 1).unwrap();
        let Acquisition::Granted(_, grant) = a.acquire(()) else {
            panic!("first request should be granted");
        };
        assert_eq!(
            b.release(grant),
            Err(SimulationError::ForeignGrant {
                issuer: 1,
                resource: 2
            })
        );
    }

    #[derive(Debug, Clone)]
    enum Op {
        Acquire,
        Release(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Acquire), (0usize..16).prop_map(Op::Release)]
    }

    proptest! {
        #[test]
        fn occupancy_bounded_and_grants_fifo(capacity in 1usize..5, ops in proptest::collection::vec(op(), 1..200)) {
            let mut resource = CapacityResource::new(0, capacity).unwrap();
            let mut held: Vec<(u32, Grant)> = Vec::new();
            let mut granted_order: Vec<u32> = Vec::new();
            let mut next_id = 0u32;

            for op in ops {
                match op {
                    Op::Acquire => {
                        if let Acquisition::Granted(id, grant) = resource.acquire(next_id) {
                            granted_order.push(id);
                            held.push((id, grant));
                        }
                        next_id += 1;
                    }
                    Op::Release(i) if !held.is_empty() => {
                        let (_, grant) = held.remove(i % held.len());
                        if let Some((id, grant)) = resource.release(grant).unwrap() {
                            granted_order.push(id);
                            held.push((id, grant));
                        }
                    }
                    Op::Release(_) => {}
                }
                prop_assert!(resource.occupancy() <= capacity);
                prop_assert_eq!(resource.occupancy(), held.len());
            }

            // Requesters are numbered in arrival order, so FIFO admission means the
            // grant sequence is strictly increasing.
            prop_assert!(granted_order.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
