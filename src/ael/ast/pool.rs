//! Arena that owns every node of a parse
//!
//!     Nodes are addressed by [`NodeId`], an index plus a generation. Releasing a
//!     node bumps its slot's generation, so an id that outlived its node is
//!     detected instead of aliasing whatever reuses the slot. Releasing such a
//!     stale id is an error and is counted in [`NodePool::stale_releases`].
//!
//!     The pool journals allocations while a parse is in flight. A parse that
//!     has to abandon work takes a [`AllocMark`] and later calls
//!     [`NodePool::release_since`] to drop everything allocated after it.

use super::node::Node;
use crate::ael::error::PoolError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// Position in the allocation journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AllocMark(usize);

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Default)]
pub struct NodePool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    journal: Vec<NodeId>,
    live: usize,
    allocated: usize,
    stale_releases: usize,
}

impl NodePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };
        self.live += 1;
        self.allocated += 1;
        self.journal.push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, PoolError> {
        self.get(id).ok_or(PoolError::Stale(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, PoolError> {
        self.get_mut(id).ok_or(PoolError::Stale(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Take a node out of the pool, invalidating every copy of its id.
    pub fn release(&mut self, id: NodeId) -> Result<Node, PoolError> {
        let taken = self
            .slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| {
                let node = slot.node.take()?;
                slot.generation = slot.generation.wrapping_add(1);
                Some(node)
            });
        match taken {
            Some(node) => {
                self.free.push(id.index);
                self.live -= 1;
                Ok(node)
            }
            None => {
                self.stale_releases += 1;
                log::error!("release of stale node {}", id);
                Err(PoolError::Stale(id))
            }
        }
    }

    /// Number of nodes currently alive.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of nodes ever allocated from this pool.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Number of release attempts that named a node already gone.
    pub fn stale_releases(&self) -> usize {
        self.stale_releases
    }

    pub fn mark(&self) -> AllocMark {
        AllocMark(self.journal.len())
    }

    /// Release every node allocated after `mark` that is still alive.
    pub fn release_since(&mut self, mark: AllocMark) -> usize {
        if mark.0 >= self.journal.len() {
            return 0;
        }
        let abandoned = self.journal.split_off(mark.0);
        let mut released = 0;
        for id in abandoned {
            if self.contains(id) && self.release(id).is_ok() {
                released += 1;
            }
        }
        released
    }

    /// Forget the allocation journal once a parse has settled.
    pub fn settle(&mut self) {
        self.journal.clear();
    }

    /// Ids of every live node, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|_| NodeId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }
}
