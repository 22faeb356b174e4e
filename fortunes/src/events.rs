//! Circle-event queue (CQ): a second instantiation of the ordered tree,
//! keyed by `(ycenter, x)` via an explicit comparator walk from the root —
//! the order in which circle events are expected to trigger as the sweep
//! line advances. `ycenter` here is the triggering y (circumcenter y plus
//! circumradius); the collapse vertex itself is the true circumcenter,
//! carried alongside so it can be read back unchanged when the event fires.

use crate::beachline::ArcHandle;
use crate::geometry::Point;
use crate::tree::{NodeId, Tree};

pub type EventHandle = NodeId;

/// A pending beachline collapse: `arc` vanishes once the sweep line
/// reaches `ycenter`, at which point `vertex` becomes a diagram vertex.
pub struct CircleEvent {
    pub arc: ArcHandle,
    pub vertex: Point,
    pub ycenter: f64,
}

pub struct EventQueue {
    tree: Tree<CircleEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue { tree: Tree::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn peek(&self) -> Option<&CircleEvent> {
        self.tree.first().map(|id| self.tree.get(id))
    }

    pub fn get(&self, handle: EventHandle) -> &CircleEvent {
        self.tree.get(handle)
    }

    /// Insert a new circle event, keeping the queue ordered ascending by
    /// `(ycenter, x)`.
    pub fn insert(&mut self, event: CircleEvent) -> EventHandle {
        let key = (event.ycenter, event.vertex.x);
        let mut cursor = self.tree.root();
        let mut after: Option<NodeId> = None;
        let mut before: Option<NodeId> = None;

        while let Some(n) = cursor {
            let other = self.tree.get(n);
            let other_key = (other.ycenter, other.vertex.x);
            if key < other_key {
                match self.tree.left(n) {
                    Some(l) => cursor = Some(l),
                    None => {
                        before = Some(n);
                        cursor = None;
                    }
                }
            } else {
                match self.tree.right(n) {
                    Some(r) => cursor = Some(r),
                    None => {
                        after = Some(n);
                        cursor = None;
                    }
                }
            }
        }

        match (after, before) {
            (Some(a), _) => self.tree.insert_after(Some(a), event),
            (None, Some(b)) => self.tree.insert_before(b, event),
            (None, None) => self.tree.insert_root(event),
        }
    }

    pub fn remove(&mut self, handle: EventHandle) -> CircleEvent {
        self.tree.remove(handle)
    }

    pub fn pop_min(&mut self) -> Option<(EventHandle, CircleEvent)> {
        let id = self.tree.first()?;
        Some((id, self.tree.remove(id)))
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Tree;

    fn dummy_arc() -> ArcHandle {
        let mut t: Tree<()> = Tree::new();
        t.insert_root(())
    }

    #[test]
    fn pops_in_ascending_ycenter_order() {
        let mut q = EventQueue::new();
        q.insert(CircleEvent {
            arc: dummy_arc(),
            vertex: Point::new(0.0, 0.0),
            ycenter: 5.0,
        });
        q.insert(CircleEvent {
            arc: dummy_arc(),
            vertex: Point::new(0.0, 0.0),
            ycenter: 1.0,
        });
        q.insert(CircleEvent {
            arc: dummy_arc(),
            vertex: Point::new(0.0, 0.0),
            ycenter: 3.0,
        });

        let mut order = vec![];
        while let Some((_, e)) = q.pop_min() {
            order.push(e.ycenter);
        }
        assert_eq!(order, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn breaks_ties_by_x() {
        let mut q = EventQueue::new();
        q.insert(CircleEvent {
            arc: dummy_arc(),
            vertex: Point::new(2.0, 0.0),
            ycenter: 1.0,
        });
        q.insert(CircleEvent {
            arc: dummy_arc(),
            vertex: Point::new(-1.0, 0.0),
            ycenter: 1.0,
        });

        let (_, first) = q.pop_min().unwrap();
        assert_eq!(first.vertex.x, -1.0);
    }
}
