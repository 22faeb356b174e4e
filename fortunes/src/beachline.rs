//! Beachline (BL): the ordered tree of parabolic arcs under the sweep
//! line, keyed implicitly by horizontal position (break points are
//! recomputed from neighboring sites rather than stored, so the tree never
//! needs rebalancing on directrix movement).

use crate::epsilon::ALGORITHMIC_EPSILON;
use crate::events::EventHandle;
use crate::geometry::{breakpoint_x, EdgeId, Point};
use crate::tree::{NodeId, Tree};

pub type ArcHandle = NodeId;

/// A parabolic arc on the beachline.
pub struct Arc {
    pub site: Point,
    /// The edge traced by the break point to this arc's left, once one
    /// exists (shared conceptually with the left neighbor).
    pub edge: Option<EdgeId>,
    pub circle_event: Option<EventHandle>,
}

impl Arc {
    fn new(site: Point) -> Self {
        Arc {
            site,
            edge: None,
            circle_event: None,
        }
    }
}

/// Where a new site lands relative to the existing beachline.
pub enum Placement {
    /// The beachline is empty.
    Empty,
    /// The site falls strictly inside a single arc.
    Split(ArcHandle),
    /// The site falls (within epsilon) exactly on the break point between
    /// two existing, distinct arcs.
    OnBreakPoint(ArcHandle, ArcHandle),
    /// Every existing arc shares the new site's y; it is appended to the
    /// right of the rightmost arc.
    AppendRight(ArcHandle),
}

pub struct Beachline {
    tree: Tree<Arc>,
}

impl Beachline {
    pub fn new() -> Self {
        Beachline { tree: Tree::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn arc(&self, handle: ArcHandle) -> &Arc {
        self.tree.get(handle)
    }

    pub fn arc_mut(&mut self, handle: ArcHandle) -> &mut Arc {
        self.tree.get_mut(handle)
    }

    pub fn left_neighbor(&self, handle: ArcHandle) -> Option<ArcHandle> {
        self.tree.prev(handle)
    }

    pub fn right_neighbor(&self, handle: ArcHandle) -> Option<ArcHandle> {
        self.tree.next(handle)
    }

    pub fn insert_root(&mut self, site: Point) -> ArcHandle {
        self.tree.insert_root(Arc::new(site))
    }

    pub fn insert_after(&mut self, handle: ArcHandle, site: Point) -> ArcHandle {
        self.tree.insert_after(Some(handle), Arc::new(site))
    }

    pub fn insert_before(&mut self, handle: ArcHandle, site: Point) -> ArcHandle {
        self.tree.insert_before(handle, Arc::new(site))
    }

    pub fn remove(&mut self, handle: ArcHandle) -> Arc {
        self.tree.remove(handle)
    }

    fn left_break(&self, handle: ArcHandle, directrix: f64) -> f64 {
        match self.tree.prev(handle) {
            Some(p) => breakpoint_x(self.tree.get(p).site, self.tree.get(handle).site, directrix),
            None => f64::NEG_INFINITY,
        }
    }

    fn right_break(&self, handle: ArcHandle, directrix: f64) -> f64 {
        match self.tree.next(handle) {
            Some(n) => breakpoint_x(self.tree.get(handle).site, self.tree.get(n).site, directrix),
            None => {
                let site = self.tree.get(handle).site;
                if site.y == directrix {
                    site.x
                } else {
                    f64::INFINITY
                }
            }
        }
    }

    /// Find where a new site at `x` (sweep directrix `directrix`) lands
    /// relative to the current beachline.
    pub fn locate(&self, x: f64, directrix: f64) -> Placement {
        let mut node = match self.tree.root() {
            Some(r) => r,
            None => return Placement::Empty,
        };
        loop {
            let dxl = self.left_break(node, directrix) - x;
            if dxl > ALGORITHMIC_EPSILON {
                node = self
                    .tree
                    .left(node)
                    .expect("beachline invariant: left break ahead implies a left child");
                continue;
            }
            let dxr = x - self.right_break(node, directrix);
            if dxr > ALGORITHMIC_EPSILON {
                match self.tree.right(node) {
                    Some(r) => {
                        node = r;
                        continue;
                    }
                    None => return Placement::AppendRight(node),
                }
            }
            if dxl > -ALGORITHMIC_EPSILON {
                return match self.tree.prev(node) {
                    Some(p) => Placement::OnBreakPoint(p, node),
                    None => Placement::Split(node),
                };
            }
            if dxr > -ALGORITHMIC_EPSILON {
                return match self.tree.next(node) {
                    Some(n) => Placement::OnBreakPoint(node, n),
                    None => Placement::Split(node),
                };
            }
            return Placement::Split(node);
        }
    }
}

impl Default for Beachline {
    fn default() -> Self {
        Self::new()
    }
}
