//! Sweep driver (SD): orchestrates the algorithm end to end. Sorts sites,
//! interleaves site and circle events in strictly non-decreasing `(y, x)`
//! order, and dispatches to the beachline operations, accumulating the
//! edges and cells that survive into the diagram.

use tracing::{debug_span, trace};

use crate::beachline::{ArcHandle, Beachline, Placement};
use crate::epsilon::ALGORITHMIC_EPSILON;
use crate::events::{CircleEvent, EventQueue};
use crate::geometry::{circle_event_candidate, circumcenter, Cell, Edge, EdgeId, Halfedge, Point};

fn points_close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= ALGORITHMIC_EPSILON && (a.y - b.y).abs() <= ALGORITHMIC_EPSILON
}

pub struct SweepResult {
    pub edges: Vec<Edge>,
    pub cells: Vec<Cell>,
}

struct Sweep {
    beachline: Beachline,
    events: EventQueue,
    edges: Vec<Edge>,
    cells: Vec<Cell>,
}

impl Sweep {
    fn new() -> Self {
        Sweep {
            beachline: Beachline::new(),
            events: EventQueue::new(),
            edges: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Cell identity by exact site match (first call for a site creates
    /// its cell; later calls reuse it).
    fn cell_index(&mut self, site: Point) -> usize {
        match self.cells.iter().position(|c| c.site == site) {
            Some(i) => i,
            None => {
                self.cells.push(Cell {
                    site,
                    halfedges: Vec::new(),
                });
                self.cells.len() - 1
            }
        }
    }

    /// Create a new bisector edge between `l_site` and `r_site`, and
    /// immediately register the two half-edges it contributes to each
    /// site's cell (their angle only depends on the two sites, not on the
    /// endpoints, which are fixed in later).
    fn create_edge(&mut self, l_site: Point, r_site: Point) -> EdgeId {
        let edge_id = self.edges.len();
        self.edges.push(Edge::new(l_site, r_site));

        let l_idx = self.cell_index(l_site);
        let r_idx = self.cell_index(r_site);
        let he_l = Halfedge::new(edge_id, &self.edges[edge_id], l_site);
        let he_r = Halfedge::new(edge_id, &self.edges[edge_id], r_site);
        self.cells[l_idx].halfedges.push(he_l);
        self.cells[r_idx].halfedges.push(he_r);

        edge_id
    }

    fn collapsed_vertex(&self, arc: ArcHandle) -> Option<Point> {
        self.beachline
            .arc(arc)
            .circle_event
            .map(|h| self.events.get(h).vertex)
    }

    fn detach_circle_event(&mut self, arc: ArcHandle) {
        if let Some(handle) = self.beachline.arc_mut(arc).circle_event.take() {
            self.events.remove(handle);
        }
    }

    fn attach_circle_event(&mut self, arc: ArcHandle, directrix: f64) {
        let Some(l) = self.beachline.left_neighbor(arc) else {
            return;
        };
        let Some(r) = self.beachline.right_neighbor(arc) else {
            return;
        };
        let l_site = self.beachline.arc(l).site;
        let c_site = self.beachline.arc(arc).site;
        let r_site = self.beachline.arc(r).site;
        if l_site == r_site {
            return;
        }
        let Some(candidate) = circle_event_candidate(l_site, c_site, r_site) else {
            return;
        };
        if candidate.trigger_y < directrix - ALGORITHMIC_EPSILON {
            return;
        }
        let handle = self.events.insert(CircleEvent {
            arc,
            vertex: candidate.center,
            ycenter: candidate.trigger_y,
        });
        self.beachline.arc_mut(arc).circle_event = Some(handle);
        trace!(x = candidate.center.x, y = candidate.trigger_y, "circle event attached");
    }

    fn add_beachsection(&mut self, site: Point, directrix: f64) {
        match self.beachline.locate(site.x, directrix) {
            Placement::Empty => {
                self.beachline.insert_root(site);
                self.cell_index(site);
            }
            Placement::AppendRight(l_arc) => {
                let l_site = self.beachline.arc(l_arc).site;
                let new_arc = self.beachline.insert_after(l_arc, site);
                let edge_id = self.create_edge(l_site, site);
                self.beachline.arc_mut(new_arc).edge = Some(edge_id);
            }
            Placement::Split(split_arc) => {
                let split_site = self.beachline.arc(split_arc).site;
                self.detach_circle_event(split_arc);

                let new_arc = self.beachline.insert_after(split_arc, site);
                let right_copy = self.beachline.insert_after(new_arc, split_site);

                let edge_id = self.create_edge(split_site, site);
                self.beachline.arc_mut(new_arc).edge = Some(edge_id);
                self.beachline.arc_mut(right_copy).edge = Some(edge_id);

                self.attach_circle_event(split_arc, directrix);
                self.attach_circle_event(right_copy, directrix);
            }
            Placement::OnBreakPoint(l_arc, r_arc) => {
                let l_site = self.beachline.arc(l_arc).site;
                let r_site = self.beachline.arc(r_arc).site;
                self.detach_circle_event(l_arc);
                self.detach_circle_event(r_arc);

                let vertex = circumcenter(site, l_site, r_site);

                let new_arc = self.beachline.insert_after(l_arc, site);

                if let Some(old_edge) = self.beachline.arc(r_arc).edge {
                    self.edges[old_edge].set_start_point(l_site, r_site, vertex);
                }

                let edge1 = self.create_edge(l_site, site);
                self.edges[edge1].set_end_point(l_site, site, vertex);
                self.beachline.arc_mut(new_arc).edge = Some(edge1);

                let edge2 = self.create_edge(site, r_site);
                self.edges[edge2].set_end_point(site, r_site, vertex);
                self.beachline.arc_mut(r_arc).edge = Some(edge2);

                self.attach_circle_event(l_arc, directrix);
                self.attach_circle_event(r_arc, directrix);
            }
        }
    }

    fn remove_beachsection(&mut self, fired_arc: ArcHandle, v: Point, directrix: f64) {
        let mut middle: Vec<ArcHandle> = vec![fired_arc];

        let mut left_bound = self.beachline.left_neighbor(fired_arc);
        while let Some(cand) = left_bound {
            match self.collapsed_vertex(cand) {
                Some(pv) if points_close(pv, v) => {
                    middle.insert(0, cand);
                    left_bound = self.beachline.left_neighbor(cand);
                }
                _ => break,
            }
        }
        let mut right_bound = self.beachline.right_neighbor(fired_arc);
        while let Some(cand) = right_bound {
            match self.collapsed_vertex(cand) {
                Some(pv) if points_close(pv, v) => {
                    middle.push(cand);
                    right_bound = self.beachline.right_neighbor(cand);
                }
                _ => break,
            }
        }

        let mut full: Vec<ArcHandle> = Vec::with_capacity(middle.len() + 2);
        if let Some(lb) = left_bound {
            full.push(lb);
        }
        full.extend(middle.iter().copied());
        if let Some(rb) = right_bound {
            full.push(rb);
        }

        for &h in &middle {
            self.detach_circle_event(h);
        }
        if let Some(lb) = left_bound {
            self.detach_circle_event(lb);
        }
        if let Some(rb) = right_bound {
            self.detach_circle_event(rb);
        }

        for i in 1..full.len() {
            let l_site = self.beachline.arc(full[i - 1]).site;
            let r_site = self.beachline.arc(full[i]).site;
            if let Some(edge_id) = self.beachline.arc(full[i]).edge {
                self.edges[edge_id].set_start_point(l_site, r_site, v);
            }
        }

        for &h in &middle {
            self.beachline.remove(h);
        }

        if full.len() >= 2 {
            let first = full[0];
            let last = *full.last().unwrap();
            let l_site = self.beachline.arc(first).site;
            let r_site = self.beachline.arc(last).site;
            let edge_id = self.create_edge(l_site, r_site);
            self.edges[edge_id].set_end_point(l_site, r_site, v);
            self.beachline.arc_mut(last).edge = Some(edge_id);

            self.attach_circle_event(first, directrix);
            self.attach_circle_event(last, directrix);
        }
    }
}

/// Run the sweep over `sites` (already deduplicated and validated by the
/// caller), returning the raw edges and cells before clipping/closure.
pub fn run(sites: &[Point]) -> SweepResult {
    let span = debug_span!("sweep");
    let _enter = span.enter();

    let mut queue: Vec<Point> = sites.to_vec();
    queue.sort_by(|a, b| b.y.partial_cmp(&a.y).unwrap().then_with(|| b.x.partial_cmp(&a.x).unwrap()));

    let mut sweep = Sweep::new();
    let mut last_site: Option<Point> = None;

    loop {
        let site_wins = match (queue.last(), sweep.events.peek()) {
            (Some(site), Some(ev)) => site.y < ev.ycenter || (site.y == ev.ycenter && site.x < ev.vertex.x),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        if site_wins {
            let site = queue.pop().unwrap();
            if last_site != Some(site) {
                trace!(x = site.x, y = site.y, "site event");
                sweep.add_beachsection(site, site.y);
                last_site = Some(site);
            }
        } else {
            let (_, event) = sweep.events.pop_min().unwrap();
            sweep.beachline.arc_mut(event.arc).circle_event = None;
            trace!(x = event.vertex.x, y = event.vertex.y, "circle event");
            sweep.remove_beachsection(event.arc, event.vertex, event.ycenter);
        }
    }

    SweepResult {
        edges: sweep.edges,
        cells: sweep.cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_sites_produce_one_open_edge() {
        let sites = vec![Point::new(4.0, 5.0), Point::new(6.0, 5.0)];
        let result = run(&sites);
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.cells.len(), 2);
    }

    #[test]
    fn three_sites_produce_a_triangle() {
        let sites = vec![
            Point::new(4.0, 5.0),
            Point::new(6.0, 5.0),
            Point::new(5.0, 8.0),
        ];
        let result = run(&sites);
        assert_eq!(result.edges.len(), 3);
        assert_eq!(result.cells.len(), 3);
    }
}
