//! Edge closer (EC): three passes run after the sweep terminates — extend
//! still-open edges to the bounding box, clip every edge to the box, and
//! (optionally) close each cell's half-edge cycle along the box perimeter.

use tracing::debug_span;

use crate::epsilon::{ALGORITHMIC_EPSILON, BOUNDARY_TOLERANCE};
use crate::geometry::{
    clip_segment, connect_edge_to_box, distance, BoundingBox, Cell, Edge, Halfedge, Point, VertexSlot,
};

/// Extend every edge that still has an open endpoint out to the bounding
/// box along its bisector.
pub fn close_open_edges(edges: &mut [Edge], bbox: &BoundingBox) {
    let span = debug_span!("close_open_edges");
    let _enter = span.enter();
    for edge in edges.iter_mut() {
        if edge.right_site.is_some() {
            connect_edge_to_box(edge, bbox);
        }
    }
}

/// Clip every edge to the bounding box. Edges with no surviving portion are
/// reset to the unset sentinel on both endpoints, marking them for removal
/// by the diagram assembler.
pub fn clip_edges_to_box(edges: &mut [Edge], bbox: &BoundingBox) {
    let span = debug_span!("clip_edges_to_box");
    let _enter = span.enter();
    for edge in edges.iter_mut() {
        let (Some(a), Some(b)) = (edge.va.point(), edge.vb.point()) else {
            continue;
        };
        match clip_segment(a, b, bbox) {
            Some((pa, pb)) => {
                edge.va = VertexSlot::Set(pa);
                edge.vb = VertexSlot::Set(pb);
            }
            None => {
                edge.va = VertexSlot::Unset;
                edge.vb = VertexSlot::Unset;
            }
        }
    }
}

/// The perimeter parameter `t` of a point known to lie on the bounding box
/// boundary: `0` at the top-left corner, increasing counterclockwise
/// through `1` (top-right), `2` (bottom-right), `3` (bottom-left), back to
/// `4 == 0`.
fn perimeter_param(p: Point, bbox: &BoundingBox) -> f64 {
    let w = bbox.xr - bbox.xl;
    let h = bbox.yb - bbox.yt;
    if (p.y - bbox.yt).abs() <= BOUNDARY_TOLERANCE {
        (p.x - bbox.xl) / w
    } else if (p.x - bbox.xr).abs() <= BOUNDARY_TOLERANCE {
        1.0 + (p.y - bbox.yt) / h
    } else if (p.y - bbox.yb).abs() <= BOUNDARY_TOLERANCE {
        2.0 + (bbox.xr - p.x) / w
    } else {
        3.0 + (bbox.yb - p.y) / h
    }
}

fn push_border_edge(edges: &mut Vec<Edge>, cell: &mut Cell, site: Point, from: Point, to: Point) {
    if distance(from, to) <= ALGORITHMIC_EPSILON {
        return;
    }
    let edge_id = edges.len();
    edges.push(Edge::new_border(site, from, to));
    cell.halfedges.push(Halfedge::new(edge_id, &edges[edge_id], site));
}

/// Walk the box perimeter counterclockwise (decreasing `t`) from `from` to
/// `to`, synthesizing border edges through up to four intervening corners.
fn route_border_edges(edges: &mut Vec<Edge>, cell: &mut Cell, site: Point, from: Point, to: Point, bbox: &BoundingBox) {
    let t_from = perimeter_param(from, bbox);
    let t_to = perimeter_param(to, bbox);
    let mut remaining = ((t_from - t_to) % 4.0 + 4.0) % 4.0;
    if remaining <= ALGORITHMIC_EPSILON {
        return;
    }

    let mut current = from;
    let mut t_cur = t_from;

    loop {
        let mut next_corner_t = t_cur.floor();
        if t_cur - next_corner_t <= ALGORITHMIC_EPSILON {
            next_corner_t -= 1.0;
        }
        let step = t_cur - next_corner_t;
        if step + ALGORITHMIC_EPSILON >= remaining {
            break;
        }
        let corner = bbox.corner(next_corner_t as i64);
        push_border_edge(edges, cell, site, current, corner);
        remaining -= step;
        current = corner;
        t_cur = next_corner_t;
    }

    push_border_edge(edges, cell, site, current, to);
}

/// Close each cell's half-edge cycle along the box perimeter, wherever a
/// gap exists between one half-edge's end point and the next's start
/// point (after angle-sorting the surviving half-edges, per 4.6).
pub fn close_cells(edges: &mut Vec<Edge>, cells: &mut [Cell], bbox: &BoundingBox) {
    let span = debug_span!("close_cells");
    let _enter = span.enter();

    for cell_idx in 0..cells.len() {
        let mut live: Vec<Halfedge> = cells[cell_idx]
            .halfedges
            .iter()
            .copied()
            .filter(|he| {
                let e = &edges[he.edge];
                e.va.is_set() && e.vb.is_set()
            })
            .collect();
        if live.is_empty() {
            continue;
        }
        live.sort_by(|a, b| b.angle.partial_cmp(&a.angle).unwrap());

        let n = live.len();
        let mut gaps = Vec::new();
        for i in 0..n {
            let prev = &live[i];
            let next = &live[(i + 1) % n];
            let end = prev.end_point(&edges[prev.edge]).point().unwrap();
            let start = next.start_point(&edges[next.edge]).point().unwrap();
            if distance(end, start) > ALGORITHMIC_EPSILON {
                gaps.push((end, start));
            }
        }

        let site = cells[cell_idx].site;
        for (from, to) in gaps {
            route_border_edges(edges, &mut cells[cell_idx], site, from, to, bbox);
        }
    }
}
