//! Fortune's sweep-line algorithm for computing clipped 2D Voronoi
//! diagrams over a finite set of sites and an axis-aligned bounding box.
//!
//! The algorithm is split across the modules named after the pipeline
//! stages it passes through: the ordered tree ([`tree`]) backs both the
//! beachline ([`beachline`]) and the circle-event queue ([`events`]); the
//! sweep driver ([`sweep`]) drives the two through an interleaved event
//! loop, building raw edges and cells; the edge closer ([`close`]) extends,
//! clips, and (optionally) closes them against the bounding box; and the
//! diagram assembler ([`assemble`]) drops dead edges and orders each
//! cell's half-edges into its final cycle.

mod assemble;
mod beachline;
mod close;
mod epsilon;
mod events;
pub mod geometry;
mod sweep;
mod tree;

#[cfg(test)]
mod test_utils;

use thiserror::Error;
use tracing::debug_span;

pub use geometry::{BoundingBox, Cell, Diagram, Edge, Halfedge, Point, VertexSlot};

/// Errors [`compute_diagram`] can return.
#[derive(Debug, Error, PartialEq)]
pub enum VoronoiError {
    #[error("invalid bounding box: xl={xl} xr={xr} yt={yt} yb={yb}")]
    InvalidBoundingBox { xl: f64, xr: f64, yt: f64, yb: f64 },

    #[error("site {index} is not finite: ({x}, {y})")]
    NonFiniteSite { index: usize, x: f64, y: f64 },

    #[error("internal consistency violation: {0}")]
    InternalConsistency(&'static str),
}

/// Compute the Voronoi diagram of `sites` clipped to `bbox`. When
/// `close_cells` is true, every cell's half-edge cycle is closed along the
/// bounding box perimeter; when false, cells on the convex hull are left
/// with an open boundary (no border edges are synthesized).
///
/// Sites are validated to be finite; an earlier duplicate site wins and
/// later exact duplicates are silently dropped, matching the sweep's
/// treatment of simultaneous site events at the same point.
pub fn compute_diagram(
    sites: &[Point],
    bbox: BoundingBox,
    close_cells: bool,
) -> Result<Diagram, VoronoiError> {
    let span = debug_span!("compute_diagram", sites = sites.len(), close_cells);
    let _enter = span.enter();

    for (index, site) in sites.iter().enumerate() {
        if !site.is_finite() {
            return Err(VoronoiError::NonFiniteSite {
                index,
                x: site.x,
                y: site.y,
            });
        }
    }

    let mut unique: Vec<Point> = Vec::with_capacity(sites.len());
    for &site in sites {
        if !unique.contains(&site) {
            unique.push(site);
        }
    }

    let result = sweep::run(&unique);
    let mut edges = result.edges;
    let mut cells = result.cells;

    close::close_open_edges(&mut edges, &bbox);
    close::clip_edges_to_box(&mut edges, &bbox);
    if close_cells {
        close::close_cells(&mut edges, &mut cells, &bbox);
    }

    Ok(assemble::assemble(edges, cells))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_bounding_box() {
        let err = BoundingBox::new(10.0, 0.0, 0.0, 10.0).unwrap_err();
        assert!(matches!(err, VoronoiError::InvalidBoundingBox { .. }));
    }

    #[test]
    fn rejects_non_finite_site() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let sites = vec![Point::new(f64::NAN, 1.0)];
        let err = compute_diagram(&sites, bbox, true).unwrap_err();
        assert!(matches!(err, VoronoiError::NonFiniteSite { index: 0, .. }));
    }

    #[test]
    fn two_sites_horizontal_closed() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let sites = vec![Point::new(4.0, 5.0), Point::new(6.0, 5.0)];
        let diagram = compute_diagram(&sites, bbox, true).unwrap();
        assert_eq!(diagram.edges.len(), 7);
        assert_eq!(diagram.cells.len(), 2);
        assert_eq!(diagram.cells[0].halfedges.len(), 4);
        assert_eq!(diagram.cells[1].halfedges.len(), 4);
    }

    #[test]
    fn two_sites_horizontal_open() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let sites = vec![Point::new(4.0, 5.0), Point::new(6.0, 5.0)];
        let diagram = compute_diagram(&sites, bbox, false).unwrap();
        assert_eq!(diagram.edges.len(), 1);
        assert_eq!(diagram.cells.len(), 2);
        assert_eq!(diagram.cells[0].halfedges.len(), 1);
        assert_eq!(diagram.cells[1].halfedges.len(), 1);
    }

    #[test]
    fn three_sites_triangle_closed() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let sites = vec![
            Point::new(4.0, 5.0),
            Point::new(6.0, 5.0),
            Point::new(5.0, 8.0),
        ];
        let diagram = compute_diagram(&sites, bbox, true).unwrap();
        assert_eq!(diagram.edges.len(), 10);
        assert_eq!(diagram.cells.len(), 3);
    }

    #[test]
    fn three_sites_triangle_open() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let sites = vec![
            Point::new(4.0, 5.0),
            Point::new(6.0, 5.0),
            Point::new(5.0, 8.0),
        ];
        let diagram = compute_diagram(&sites, bbox, false).unwrap();
        assert_eq!(diagram.edges.len(), 3);
        assert_eq!(diagram.cells.len(), 3);
        for cell in &diagram.cells {
            assert_eq!(cell.halfedges.len(), 2);
        }
    }

    #[test]
    fn hundred_collinear_sites_closed() {
        let bbox = BoundingBox::new(0.0, 100.0, 0.0, 100.0).unwrap();
        let sites: Vec<Point> = (0..100).map(|x| Point::new(x as f64, 1.0)).collect();
        let diagram = compute_diagram(&sites, bbox, true).unwrap();
        assert_eq!(diagram.edges.len(), 301);
        assert_eq!(diagram.cells.len(), 100);
        for cell in &diagram.cells {
            assert_eq!(cell.halfedges.len(), 4);
        }
    }

    #[test]
    fn ten_by_ten_grid_closed_completes_with_rectangular_interior_cells() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let sites: Vec<Point> = (0..10)
            .flat_map(|x| (0..10).map(move |y| Point::new(x as f64, y as f64)))
            .collect();
        let diagram = compute_diagram(&sites, bbox, true).unwrap();
        assert_eq!(diagram.cells.len(), 100);
        for cell in &diagram.cells {
            assert!(!cell.halfedges.is_empty());
        }
        let interior = diagram
            .cells
            .iter()
            .find(|c| c.site == Point::new(5.0, 5.0))
            .unwrap();
        assert_eq!(interior.halfedges.len(), 4);
    }

    #[test]
    fn duplicate_sites_are_collapsed() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let sites = vec![
            Point::new(2.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(8.0, 8.0),
        ];
        let diagram = compute_diagram(&sites, bbox, false).unwrap();
        assert_eq!(diagram.cells.len(), 2);
    }

    #[test]
    fn every_edge_endpoint_lies_within_bbox() {
        let bbox = BoundingBox::new(0.0, 100.0, 0.0, 100.0).unwrap();
        let sites = vec![
            Point::new(10.0, 10.0),
            Point::new(90.0, 10.0),
            Point::new(50.0, 90.0),
            Point::new(30.0, 50.0),
            Point::new(70.0, 50.0),
        ];
        let diagram = compute_diagram(&sites, bbox, true).unwrap();
        for edge in &diagram.edges {
            assert!(bbox.contains(edge.va.point().unwrap()));
            assert!(bbox.contains(edge.vb.point().unwrap()));
        }
    }
}

#[cfg(test)]
mod invariant_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_sites(max_n: usize) -> impl Strategy<Value = Vec<Point>> {
        prop::collection::vec((1.0f64..99.0, 1.0f64..99.0), 1..max_n)
            .prop_map(|pairs| pairs.into_iter().map(|(x, y)| Point::new(x, y)).collect())
    }

    proptest! {
        #[test]
        fn endpoints_stay_within_bbox(sites in arb_sites(12)) {
            let bbox = BoundingBox::new(0.0, 100.0, 0.0, 100.0).unwrap();
            let diagram = compute_diagram(&sites, bbox, true).unwrap();
            for edge in &diagram.edges {
                prop_assert!(bbox.contains(edge.va.point().unwrap()));
                prop_assert!(bbox.contains(edge.vb.point().unwrap()));
            }
        }

        #[test]
        fn halfedge_angles_are_non_increasing_per_cell(sites in arb_sites(12)) {
            let bbox = BoundingBox::new(0.0, 100.0, 0.0, 100.0).unwrap();
            let diagram = compute_diagram(&sites, bbox, true).unwrap();
            for cell in &diagram.cells {
                for w in cell.halfedges.windows(2) {
                    prop_assert!(w[0].angle >= w[1].angle - 1e-9);
                }
            }
        }

        #[test]
        fn closed_cells_have_no_gaps(sites in arb_sites(12)) {
            let bbox = BoundingBox::new(0.0, 100.0, 0.0, 100.0).unwrap();
            let diagram = compute_diagram(&sites, bbox, true).unwrap();
            for cell in &diagram.cells {
                let n = cell.halfedges.len();
                if n < 2 {
                    continue;
                }
                for i in 0..n {
                    let a = &cell.halfedges[i];
                    let b = &cell.halfedges[(i + 1) % n];
                    let end = a.end_point(&diagram.edges[a.edge]).point().unwrap();
                    let start = b.start_point(&diagram.edges[b.edge]).point().unwrap();
                    prop_assert!(geometry::distance(end, start) < 1e-6);
                }
            }
        }

        #[test]
        fn edge_count_respects_planar_bound(sites in arb_sites(12)) {
            let bbox = BoundingBox::new(0.0, 100.0, 0.0, 100.0).unwrap();
            let n = sites.len();
            let diagram = compute_diagram(&sites, bbox, false).unwrap();
            if n >= 3 {
                prop_assert!(diagram.edges.len() <= 3 * n);
            }
        }

        #[test]
        fn recomputation_is_deterministic(sites in arb_sites(12)) {
            let bbox = BoundingBox::new(0.0, 100.0, 0.0, 100.0).unwrap();
            let first = compute_diagram(&sites, bbox, true).unwrap();
            let second = compute_diagram(&sites, bbox, true).unwrap();
            prop_assert_eq!(first.edges.len(), second.edges.len());
            prop_assert_eq!(first.cells.len(), second.cells.len());
        }
    }
}
