//! Geometry primitives (GP): the point/edge/half-edge/cell data model and
//! the pure numeric functions the sweep and the edge closer build on.

use crate::epsilon::ALGORITHMIC_EPSILON;
use crate::VoronoiError;

/// A 2D point in double precision. Sites, vertices, and breakpoints are all
/// represented with this type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An axis-aligned bounding box. `y` grows downward, consistent with the
/// sweep progressing in increasing `y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub xl: f64,
    pub xr: f64,
    pub yt: f64,
    pub yb: f64,
}

impl BoundingBox {
    pub fn new(xl: f64, xr: f64, yt: f64, yb: f64) -> Result<Self, VoronoiError> {
        if xl >= xr || yt >= yb || ![xl, xr, yt, yb].iter().all(|v| v.is_finite()) {
            return Err(VoronoiError::InvalidBoundingBox { xl, xr, yt, yb });
        }
        Ok(BoundingBox { xl, xr, yt, yb })
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.xl - ALGORITHMIC_EPSILON
            && p.x <= self.xr + ALGORITHMIC_EPSILON
            && p.y >= self.yt - ALGORITHMIC_EPSILON
            && p.y <= self.yb + ALGORITHMIC_EPSILON
    }

    /// The four corners, in the order used by the perimeter walk: top-left,
    /// top-right, bottom-right, bottom-left.
    pub fn corner(&self, index: i64) -> Point {
        match index.rem_euclid(4) {
            0 => Point::new(self.xl, self.yt),
            1 => Point::new(self.xr, self.yt),
            2 => Point::new(self.xr, self.yb),
            _ => Point::new(self.xl, self.yb),
        }
    }
}

/// An edge endpoint: either not yet determined by the sweep, or fixed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VertexSlot {
    Unset,
    Set(Point),
}

impl VertexSlot {
    pub fn is_set(&self) -> bool {
        matches!(self, VertexSlot::Set(_))
    }

    pub fn point(&self) -> Option<Point> {
        match self {
            VertexSlot::Set(p) => Some(*p),
            VertexSlot::Unset => None,
        }
    }
}

pub type EdgeId = usize;

/// An undirected bisector segment between two sites (or, for a border edge
/// synthesized during cell closure, a segment along the bounding box with
/// no right site).
#[derive(Clone, Debug)]
pub struct Edge {
    pub left_site: Point,
    pub right_site: Option<Point>,
    pub va: VertexSlot,
    pub vb: VertexSlot,
}

impl Edge {
    pub fn new(left_site: Point, right_site: Point) -> Self {
        Edge {
            left_site,
            right_site: Some(right_site),
            va: VertexSlot::Unset,
            vb: VertexSlot::Unset,
        }
    }

    pub fn new_border(site: Point, va: Point, vb: Point) -> Self {
        Edge {
            left_site: site,
            right_site: None,
            va: VertexSlot::Set(va),
            vb: VertexSlot::Set(vb),
        }
    }

    /// Set the start point of this edge as seen from the (`l_site`,
    /// `r_site`) pair, normalizing against the edge's own `left_site` /
    /// `right_site` the way the original sweep's `setEdgeStartpoint` does:
    /// the first call picks `va` (and anchors the edge's sides to whichever
    /// pair it was called with); later calls are oriented against that
    /// anchor rather than against the caller's own notion of left/right.
    pub fn set_start_point(&mut self, l_site: Point, r_site: Point, vertex: Point) {
        if self.va == VertexSlot::Unset && self.vb == VertexSlot::Unset {
            self.va = VertexSlot::Set(vertex);
            self.left_site = l_site;
            self.right_site = Some(r_site);
        } else if self.left_site == r_site {
            self.vb = VertexSlot::Set(vertex);
        } else {
            self.va = VertexSlot::Set(vertex);
        }
    }

    pub fn set_end_point(&mut self, l_site: Point, r_site: Point, vertex: Point) {
        self.set_start_point(r_site, l_site, vertex);
    }
}

/// A directed view of an [`Edge`] from one of its two sites.
#[derive(Clone, Copy, Debug)]
pub struct Halfedge {
    pub site: Point,
    pub edge: EdgeId,
    pub angle: f64,
}

impl Halfedge {
    pub fn new(edge_id: EdgeId, edge: &Edge, site: Point) -> Self {
        let angle = match edge.right_site {
            Some(right_site) => {
                let other = if site == edge.left_site {
                    right_site
                } else {
                    edge.left_site
                };
                (other.y - site.y).atan2(other.x - site.x)
            }
            None => {
                let va = edge.va.point().expect("border edge must have both endpoints set");
                let vb = edge.vb.point().expect("border edge must have both endpoints set");
                if edge.left_site == site {
                    (vb.x - va.x).atan2(va.y - vb.y)
                } else {
                    (va.x - vb.x).atan2(vb.y - va.y)
                }
            }
        };
        Halfedge {
            site,
            edge: edge_id,
            angle,
        }
    }

    pub fn start_point(&self, edge: &Edge) -> VertexSlot {
        if edge.left_site == self.site {
            edge.va
        } else {
            edge.vb
        }
    }

    pub fn end_point(&self, edge: &Edge) -> VertexSlot {
        if edge.left_site == self.site {
            edge.vb
        } else {
            edge.va
        }
    }
}

/// One Voronoi cell: a site plus its CCW-ordered half-edge cycle.
#[derive(Clone, Debug)]
pub struct Cell {
    pub site: Point,
    pub halfedges: Vec<Halfedge>,
}

/// The computed, clipped (and optionally closed) Voronoi diagram.
#[derive(Clone, Debug, Default)]
pub struct Diagram {
    pub edges: Vec<Edge>,
    pub cells: Vec<Cell>,
}

/// x-coordinate at which the parabolic arcs with foci `l` (left) and `r`
/// (right) intersect, given the sweep line at `directrix`. Degenerate: if
/// either focus lies exactly on the directrix the break point is that
/// focus's x; if both arcs are equidistant from the directrix the break
/// point is the midpoint of the foci's x coordinates.
pub fn breakpoint_x(l: Point, r: Point, directrix: f64) -> f64 {
    let rfocx = r.x;
    let rfocy = r.y;
    let pby2 = rfocy - directrix;
    if pby2 == 0.0 {
        return rfocx;
    }
    let lfocx = l.x;
    let lfocy = l.y;
    let plby2 = lfocy - directrix;
    if plby2 == 0.0 {
        return lfocx;
    }
    let hl = lfocx - rfocx;
    let aby2 = 1.0 / pby2 - 1.0 / plby2;
    let b = hl / plby2;
    if aby2 != 0.0 {
        let discriminant =
            b * b - 2.0 * aby2 * (hl * hl / (-2.0 * plby2) - lfocy + plby2 / 2.0 + rfocy - pby2 / 2.0);
        return (-b + discriminant.max(0.0).sqrt()) / aby2 + rfocx;
    }
    (rfocx + lfocx) / 2.0
}

/// The y-coordinate at which a parabola with focus `site` (directrix at
/// `directrix`) passes over `x`. Used to seed a new edge's origin when a
/// site lands exactly on a break point.
pub fn point_on_arc_at_x(site: Point, directrix: f64, x: f64) -> Point {
    let dy = site.y - directrix;
    if dy == 0.0 {
        return Point::new(x, directrix);
    }
    let dx = x - site.x;
    Point::new(x, (dx * dx) / (2.0 * dy) + (site.y + directrix) / 2.0)
}

/// Result of testing a beachline triple `(left, middle, right)` for a
/// future circle-event collapse.
#[derive(Clone, Copy, Debug)]
pub struct CircleCandidate {
    pub center: Point,
    /// y-coordinate of the triggering point: `center.y + radius`.
    pub trigger_y: f64,
}

/// Circumcenter of the triangle `(a, origin, b)`. Unconditional: does not
/// test orientation. Callers that need to know whether the triple actually
/// collapses downward use [`circle_event_candidate`] instead.
pub fn circumcenter(a: Point, origin: Point, b: Point) -> Point {
    let ax = a.x - origin.x;
    let ay = a.y - origin.y;
    let bx = b.x - origin.x;
    let by = b.y - origin.y;
    let d = 2.0 * (ax * by - ay * bx);
    let ha = ax * ax + ay * ay;
    let hb = bx * bx + by * by;
    let x = (by * ha - ay * hb) / d;
    let y = (ax * hb - bx * ha) / d;
    Point::new(x + origin.x, y + origin.y)
}

/// Test whether the three sites `(l, c, r)` (in beachline left-to-right
/// order) collapse downward, and if so compute the circumcenter and the
/// triggering point's y-coordinate. Returns `None` for collinear or
/// non-collapsing (clockwise) triples.
pub fn circle_event_candidate(l: Point, c: Point, r: Point) -> Option<CircleCandidate> {
    let ax = l.x - c.x;
    let ay = l.y - c.y;
    let cx = r.x - c.x;
    let cy = r.y - c.y;

    // l -> c -> r clockwise (or collinear) means the middle arc can never
    // collapse into a vertex.
    let d = 2.0 * (ax * cy - ay * cx);
    if d >= 0.0 {
        return None;
    }

    let center = circumcenter(l, c, r);
    let radius = distance(center, c);

    Some(CircleCandidate {
        center,
        trigger_y: center.y + radius,
    })
}

pub fn distance(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Extend an edge with at least one unset endpoint out to the bounding
/// box along its bisector. Handles the fully-open case (both endpoints
/// unset, e.g. a two-site diagram whose single edge never collapsed).
pub fn connect_edge_to_box(edge: &mut Edge, bbox: &BoundingBox) {
    if edge.vb.is_set() {
        return;
    }
    let r_site = edge.right_site.expect("open edges always have a right site before closing");
    let l_site = edge.left_site;

    let (lx, ly) = (l_site.x, l_site.y);
    let (rx, ry) = (r_site.x, r_site.y);
    let fx = (lx + rx) / 2.0;
    let fy = (ly + ry) / 2.0;

    let (va, vb): (Option<Point>, Point);

    if ry == ly {
        if fx < bbox.xl || fx >= bbox.xr {
            return;
        }
        if lx > rx {
            va = match edge.va.point() {
                None => Some(Point::new(fx, bbox.yt)),
                Some(p) if p.y >= bbox.yb => return,
                some => some,
            };
            vb = Point::new(fx, bbox.yb);
        } else {
            va = match edge.va.point() {
                None => Some(Point::new(fx, bbox.yb)),
                Some(p) if p.y < bbox.yt => return,
                some => some,
            };
            vb = Point::new(fx, bbox.yt);
        }
    } else {
        let fm = (lx - rx) / (ry - ly);
        let fb = fy - fm * fx;
        if !(-1.0..=1.0).contains(&fm) {
            if lx > rx {
                va = match edge.va.point() {
                    None => Some(Point::new((bbox.yt - fb) / fm, bbox.yt)),
                    Some(p) if p.y >= bbox.yb => return,
                    some => some,
                };
                vb = Point::new((bbox.yb - fb) / fm, bbox.yb);
            } else {
                va = match edge.va.point() {
                    None => Some(Point::new((bbox.yb - fb) / fm, bbox.yb)),
                    Some(p) if p.y < bbox.yt => return,
                    some => some,
                };
                vb = Point::new((bbox.yt - fb) / fm, bbox.yt);
            }
        } else if ly < ry {
            va = match edge.va.point() {
                None => Some(Point::new(bbox.xl, fm * bbox.xl + fb)),
                Some(p) if p.x >= bbox.xr => return,
                some => some,
            };
            vb = Point::new(bbox.xr, fm * bbox.xr + fb);
        } else {
            va = match edge.va.point() {
                None => Some(Point::new(bbox.xr, fm * bbox.xr + fb)),
                Some(p) if p.x < bbox.xl => return,
                some => some,
            };
            vb = Point::new(bbox.xl, fm * bbox.xl + fb);
        }
    }

    edge.va = VertexSlot::Set(va.unwrap());
    edge.vb = VertexSlot::Set(vb);
}

/// Liang-Barsky clip of the segment `(a, b)` against `bbox`. Returns the
/// clipped endpoints, or `None` if no portion of the segment survives.
pub fn clip_segment(a: Point, b: Point, bbox: &BoundingBox) -> Option<(Point, Point)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    // left (x >= xl)
    {
        let q = a.x - bbox.xl;
        if dx == 0.0 && q < 0.0 {
            return None;
        }
        let r = -q / dx;
        if dx < 0.0 {
            if r < t0 {
                return None;
            } else if r < t1 {
                t1 = r;
            }
        } else if dx > 0.0 {
            if r > t1 {
                return None;
            } else if r > t0 {
                t0 = r;
            }
        }
    }
    // right (x <= xr)
    {
        let q = bbox.xr - a.x;
        if dx == 0.0 && q < 0.0 {
            return None;
        }
        let r = q / dx;
        if dx < 0.0 {
            if r > t1 {
                return None;
            } else if r > t0 {
                t0 = r;
            }
        } else if dx > 0.0 {
            if r < t0 {
                return None;
            } else if r < t1 {
                t1 = r;
            }
        }
    }
    // top (y >= yt)
    {
        let q = a.y - bbox.yt;
        if dy == 0.0 && q < 0.0 {
            return None;
        }
        let r = -q / dy;
        if dy < 0.0 {
            if r < t0 {
                return None;
            } else if r < t1 {
                t1 = r;
            }
        } else if dy > 0.0 {
            if r > t1 {
                return None;
            } else if r > t0 {
                t0 = r;
            }
        }
    }
    // bottom (y <= yb)
    {
        let q = bbox.yb - a.y;
        if dy == 0.0 && q < 0.0 {
            return None;
        }
        let r = q / dy;
        if dy < 0.0 {
            if r > t1 {
                return None;
            } else if r > t0 {
                t0 = r;
            }
        } else if dy > 0.0 {
            if r < t0 {
                return None;
            } else if r < t1 {
                t1 = r;
            }
        }
    }

    if t0 > t1 {
        return None;
    }

    let pa = Point::new(a.x + t0 * dx, a.y + t0 * dy);
    let pb = Point::new(a.x + t1 * dx, a.y + t1 * dy);
    Some((pa, pb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_midway_when_equidistant() {
        let l = Point::new(0.0, 0.0);
        let r = Point::new(10.0, 0.0);
        let x = breakpoint_x(l, r, -5.0);
        assert!((x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn breakpoint_on_directrix_focus() {
        let l = Point::new(2.0, 5.0);
        let r = Point::new(8.0, 5.0);
        // directrix passes through r's y: right focus on the sweep line.
        let x = breakpoint_x(l, r, 5.0);
        assert_eq!(x, 8.0);
    }

    #[test]
    fn clip_drops_segment_entirely_outside() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let a = Point::new(-5.0, 20.0);
        let b = Point::new(-1.0, 25.0);
        assert!(clip_segment(a, b, &bbox).is_none());
    }

    #[test]
    fn clip_shortens_partially_outside_segment() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let a = Point::new(-5.0, 5.0);
        let b = Point::new(5.0, 5.0);
        let (pa, pb) = clip_segment(a, b, &bbox).unwrap();
        assert!((pa.x - 0.0).abs() < 1e-9);
        assert!((pb.x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn circle_event_rejects_collinear() {
        let l = Point::new(0.0, 0.0);
        let c = Point::new(1.0, 0.0);
        let r = Point::new(2.0, 0.0);
        assert!(circle_event_candidate(l, c, r).is_none());
    }

    #[test]
    fn circle_event_finds_center_for_right_triangle() {
        let l = Point::new(0.0, 0.0);
        let c = Point::new(2.0, 0.0);
        let r = Point::new(1.0, 2.0);
        let cand = circle_event_candidate(l, c, r);
        assert!(cand.is_some());
    }
}
