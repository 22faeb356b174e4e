use approx::relative_eq;
use itertools::Itertools;

use crate::geometry::Point;

pub type Segment = (Point, Point);

pub fn compare_points(a: &Point, b: &Point) -> bool {
    relative_eq!(a.x, b.x, epsilon = 1e-6) && relative_eq!(a.y, b.y, epsilon = 1e-6)
}

pub fn compare_segments(a: &Segment, b: &Segment) -> bool {
    (compare_points(&a.0, &b.0) && compare_points(&a.1, &b.1))
        || (compare_points(&a.0, &b.1) && compare_points(&a.1, &b.0))
}

/// Unordered comparison of two segment sets: every segment in `a` must
/// match exactly one in `b`, under some permutation.
pub fn compare_segment_sets(a: &[Segment], b: &[Segment]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    for perm in b.iter().permutations(b.len()) {
        if (0..a.len()).all(|i| compare_segments(&a[i], perm[i])) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_sets_match_regardless_of_order() {
        let a = [
            (Point::new(0.0, 0.0), Point::new(1.0, 1.0)),
            (Point::new(2.0, 2.0), Point::new(3.0, 3.0)),
        ];
        let b = [
            (Point::new(3.0, 3.0), Point::new(2.0, 2.0)),
            (Point::new(1.0, 1.0), Point::new(0.0, 0.0)),
        ];
        assert!(compare_segment_sets(&a, &b));
    }
}
