/// Axis-aligned geometry: points, segments and the segment intersector.
///
/// Every coordinate the engine compares has been through [`round2`], so a
/// position reached by repeated float additions compares equal to the same
/// position recorded as a breakpoint. Without it, 5.499999 vs 5.5 produces
/// missed or phantom intersections.
///
/// ## Intersection rule
///
/// Both segments are horizontal or vertical (never both, never a point).
/// A single candidate point is built per axis and then box-tested:
///
/// ┌──────────────────────────┬──────────────────────────────────────┐
/// │ Reference on this axis    │ Candidate coordinate                 │
/// ├──────────────────────────┼──────────────────────────────────────┤
/// │ constant (r0 == r1)       │ r0                                   │
/// │ varying                   │ tail start, clamped into [min, max]  │
/// └──────────────────────────┴──────────────────────────────────────┘
///
/// The candidate is a hit iff it lies inside the closed bounding box of
/// BOTH segments. That accepts "+" crossings, "T" junctions and colinear
/// overlaps, and rejects everything disjoint.

/// Fixed precision for positions: 2 decimal places.
pub const PRECISION: f64 = 100.0;

/// Round to the engine's fixed precision.
#[inline]
pub fn round2(v: f64) -> f64 {
    (v * PRECISION).round() / PRECISION
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn rounded(self) -> Self {
        Point { x: round2(self.x), y: round2(self.y) }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A directed segment. Direction matters only for [`Segment::reverses`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Segment { start, end }
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn is_axis_aligned(&self) -> bool {
        self.start.x == self.end.x || self.start.y == self.end.y
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    fn x_range(&self) -> (f64, f64) {
        (self.start.x.min(self.end.x), self.start.x.max(self.end.x))
    }

    fn y_range(&self) -> (f64, f64) {
        (self.start.y.min(self.end.y), self.start.y.max(self.end.y))
    }

    /// Closed bounding-box test.
    pub fn contains(&self, p: Point) -> bool {
        let (x0, x1) = self.x_range();
        let (y0, y1) = self.y_range();
        x0 <= p.x && p.x <= x1 && y0 <= p.y && p.y <= y1
    }

    /// Does `other` run along the same axis in the opposite direction?
    pub fn reverses(&self, other: &Segment) -> bool {
        if self.is_vertical() != other.is_vertical() {
            return false;
        }
        let dot = (self.end.x - self.start.x) * (other.end.x - other.start.x)
            + (self.end.y - self.start.y) * (other.end.y - other.start.y);
        dot < 0.0
    }
}

/// Consecutive-pair segments of a polyline. Fewer than two points yield none.
pub fn segments(points: &[Point]) -> impl Iterator<Item = Segment> + '_ {
    points.windows(2).map(|w| Segment::new(w[0], w[1]))
}

/// Where does `tail` touch or cross `reference`?
///
/// Precondition: both segments are axis-aligned and non-degenerate. The
/// trace compression rule and ±90° turns guarantee this; it is checked in
/// debug builds only.
pub fn intersect(tail: &Segment, reference: &Segment) -> Option<Point> {
    debug_assert!(
        !tail.is_degenerate() && tail.is_axis_aligned(),
        "tail segment violates intersector precondition: {tail:?}"
    );
    debug_assert!(
        !reference.is_degenerate() && reference.is_axis_aligned(),
        "reference segment violates intersector precondition: {reference:?}"
    );

    let candidate = Point {
        x: axis_candidate(reference.start.x, reference.end.x, tail.start.x),
        y: axis_candidate(reference.start.y, reference.end.y, tail.start.y),
    };

    if tail.contains(candidate) && reference.contains(candidate) {
        Some(candidate)
    } else {
        None
    }
}

#[inline]
fn axis_candidate(r0: f64, r1: f64, t0: f64) -> f64 {
    if r0 == r1 {
        r0
    } else {
        t0.clamp(r0.min(r1), r0.max(r1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    /// Does `tail` hit a polyline given as parallel x/y vectors?
    fn hits_polyline(xs: &[f64], ys: &[f64], tail: Segment) -> bool {
        let pts: Vec<Point> = xs.iter().zip(ys).map(|(&x, &y)| Point::new(x, y)).collect();
        let hit = segments(&pts).any(|r| intersect(&tail, &r).is_some());
        hit
    }

    // ── rounding ──

    #[test]
    fn round2_removes_float_jitter() {
        assert_eq!(round2(5.499999), 5.5);
        assert_eq!(round2(0.1 + 0.2), 0.3);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }

    // ── disjoint ──

    #[test]
    fn disjoint_perpendicular_misses() {
        // vertical tail above a horizontal line
        assert_eq!(intersect(&seg(0.0, 2.0, 0.0, 1.0), &seg(-1.0, 0.0, 1.0, 0.0)), None);
        // vertical tail to the right of a horizontal line's end
        assert_eq!(intersect(&seg(2.0, -1.0, 2.0, 1.0), &seg(-1.0, 0.0, 1.0, 0.0)), None);
    }

    #[test]
    fn disjoint_parallel_misses() {
        // offset horizontals
        assert_eq!(intersect(&seg(0.0, 1.0, 5.0, 1.0), &seg(0.0, 0.0, 5.0, 0.0)), None);
        // same line, gap between
        assert_eq!(intersect(&seg(6.0, 0.0, 9.0, 0.0), &seg(0.0, 0.0, 5.0, 0.0)), None);
        // offset verticals
        assert_eq!(intersect(&seg(1.0, 0.0, 1.0, 5.0), &seg(0.0, 0.0, 0.0, 5.0)), None);
    }

    // ── hits ──

    #[test]
    fn perpendicular_crossing_hits_at_center() {
        let hit = intersect(&seg(0.0, -1.0, 0.0, 1.0), &seg(-1.0, 0.0, 1.0, 0.0));
        assert_eq!(hit, Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn t_junction_hits_at_endpoint() {
        // tail ends on the interior of the reference
        let tail = seg(0.0, -2.0, 0.0, 0.0);
        let reference = seg(-1.0, 0.0, 1.0, 0.0);
        let p = intersect(&tail, &reference).unwrap();
        assert_eq!(p, Point::new(0.0, 0.0));
        assert!(tail.contains(p) && reference.contains(p));
    }

    #[test]
    fn colinear_head_on_touch_hits() {
        // tail heading east meets a line heading west exactly at x = 0
        let tail = seg(-10.0, 0.0, 0.0, 0.0);
        let reference = seg(10.0, 0.0, 0.0, 0.0);
        let p = intersect(&tail, &reference).unwrap();
        assert_eq!(p, Point::new(0.0, 0.0));
        assert!(tail.contains(p) && reference.contains(p));
    }

    #[test]
    fn colinear_overlap_found_when_tail_start_outside_reference() {
        let tail = seg(-10.0, 0.0, 1.0, 0.0);
        let reference = seg(10.0, 0.0, -1.0, 0.0);
        let p = intersect(&tail, &reference).unwrap();
        assert_eq!(p, Point::new(-1.0, 0.0));
        assert!(tail.contains(p) && reference.contains(p));
    }

    #[test]
    fn t_and_plus_shapes_in_every_quadrant() {
        // (reference xs, ys, tail) for "T" and "+" shapes in each quadrant
        let cases: [([f64; 3], [f64; 3], Segment); 8] = [
            ([0.0, 1.0, 1.0], [0.0, 0.0, 1.0], seg(1.0, 1.0, 2.0, 1.0)),
            ([0.0, 1.0, 1.0], [0.0, 0.0, 1.0], seg(0.0, 1.0, 2.0, 1.0)),
            ([0.0, -1.0, -1.0], [0.0, 0.0, 1.0], seg(-1.0, 1.0, -2.0, 1.0)),
            ([0.0, -1.0, -1.0], [0.0, 0.0, 1.0], seg(0.0, 1.0, -2.0, 1.0)),
            ([0.0, -1.0, -1.0], [0.0, 0.0, -1.0], seg(-1.0, -1.0, -2.0, -1.0)),
            ([0.0, -1.0, -1.0], [0.0, 0.0, -1.0], seg(0.0, -1.0, -2.0, -1.0)),
            ([0.0, 1.0, 1.0], [0.0, 0.0, -1.0], seg(1.0, -1.0, 2.0, -1.0)),
            ([0.0, 1.0, 1.0], [0.0, 0.0, -1.0], seg(0.0, -1.0, 2.0, -1.0)),
        ];
        for (i, (xs, ys, tail)) in cases.iter().enumerate() {
            assert!(hits_polyline(&xs[..], &ys[..], *tail), "case {i} should intersect");
        }
    }

    // ── helpers ──

    #[test]
    fn reverses_only_on_same_axis() {
        let north = seg(0.0, 0.0, 0.0, 5.0);
        assert!(north.reverses(&seg(0.0, 5.0, 0.0, 2.0)));
        assert!(!north.reverses(&seg(0.0, 5.0, 0.0, 8.0)));
        assert!(!north.reverses(&seg(0.0, 5.0, -3.0, 5.0)));
    }

    #[test]
    fn segments_of_short_polyline_is_empty() {
        assert_eq!(segments(&[]).count(), 0);
        assert_eq!(segments(&[Point::ORIGIN]).count(), 0);
        assert_eq!(segments(&[Point::ORIGIN, Point::new(0.0, 1.0)]).count(), 1);
    }
}
