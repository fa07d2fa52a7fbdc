/// Trace: a player's trail stored as direction-change breakpoints.
///
/// Straight-line movement never adds points; the live head is appended
/// on demand. Consecutive breakpoints are never equal, and the head is only
/// appended when it has left the last breakpoint, so every segment handed to
/// the intersector has non-zero length.

use super::geometry::{segments, Point, Segment};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trace {
    breakpoints: Vec<Point>,
}

impl Trace {
    /// Trace with its placement point already recorded.
    pub fn new(start: Point) -> Self {
        Trace { breakpoints: vec![start.rounded()] }
    }

    /// Record a breakpoint (placement or turn). Returns false when the point
    /// repeats the last breakpoint and was dropped.
    pub fn record(&mut self, point: Point) -> bool {
        let point = point.rounded();
        if self.breakpoints.last() == Some(&point) {
            return false;
        }
        self.breakpoints.push(point);
        true
    }

    pub fn breakpoints(&self) -> &[Point] {
        &self.breakpoints
    }

    pub fn last(&self) -> Option<Point> {
        self.breakpoints.last().copied()
    }

    /// Breakpoints followed by the head, if the head has moved off the last one.
    pub fn polyline(&self, head: Point) -> Vec<Point> {
        let mut points = self.breakpoints.clone();
        if points.last() != Some(&head) {
            points.push(head);
        }
        points
    }

    /// Most recent movement: last breakpoint → head. None while the head
    /// still sits on the last breakpoint.
    pub fn tail(&self, head: Point) -> Option<Segment> {
        let last = self.last()?;
        (last != head).then(|| Segment::new(last, head))
    }

    /// The stored segment ending where the tail starts.
    pub fn predecessor(&self) -> Option<Segment> {
        let n = self.breakpoints.len();
        (n >= 2).then(|| Segment::new(self.breakpoints[n - 2], self.breakpoints[n - 1]))
    }

    /// Stored segments that do not touch the tail's start point, i.e. all
    /// but the predecessor. These are what a self-check may hit.
    pub fn settled_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let end = self.breakpoints.len().saturating_sub(1);
        segments(&self.breakpoints[..end])
    }
}
