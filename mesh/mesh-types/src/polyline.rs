//! Ordered vertex chains.

use nalgebra::Point3;

use crate::Aabb;

/// Maximum distance between first and last vertex for a polyline to count
/// as closed.
pub const POLYLINE_CLOSE_EPS: f32 = 1e-6;

/// An ordered sequence of points in 3D space.
///
/// The total length is cached and maintained incrementally as points are
/// appended. A polyline is *closed* when it has at least three points and
/// its endpoints coincide within [`POLYLINE_CLOSE_EPS`]; the closing edge
/// then contributes to [`Polyline::length`].
///
/// # Example
///
/// ```
/// use mesh_types::{Polyline, Point3};
///
/// let mut line = Polyline::new();
/// line.push(Point3::new(0.0, 0.0, 0.0));
/// line.push(Point3::new(3.0, 0.0, 0.0));
/// line.push(Point3::new(3.0, 4.0, 0.0));
///
/// assert!(!line.is_closed());
/// assert_eq!(line.length(), 7.0);
///
/// line.push(Point3::new(0.0, 0.0, 0.0));
/// assert!(line.is_closed());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Polyline {
    points: Vec<Point3<f32>>,
    /// Sum of consecutive segment lengths, excluding the closing edge.
    open_length: f32,
}

impl Polyline {
    /// Creates an empty polyline.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            open_length: 0.0,
        }
    }

    /// Creates a polyline from a point sequence.
    #[must_use]
    pub fn from_points(points: Vec<Point3<f32>>) -> Self {
        let open_length = points
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).norm())
            .sum();
        Self {
            points,
            open_length,
        }
    }

    /// Appends a point, updating the cached length incrementally.
    pub fn push(&mut self, point: Point3<f32>) {
        if let Some(last) = self.points.last() {
            self.open_length += (point - last).norm();
        }
        self.points.push(point);
    }

    /// Appends every point of an iterator.
    pub fn extend(&mut self, points: impl IntoIterator<Item = Point3<f32>>) {
        for point in points {
            self.push(point);
        }
    }

    /// The points of the polyline.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    /// Number of points.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` if the polyline has no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the polyline forms a loop: at least three points with
    /// coinciding endpoints.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        (last - first).norm() <= POLYLINE_CLOSE_EPS
    }

    /// Total length, including the closing edge for closed polylines.
    ///
    /// The closing edge of a closed polyline is at most
    /// [`POLYLINE_CLOSE_EPS`] long, so in practice this equals the cached
    /// sum of consecutive segment lengths.
    #[must_use]
    pub fn length(&self) -> f32 {
        if self.is_closed() {
            let first = self.points[0];
            let last = self.points[self.points.len() - 1];
            self.open_length + (first - last).norm()
        } else {
            self.open_length
        }
    }

    /// Iterator over consecutive point pairs.
    ///
    /// When `include_closing` is set and the polyline is closed, the final
    /// pair connects the last point back to the first.
    pub fn segments(
        &self,
        include_closing: bool,
    ) -> impl Iterator<Item = (Point3<f32>, Point3<f32>)> + '_ {
        let closing = if include_closing && self.is_closed() && self.points.len() >= 2 {
            Some((self.points[self.points.len() - 1], self.points[0]))
        } else {
            None
        };
        self.points
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .chain(closing)
    }

    /// Bounding box of all points.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.points.iter())
    }
}

impl FromIterator<Point3<f32>> for Polyline {
    fn from_iter<I: IntoIterator<Item = Point3<f32>>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty() {
        let line = Polyline::new();
        assert!(line.is_empty());
        assert_eq!(line.length(), 0.0);
        assert!(!line.is_closed());
    }

    #[test]
    fn test_incremental_length_matches_bulk() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(1.0, 2.0, 3.0),
        ];

        let bulk = Polyline::from_points(points.clone());
        let mut incremental = Polyline::new();
        incremental.extend(points);

        assert_relative_eq!(bulk.length(), 6.0);
        assert_relative_eq!(incremental.length(), bulk.length());
    }

    #[test]
    fn test_two_points_never_closed() {
        let line = Polyline::from_points(vec![Point3::origin(), Point3::origin()]);
        assert!(!line.is_closed());
    }

    #[test]
    fn test_closed_square() {
        let line = Polyline::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ]);
        assert!(line.is_closed());
        assert_relative_eq!(line.length(), 4.0);
    }

    #[test]
    fn test_segments_with_closing() {
        let line = Polyline::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ]);
        assert_eq!(line.segments(false).count(), 3);
        // Endpoints already coincide, so the closing pair is degenerate but
        // still emitted.
        assert_eq!(line.segments(true).count(), 4);
    }

    #[test]
    fn test_open_segments() {
        let line = Polyline::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ]);
        let segments: Vec<_> = line.segments(true).collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].0, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(segments[1].1, Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_bounds() {
        let line = Polyline::from_points(vec![
            Point3::new(-1.0, 0.0, 2.0),
            Point3::new(3.0, -2.0, 0.0),
        ]);
        let bounds = line.bounds();
        assert_eq!(bounds.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Point3::new(3.0, 0.0, 2.0));
    }
}
