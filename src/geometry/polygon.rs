//! Simple polygons and polylines on top of `geo`, with OGC-style validity
//! checks.

use super::{Point, Rect};
use crate::error::GeometryError;
use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, BoundingRect, Centroid, Contains, Coord, EuclideanLength, InteriorPoint, Simplify};

/// Tolerance below which two coordinates are considered equal.
const EPS: f64 = 1e-9;

/// A simple polygon given by its exterior ring.
///
/// The ring is kept open (the closing vertex is implied) and without
/// consecutive duplicate vertices. Construction only checks that there
/// are at least three distinct finite vertices; use [`Polygon::is_valid`]
/// for the full simple-feature validity rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Vec<Point>,
    shape: geo::Polygon<f64>,
}

impl Polygon {
    /// Build a polygon from a coordinate list.
    ///
    /// An explicit closing vertex (last == first) and consecutive repeated
    /// vertices are dropped.
    pub fn new(points: &[Point]) -> Result<Self, GeometryError> {
        if points.iter().any(|p| !p.is_finite()) {
            return Err(GeometryError::NonFinite);
        }

        let mut exterior: Vec<Point> = Vec::with_capacity(points.len());
        for p in points {
            if exterior.last().map_or(true, |last| !same(last, p)) {
                exterior.push(*p);
            }
        }
        while exterior.len() > 1 && same(&exterior[0], &exterior[exterior.len() - 1]) {
            exterior.pop();
        }

        if exterior.len() < 3 {
            return Err(GeometryError::TooFewPoints);
        }
        Ok(Self::from_ring(exterior))
    }

    fn from_ring(exterior: Vec<Point>) -> Self {
        // geo closes the ring
        let ring = geo::LineString::new(exterior.iter().map(|p| coord(*p)).collect());
        Self {
            shape: geo::Polygon::new(ring, vec![]),
            exterior,
        }
    }

    /// The exterior ring vertices, without the closing vertex.
    pub fn exterior(&self) -> &[Point] {
        &self.exterior
    }

    /// The underlying `geo` polygon.
    pub fn as_geo(&self) -> &geo::Polygon<f64> {
        &self.shape
    }

    /// Number of distinct ring vertices.
    pub fn len(&self) -> usize {
        self.exterior.len()
    }

    /// Always false; a polygon has at least three vertices.
    pub fn is_empty(&self) -> bool {
        self.exterior.is_empty()
    }

    /// Area, positive for either orientation.
    pub fn area(&self) -> f64 {
        self.shape.unsigned_area()
    }

    /// Length of the closed exterior ring.
    pub fn perimeter(&self) -> f64 {
        self.shape.exterior().euclidean_length()
    }

    /// Axis-aligned bounds.
    pub fn bounds(&self) -> Rect {
        match self.shape.bounding_rect() {
            Some(rect) => Rect::from_points(rect.min().x, rect.min().y, rect.max().x, rect.max().y),
            None => Rect::from_points(0.0, 0.0, 0.0, 0.0),
        }
    }

    /// Whether the ring is a valid simple polygon.
    pub fn is_valid(&self) -> bool {
        self.explain_invalidity().is_none()
    }

    /// Describe why the ring is not a simple polygon, or `None` if it is.
    ///
    /// Reports `Self-intersection[x y]` with the first offending location,
    /// in the style of GEOS `explain_validity`. Adjacent edges may only
    /// share their common vertex; any other contact between two edges,
    /// touching included, makes the ring invalid.
    pub fn explain_invalidity(&self) -> Option<String> {
        let edges: Vec<geo::Line<f64>> = self.shape.exterior().lines().collect();
        let n = edges.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                match line_intersection(edges[i], edges[j]) {
                    Some(LineIntersection::Collinear { intersection }) => {
                        return Some(self_intersection(intersection.start));
                    },
                    Some(LineIntersection::SinglePoint { intersection, .. }) if !adjacent => {
                        return Some(self_intersection(intersection));
                    },
                    _ => {},
                }
            }
        }
        None
    }

    /// Douglas-Peucker simplification of the closed ring, anchored at the
    /// first vertex.
    ///
    /// Returns `None` if fewer than three vertices survive.
    pub fn simplify(&self, tolerance: f64) -> Option<Polygon> {
        // simplified as a plain line so a ring may collapse completely
        let mut closed: Vec<Coord<f64>> = self.exterior.iter().map(|p| coord(*p)).collect();
        closed.push(coord(self.exterior[0]));
        let kept = geo::LineString::new(closed).simplify(&tolerance);
        let points: Vec<Point> = kept.coords().map(|c| Point::new(c.x, c.y)).collect();
        Polygon::new(&points).ok()
    }

    /// The same ring starting at vertex `shift`.
    pub fn rotated(&self, shift: usize) -> Polygon {
        let mut exterior = self.exterior.clone();
        let len = exterior.len();
        exterior.rotate_left(shift % len);
        Self::from_ring(exterior)
    }

    /// Whether `p` lies strictly inside the polygon (boundary excluded).
    pub fn contains(&self, p: Point) -> bool {
        self.shape.contains(&geo::Point::new(p.x, p.y))
    }

    /// Area centroid.
    pub fn centroid(&self) -> Point {
        self.shape
            .centroid()
            .map_or(self.exterior[0], |c| Point::new(c.x(), c.y()))
    }

    /// A point guaranteed to lie inside the polygon.
    ///
    /// The centroid when it is inside, otherwise `geo`'s interior point.
    pub fn representative_point(&self) -> Point {
        let centroid = self.centroid();
        if self.contains(centroid) {
            return centroid;
        }
        self.shape
            .interior_point()
            .map_or(centroid, |p| Point::new(p.x(), p.y()))
    }
}

/// An open polyline, used for text line baselines.
#[derive(Debug, Clone, PartialEq)]
pub struct LineString {
    points: Vec<Point>,
    shape: geo::LineString<f64>,
}

impl LineString {
    /// Build a polyline; needs at least two distinct finite points.
    pub fn new(points: &[Point]) -> Result<Self, GeometryError> {
        if points.iter().any(|p| !p.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        let mut deduped: Vec<Point> = Vec::with_capacity(points.len());
        for p in points {
            if deduped.last().map_or(true, |last| !same(last, p)) {
                deduped.push(*p);
            }
        }
        if deduped.len() < 2 {
            return Err(GeometryError::TooFewPoints);
        }
        let shape = geo::LineString::new(deduped.iter().map(|p| coord(*p)).collect());
        Ok(Self {
            points: deduped,
            shape,
        })
    }

    /// The polyline vertices.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Total length.
    pub fn length(&self) -> f64 {
        self.shape.euclidean_length()
    }
}

fn coord(p: Point) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

fn same(a: &Point, b: &Point) -> bool {
    (a.x - b.x).abs() <= EPS && (a.y - b.y).abs() <= EPS
}

fn self_intersection(at: Coord<f64>) -> String {
    let round = |v: f64| (v * 100.0).round() / 100.0;
    format!("Self-intersection[{} {}]", round(at.x), round(at.y))
}
