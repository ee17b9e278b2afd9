//! Turns raw segment coordinates into validated polygons.
//!
//! Layout-analysis output is frequently malformed: self-intersecting
//! outlines, collapsed boxes, coordinates pushed off the page by a bad
//! deskew. The validator repairs what it can, downgrades cosmetic problems
//! to warnings, and rejects the rest. A rejected segment is logged at error
//! level and `None` is returned; the caller skips it.

use super::{Affine, LineString, Point, Polygon};
use crate::document::Segment;
use crate::error::GeometryError;

/// Minimum vertex count and ring length below which a polygon is flagged.
const MIN_POINTS: usize = 4;
const MIN_PERIMETER: f64 = 4.0;

/// A polygon that passed validation, plus the soft warnings it collected.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPolygon {
    /// The (possibly repaired) polygon
    pub polygon: Polygon,
    /// Human readable warnings, empty for clean input
    pub warnings: Vec<String>,
}

/// Builds polygons for one page.
#[derive(Debug, Clone)]
pub struct GeometryValidator {
    transform: Affine,
    page_id: String,
}

impl GeometryValidator {
    /// Create a validator applying `transform` to every segment coordinate.
    ///
    /// `page_id` only appears in log lines.
    pub fn new(transform: Affine, page_id: impl Into<String>) -> Self {
        Self {
            transform,
            page_id: page_id.into(),
        }
    }

    /// The page id used in log lines.
    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Validate the outline of `segment`.
    pub fn build(&self, segment: &Segment) -> Option<ValidatedPolygon> {
        self.build_points(&segment.descriptor(), segment.points())
    }

    /// Validate a raw coordinate list; `descriptor` names it in log lines.
    pub fn build_points(&self, descriptor: &str, points: &[Point]) -> Option<ValidatedPolygon> {
        let points: Vec<Point> = points.iter().map(|p| self.transform.apply(*p)).collect();

        let polygon = match Polygon::new(&points) {
            Ok(polygon) => polygon,
            Err(err) => {
                self.reject(descriptor, &err);
                return None;
            },
        };

        let mut warnings = Vec::new();

        let polygon = match polygon.explain_invalidity() {
            None => polygon,
            Some(reason) => match repair(&polygon).0 {
                Some((fixed, tolerance)) => {
                    let error = tolerance / fixed.area();
                    let percent = error * 100.0;
                    warnings.push(format!("{} fixed with an error of {:.3}%", reason, percent));
                    fixed
                },
                None => {
                    self.reject(descriptor, &GeometryError::Invalid(reason));
                    return None;
                },
            },
        };

        if polygon.len() < MIN_POINTS || polygon.perimeter() < MIN_PERIMETER {
            warnings.push("has too few points".to_string());
        }

        if !(polygon.area() > 0.0) {
            self.reject(descriptor, &GeometryError::Empty);
            return None;
        }

        let bounds = polygon.bounds();
        if bounds.x < 0.0 || bounds.y < 0.0 {
            warnings.push("is negative".to_string());
        }

        if !warnings.is_empty() {
            log::warn!("Page \"{}\" @ {} {}", self.page_id, descriptor, warnings.join(" | "));
        }

        Some(ValidatedPolygon { polygon, warnings })
    }

    /// Build the baseline polyline of a text line.
    ///
    /// Returns `None` without logging when the line has no baseline.
    pub fn build_baseline(&self, line: &Segment) -> Option<LineString> {
        let raw = line.baseline()?;
        let points: Vec<Point> = raw
            .iter()
            .map(|p| {
                let t = self.transform.apply(*p);
                Point::new(t.x.round(), t.y.round())
            })
            .collect();

        match LineString::new(&points) {
            Ok(baseline) => Some(baseline),
            Err(err) => {
                log::error!(
                    "Page \"{}\" @ {}/Baseline {}",
                    self.page_id,
                    line.id().unwrap_or_default(),
                    err
                );
                None
            },
        }
    }

    fn reject(&self, descriptor: &str, err: &GeometryError) {
        log::error!("Page \"{}\" @ {} {}", self.page_id, descriptor, err);
    }
}

/// Most ring rotations tried at each tolerance.
const MAX_ROTATIONS: usize = 8;

/// Repair a self-intersecting ring by simplification.
///
/// Tolerance starts at one pixel and doubles up to the bounds diagonal.
/// Douglas-Peucker keeps the anchor vertex, so at each tolerance up to
/// [`MAX_ROTATIONS`] evenly spaced starting vertices are tried. The search
/// stops early once every rotation collapses. Returns the first valid
/// polygon with positive area together with the tolerance that produced it.
///
/// ```
/// use segview::geometry::{make_valid, Point, Polygon};
///
/// let ring = [(10.0, 10.0), (110.0, 10.0), (110.0, 60.0), (10.0, 60.0), (10.5, 9.0)];
/// let twisted = Polygon::new(&ring.map(Point::from)).unwrap();
/// let (fixed, tolerance) = make_valid(&twisted).unwrap();
/// assert!(fixed.is_valid());
/// assert_eq!((fixed.area(), tolerance), (5000.0, 2.0));
/// ```
pub fn make_valid(polygon: &Polygon) -> Option<(Polygon, f64)> {
    if polygon.is_valid() {
        return Some((polygon.clone(), 0.0));
    }
    repair(polygon).0
}

/// Starting vertices tried per tolerance, spread evenly over the ring.
fn rotations(len: usize) -> impl Iterator<Item = usize> {
    let tries = len.min(MAX_ROTATIONS);
    (0..tries).map(move |k| k * len / tries)
}

/// The repair search for an invalid ring, plus the number of
/// simplifications it ran.
fn repair(polygon: &Polygon) -> (Option<(Polygon, f64)>, usize) {
    let limit = polygon.bounds().diagonal().max(1.0);
    let mut tolerance = 1.0;
    let mut attempts = 0;
    while tolerance <= limit {
        let mut collapsed = true;
        for shift in rotations(polygon.len()) {
            attempts += 1;
            let Some(candidate) = polygon.rotated(shift).simplify(tolerance) else {
                continue;
            };
            collapsed = false;
            if candidate.area() > 0.0 && candidate.is_valid() {
                log::trace!(
                    "repaired ring with tolerance {} after rotating by {}",
                    tolerance,
                    shift
                );
                return (Some((candidate, tolerance)), attempts);
            }
        }
        if collapsed {
            log::trace!("ring collapsed at tolerance {}", tolerance);
            break;
        }
        tolerance *= 2.0;
    }
    (None, attempts)
}
