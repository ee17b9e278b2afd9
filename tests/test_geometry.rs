//! Geometry validation tests: repairs, rejections and warnings.

mod common;

use common::{capture_logs, logged, pts, rect};
use proptest::prelude::*;
use segview::geometry::{Affine, GeometryValidator, Point};

fn validator() -> GeometryValidator {
    GeometryValidator::new(Affine::identity(), "PAGE_0001")
}

mod rejection {
    use super::*;

    #[test]
    fn test_identical_points_log_one_error() {
        capture_logs();
        let points = pts(&[(5.0, 5.0), (5.0, 5.0), (5.0, 5.0), (5.0, 5.0)]);
        assert!(validator().build_points("TextLine#l3", &points).is_none());

        let errors = logged(log::Level::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], "Page \"PAGE_0001\" @ TextLine#l3 Too few points");
    }

    #[test]
    fn test_zero_area_rejected() {
        capture_logs();
        let points = pts(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (5.0, 0.0)]);
        assert!(validator().build_points("Word#w1", &points).is_none());
        assert_eq!(logged(log::Level::Error).len(), 1);
    }

    #[test]
    fn test_non_finite_rejected() {
        capture_logs();
        let points = pts(&[(0.0, 0.0), (f64::NAN, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!(validator().build_points("Glyph#g1", &points).is_none());
        assert!(logged(log::Level::Error)[0].contains("Non-finite"));
    }
}

mod warnings {
    use super::*;

    #[test]
    fn test_clean_rectangle_logs_nothing() {
        capture_logs();
        let built = validator()
            .build_points("TextRegion#r1", &rect(0.0, 0.0, 50.0, 20.0))
            .unwrap();
        assert!(built.warnings.is_empty());
        assert!(logged(log::Level::Warn).is_empty());
        assert!(logged(log::Level::Error).is_empty());
    }

    #[test]
    fn test_triangle_is_kept_with_warning() {
        capture_logs();
        let built = validator()
            .build_points("ImageRegion#i1", &pts(&[(0.0, 0.0), (40.0, 0.0), (20.0, 30.0)]))
            .unwrap();
        assert_eq!(built.warnings, vec!["has too few points".to_string()]);
        let warns = logged(log::Level::Warn);
        assert_eq!(
            warns,
            vec!["Page \"PAGE_0001\" @ ImageRegion#i1 has too few points".to_string()]
        );
    }

    #[test]
    fn test_negative_after_transform() {
        let v = GeometryValidator::new(Affine::translate(-20.0, 0.0), "p");
        let built = v
            .build_points("Word#w1", &rect(10.0, 10.0, 30.0, 20.0))
            .unwrap();
        assert_eq!(built.warnings, vec!["is negative".to_string()]);
    }

    #[test]
    fn test_repair_and_negative_warnings_combine() {
        capture_logs();
        let twisted = pts(&[(-10.0, 10.0), (90.0, 10.0), (90.0, 60.0), (-10.0, 60.0), (-9.5, 9.0)]);
        let built = validator().build_points("TextRegion#r9", &twisted).unwrap();
        assert_eq!(built.warnings.len(), 2);
        assert!(built.warnings[0].contains("fixed with an error of"));
        assert_eq!(built.warnings[1], "is negative");
        let warns = logged(log::Level::Warn);
        assert_eq!(warns.len(), 1);
        assert!(warns[0].contains(" | is negative"));
    }
}

mod properties {
    use super::*;

    prop_compose! {
        fn positive_rect()(
            x in 0.0..1000.0f64,
            y in 0.0..1000.0f64,
            w in 1.0..500.0f64,
            h in 1.0..500.0f64
        ) -> Vec<Point> {
            pts(&[(x, y), (x + w, y), (x + w, y + h), (x, y + h)])
        }
    }

    proptest! {
        #[test]
        fn valid_rectangles_pass_unchanged(points in positive_rect()) {
            let built = validator().build_points("Word#w", &points);
            prop_assert!(built.is_some());
            let built = built.unwrap();
            prop_assert!(built.warnings.is_empty());
            prop_assert_eq!(built.polygon.exterior(), points.as_slice());
        }

        #[test]
        fn accepted_polygons_are_valid(
            coords in prop::collection::vec((0.0..100.0f64, 0.0..100.0f64), 3..8)
        ) {
            let points = pts(&coords);
            if let Some(built) = validator().build_points("TextRegion#r", &points) {
                prop_assert!(built.polygon.is_valid());
                prop_assert!(built.polygon.area() > 0.0);
            }
        }

        #[test]
        fn translation_keeps_area(
            points in positive_rect(),
            dx in 0.0..100.0f64,
            dy in 0.0..100.0f64
        ) {
            let plain = validator().build_points("Word#w", &points).unwrap();
            let moved = GeometryValidator::new(Affine::translate(dx, dy), "p")
                .build_points("Word#w", &points)
                .unwrap();
            let drift = (plain.polygon.area() - moved.polygon.area()).abs();
            prop_assert!(drift < 1e-6 * plain.polygon.area().max(1.0));
        }
    }
}
