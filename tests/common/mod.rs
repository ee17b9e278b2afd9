//! Shared helpers for integration tests.

#![allow(dead_code)]

use segview::document::{PageDocument, RegionKind, SegmentBuilder, SegmentKey, SegmentKind};
use segview::geometry::Point;
use std::cell::RefCell;
use std::sync::Once;

thread_local! {
    static RECORDS: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Logger that keeps each test thread's records apart.
struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let line = record.args().to_string();
        RECORDS.with(|r| r.borrow_mut().push((record.level(), line)));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Install the capturing logger and clear this thread's records.
pub fn capture_logs() {
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);
    });
    RECORDS.with(|r| r.borrow_mut().clear());
}

/// Records at `level` logged on this thread since [`capture_logs`].
pub fn logged(level: log::Level) -> Vec<String> {
    RECORDS.with(|r| {
        r.borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.clone())
            .collect()
    })
}

/// Kind of a plain text region.
pub const TEXT: SegmentKind = SegmentKind::Region(RegionKind::Text);

pub fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&c| Point::from(c)).collect()
}

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
    pts(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
}

/// Add a segment, panicking on a bad parent.
pub fn add(
    doc: &mut PageDocument,
    parent: SegmentKey,
    kind: SegmentKind,
    id: &str,
    outline: Vec<Point>,
) -> SegmentKey {
    doc.add(parent, SegmentBuilder::new(kind, outline).with_id(id))
        .unwrap()
}

/// A page with a twisted text region `r1` holding line `l1` and word `w1`.
///
/// The region's last vertex pokes through its top edge, so it needs repair.
pub fn twisted_page() -> PageDocument {
    let mut doc = PageDocument::new("page.png", 120.0, 80.0);
    let page = doc.page();
    let ring = pts(&[(10.0, 10.0), (110.0, 10.0), (110.0, 60.0), (10.0, 60.0), (10.5, 9.0)]);
    let region = add(&mut doc, page, TEXT, "r1", ring);
    let line = add(&mut doc, region, SegmentKind::TextLine, "l1", rect(20.0, 20.0, 100.0, 50.0));
    add(&mut doc, line, SegmentKind::Word, "w1", rect(30.0, 25.0, 60.0, 45.0));
    doc
}
