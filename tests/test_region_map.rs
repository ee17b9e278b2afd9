//! Region map tests driven through full render passes.

mod common;

use common::{add, rect, TEXT};
use segview::document::{PageDocument, RegionKind, SegmentKind};
use segview::rendering::canvas;
use segview::{color::Rgba, Affine, Features, PageRenderer, RegionMap, RenderOptions};

/// Border, a table and a text region with one line holding one word.
fn layout() -> PageDocument {
    let mut doc = PageDocument::new("scan_0042.tif", 400.0, 300.0);
    let page = doc.page();
    add(&mut doc, page, SegmentKind::Border, "b0", rect(5.0, 5.0, 395.0, 295.0));
    let table = SegmentKind::Region(RegionKind::Table);
    add(&mut doc, page, table, "t1", rect(20.0, 200.0, 380.0, 280.0));
    let text = add(&mut doc, page, TEXT, "r1", rect(20.0, 20.0, 380.0, 180.0));
    let line = add(&mut doc, text, SegmentKind::TextLine, "r1_l1", rect(30.0, 30.0, 370.0, 70.0));
    add(&mut doc, line, SegmentKind::Word, "r1_l1_w1", rect(40.0, 35.0, 120.0, 65.0));
    doc
}

fn render(doc: &PageDocument) -> RegionMap {
    let options = RenderOptions::default()
        .with_features(Features::BORDER | Features::REGIONS | Features::LINES | Features::WORDS);
    let page = canvas::blank(400, 300, Rgba::WHITE);
    let mut renderer = PageRenderer::new(&page, Affine::identity(), options);
    renderer.render_all(doc);
    let (_, regions) = renderer.get_result().unwrap();
    regions
}

mod hit_testing {
    use super::*;

    #[test]
    fn test_innermost_region_wins() {
        let regions = render(&layout());
        assert_eq!(regions.find_region(50.0, 50.0).unwrap().id(), "r1_l1_w1");
        assert_eq!(regions.find_region(200.0, 50.0).unwrap().id(), "r1_l1");
        assert_eq!(regions.find_region(200.0, 120.0).unwrap().id(), "r1");
        assert_eq!(regions.find_region(200.0, 240.0).unwrap().id(), "t1");
    }

    #[test]
    fn test_border_is_ignored_by_default() {
        let regions = render(&layout());
        assert!(regions.find_region(10.0, 10.0).is_none());
        let border = regions.find_region_ignoring(10.0, 10.0, &[]).unwrap();
        assert_eq!(border.kind(), SegmentKind::Border);
    }

    #[test]
    fn test_ignore_filter_skips_levels() {
        let regions = render(&layout());
        let hit = regions
            .find_region_ignoring(50.0, 50.0, &[SegmentKind::Word, SegmentKind::TextLine])
            .unwrap();
        assert_eq!(hit.id(), "r1");
    }

    #[test]
    fn test_outside_everything() {
        let regions = render(&layout());
        assert!(regions.find_region(1.0, 1.0).is_none());
        assert!(regions.find_regions(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_find_regions_outermost_first() {
        let regions = render(&layout());
        let ids: Vec<&str> = regions.find_regions(50.0, 50.0).iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["b0", "r1", "r1_l1", "r1_l1_w1"]);
    }
}

mod structure {
    use super::*;

    #[test]
    fn test_tree_shape() {
        let regions = render(&layout());
        assert_eq!(regions.len(), 5);
        let roots: Vec<&str> = regions.roots().map(|n| n.region().id()).collect();
        assert_eq!(roots, vec!["b0", "t1", "r1"]);

        let text = regions.node(regions.lookup_by_id("r1").unwrap().key()).unwrap();
        assert_eq!(text.child_count(), 1);
        let line = regions.children(text).next().unwrap();
        assert_eq!(line.region().id(), "r1_l1");
    }

    #[test]
    fn test_depths_follow_nesting() {
        let regions = render(&layout());
        let depth = |id: &str| regions.lookup_by_id(id).unwrap().depth();
        assert_eq!(depth("r1"), 2);
        assert_eq!(depth("r1_l1"), 3);
        assert_eq!(depth("r1_l1_w1"), 4);
    }

    #[test]
    fn test_breadcrumbs() {
        let regions = render(&layout());
        let word = regions.lookup_by_id("r1_l1_w1").unwrap();
        let trail: Vec<&str> = regions.breadcrumbs(word.key()).iter().map(|r| r.id()).collect();
        assert_eq!(trail, vec!["r1_l1", "r1"]);

        let names: Vec<&str> = word.breadcrumbs().iter().map(|a| a.descriptor.as_str()).collect();
        assert_eq!(
            names,
            vec!["Word#r1_l1_w1", "TextLine#r1_l1", "TextRegion#r1", "Page#scan_0042.tif"]
        );
    }
}

mod identity {
    use super::*;

    #[test]
    fn test_lookup_round_trip() {
        let regions = render(&layout());
        for region in regions.iter() {
            assert_eq!(regions.lookup_by_id(region.id()), Some(region));
        }
        assert!(regions.lookup_by_id("missing").is_none());
    }

    #[test]
    fn test_refetch_across_renders() {
        let doc = layout();
        let first = render(&doc);
        let second = render(&doc);
        let line = first.find_region(200.0, 50.0).unwrap();
        let again = second.refetch(line).unwrap();
        assert_eq!(again.id(), "r1_l1");
        assert_eq!(again.polygon(), line.polygon());
    }

    #[test]
    fn test_tooltip() {
        let mut doc = layout();
        let text = doc.segments().find(|s| s.id() == Some("r1")).unwrap().key();
        doc.add(
            text,
            segview::SegmentBuilder::new(SegmentKind::TextLine, rect(30.0, 100.0, 370.0, 140.0))
                .with_id("r1_l2")
                .with_text("Chapter One", Some(0.93)),
        )
        .unwrap();
        let regions = render(&doc);
        let hit = regions.find_region(200.0, 120.0).unwrap();
        assert_eq!(hit.tooltip(), "TextLine#r1_l2\n\nChapter One");
    }
}
