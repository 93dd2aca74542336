//! The six concrete scenarios of §8, each a named integration test.

mod common;

use approx::assert_relative_eq;
use common::{OrderRecorder, TestBox};
use kd_accel::{build, traverse, BuildOptions, Ray};

#[test]
fn empty_tree_misses_every_ray() {
    let boxes: Vec<TestBox> = Vec::new();
    let tree = build(&boxes, &BuildOptions::default()).unwrap();
    assert!(tree.is_empty());

    let ray = Ray::new((0.0, 0.0, 0.0), (0.0, 0.0, 1.0));
    let mut visitor = OrderRecorder::default();
    assert!(!traverse(&tree, &ray, None, &mut visitor));
    assert!(visitor.visits.is_empty());
}

#[test]
fn single_point_box_single_leaf_entry_distance_one() {
    let boxes = [TestBox::new((0.0, 0.0, 0.0), (1.0, 1.0, 1.0))];
    let tree = build(&boxes, &BuildOptions::default()).unwrap();

    let ray = Ray::new((0.5, 0.5, -1.0), (0.0, 0.0, 1.0));
    let hit = tree.bounds().ray_entry_exit(&ray).expect("ray must hit the root box");
    assert_relative_eq!(hit.entry, 1.0);

    let mut visitor = OrderRecorder::default();
    assert!(!traverse(&tree, &ray, None, &mut visitor), "no visitor in this test ever tightens the stop distance");
    assert_eq!(visitor.visits.len(), 1);
    assert_eq!(visitor.visits[0], vec![0]);
}

/// Two clusters of boxes, far enough apart that splitting them into separate subtrees clearly
/// lowers expected traversal cost by more than the minimum-improvement gate requires (a single
/// pair of disjoint boxes at this scale sits right at that gate's threshold and may or may not
/// split, so each side gets two boxes to push the improvement well past it).
fn two_clusters() -> [TestBox; 4] {
    [
        TestBox::new((0.0, 0.0, 0.0), (0.4, 1.0, 1.0)),
        TestBox::new((0.5, 0.0, 0.0), (0.9, 1.0, 1.0)),
        TestBox::new((10.0, 0.0, 0.0), (10.4, 1.0, 1.0)),
        TestBox::new((10.5, 0.0, 0.0), (10.9, 1.0, 1.0)),
    ]
}

#[test]
fn two_disjoint_boxes_visited_in_order() {
    let boxes = two_clusters();
    let tree = build(&boxes, &BuildOptions::default()).unwrap();

    let ray = Ray::new((-1.0, 0.5, 0.5), (1.0, 0.0, 0.0));
    let mut visitor = OrderRecorder::default();
    traverse(&tree, &ray, None, &mut visitor);

    let visited: Vec<usize> = visitor.visits.into_iter().flatten().collect();
    assert_eq!(visited, vec![0, 1, 2, 3], "the near cluster must be fully visited before the far one");
}

#[test]
fn parallel_plane_delivers_every_overlapping_leaf() {
    // Three boxes straddling x=5 exactly; a ray running parallel to the split plane must still
    // reach every leaf whose box it overlaps, regardless of which side of the plane each leaf
    // ended up stored on.
    let boxes = [
        TestBox::new((4.0, -2.0, -1.0), (5.0, -1.0, 1.0)),
        TestBox::new((5.0, 0.0, -1.0), (6.0, 1.0, 1.0)),
        TestBox::new((4.0, 2.0, -1.0), (5.0, 3.0, 1.0)),
    ];
    let tree = build(&boxes, &BuildOptions::default()).unwrap();

    let ray = Ray::new((5.0, -3.0, 0.0), (0.0, 1.0, 0.0));
    let mut visitor = OrderRecorder::default();
    traverse(&tree, &ray, None, &mut visitor);

    let mut visited: Vec<usize> = visitor.visits.into_iter().flatten().collect();
    visited.sort_unstable();
    visited.dedup();
    assert_eq!(visited, vec![0, 1, 2], "every box the parallel ray overlaps must be delivered");
}

#[test]
fn early_termination_skips_second_leaf() {
    let boxes = two_clusters();
    let tree = build(&boxes, &BuildOptions::default()).unwrap();

    let ray = Ray::new((-1.0, 0.5, 0.5), (1.0, 0.0, 0.0));

    struct StopAfterFirst {
        visits: Vec<Vec<usize>>,
    }
    impl kd_accel::LeafVisitor for StopAfterFirst {
        fn visit_list(&mut self, object_ids: &[usize]) -> Option<kd_accel::Number> {
            self.visits.push(object_ids.to_vec());
            Some(1.2)
        }
    }

    let mut visitor = StopAfterFirst { visits: Vec::new() };
    assert!(traverse(&tree, &ray, None, &mut visitor));
    let visited: Vec<usize> = visitor.visits.into_iter().flatten().collect();
    assert_eq!(visited, vec![0, 1], "the far cluster's leaf must not be visited once newStop=1.2 rules it out");
}

#[test]
fn degenerate_flat_triangle_survives_build() {
    // A "triangle" approximated by its flat (z=0) bounding box; build must not silently drop it.
    let boxes = [TestBox::new((-1.0, -1.0, 0.0), (1.0, 1.0, 0.0))];
    let tree = build(&boxes, &BuildOptions::default()).unwrap();
    assert!(!tree.is_empty());

    let ray = Ray::new((0.0, 0.0, 5.0), (0.0, 0.0, -1.0));
    let mut visitor = OrderRecorder::default();
    traverse(&tree, &ray, None, &mut visitor);

    let visited: Vec<usize> = visitor.visits.into_iter().flatten().collect();
    assert_eq!(visited, vec![0], "the flat primitive must still be reachable by traversal");
}
