use kd_accel::{Aabb, Number, Point3, Primitive};

/// A box primitive for tests: its own AABB, clipped trivially against whatever box it's asked
/// to refine against (the real geometric clipping a triangle or sphere mesh would do isn't needed
/// to exercise the tree itself).
#[derive(Copy, Clone, Debug)]
pub struct TestBox {
    pub aabb: Aabb,
}

impl TestBox {
    pub fn new(min: (Number, Number, Number), max: (Number, Number, Number)) -> Self {
        Self { aabb: Aabb::new(Point3::new(min.0, min.1, min.2), Point3::new(max.0, max.1, max.2)) }
    }
}

impl Primitive for TestBox {
    fn aabb(&self) -> Aabb { self.aabb }

    fn clipped_aabb(&self, clip_box: &Aabb) -> Option<Aabb> { self.aabb.intersect(clip_box) }
}

/// Records every leaf's object ids it's handed, in the order visited, without ever tightening the
/// stop distance — useful for asserting traversal order without the test caring about distances.
#[derive(Default)]
pub struct OrderRecorder {
    pub visits: Vec<Vec<usize>>,
}

impl kd_accel::LeafVisitor for OrderRecorder {
    fn visit_list(&mut self, object_ids: &[usize]) -> Option<Number> {
        self.visits.push(object_ids.to_vec());
        None
    }
}

/// Treats each visited object as hit at its own box's entry distance along `ray`, tracking the
/// nearest one found so far and tightening the traversal's stop distance to match - a minimal
/// stand-in for a real nearest-hit search.
pub struct NearestHitAtEntry<'a> {
    ray: &'a kd_accel::Ray,
    boxes: &'a [TestBox],
    pub nearest: Option<(usize, Number)>,
}

impl<'a> NearestHitAtEntry<'a> {
    pub fn new(ray: &'a kd_accel::Ray, boxes: &'a [TestBox]) -> Self { Self { ray, boxes, nearest: None } }
}

impl<'a> kd_accel::LeafVisitor for NearestHitAtEntry<'a> {
    fn visit_list(&mut self, object_ids: &[usize]) -> Option<Number> {
        for &id in object_ids {
            let Some(hit) = self.boxes[id].aabb.ray_entry_exit(self.ray) else { continue };
            let entry = hit.entry.max(0.0);
            let better = match self.nearest {
                None => true,
                Some((_, best)) => entry < best,
            };
            if better {
                self.nearest = Some((id, entry));
            }
        }
        self.nearest.map(|(_, d)| d)
    }
}
