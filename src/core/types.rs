/// Numeric type used for all geometry and cost calculations.
pub type Number = f64;
pub type Vector3 = glamour::Vector3<Number>;
pub type Point3 = glamour::Point3<Number>;

/// One of the three coordinate axes a k-d tree node can split on.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index into a 3-element per-axis array (`0=X, 1=Y, 2=Z`), matching §4.2.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn of_point(self, p: Point3) -> Number {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
            Axis::Z => p.z,
        }
    }

    pub fn of_vector(self, v: Vector3) -> Number {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}
