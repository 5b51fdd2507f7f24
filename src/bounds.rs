use crate::float_types::Real;
use crate::plane::Plane;
use crate::polygon::Polygon;
use crate::vertex::Vertex;
use nalgebra::{Point3, Vector3};

/// An axis-aligned bounding box that grows as points are added.
///
/// A freshly created box is empty (`min` at +infinity, `max` at -infinity);
/// after at least one `add_*` call the invariant `min <= max` holds
/// component-wise.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<Real>,
    pub max: Point3<Real>,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingBox {
    pub fn new() -> Self {
        BoundingBox {
            min: Point3::new(Real::INFINITY, Real::INFINITY, Real::INFINITY),
            max: Point3::new(Real::NEG_INFINITY, Real::NEG_INFINITY, Real::NEG_INFINITY),
        }
    }

    /// Grow the box to include the point `p`.
    pub fn add_point(&mut self, p: &Point3<Real>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Grow the box to include the vertex position.
    pub fn add_vertex(&mut self, v: &Vertex) {
        self.add_point(&v.pos);
    }

    /// Grow the box to include every vertex of the polygon.
    pub fn add_polygon<S: Clone>(&mut self, p: &Polygon<S>) {
        for v in &p.vertices {
            self.add_point(&v.pos);
        }
    }

    pub fn center(&self) -> Point3<Real> {
        self.min + (self.max - self.min) / 2.0
    }

    pub fn size(&self) -> Vector3<Real> {
        self.max - self.min
    }

    /// Strict containment: points on the boundary are not inside.
    pub fn contains(&self, p: &Point3<Real>) -> bool {
        p.x > self.min.x
            && p.x < self.max.x
            && p.y > self.min.y
            && p.y < self.max.y
            && p.z > self.min.z
            && p.z < self.max.z
    }

    /// The eight corner points of the box.
    pub fn corners(&self) -> [Point3<Real>; 8] {
        let size = self.size();
        [
            self.min,
            self.min + Vector3::new(size.x, 0.0, 0.0),
            self.min + Vector3::new(0.0, size.y, 0.0),
            self.min + Vector3::new(0.0, 0.0, size.z),
            self.max,
            self.max - Vector3::new(size.x, 0.0, 0.0),
            self.max - Vector3::new(0.0, size.y, 0.0),
            self.max - Vector3::new(0.0, 0.0, size.z),
        ]
    }

    /// Subdivide into a 2x2x2 set of octants, indexed `x*4 + y*2 + z`.
    pub fn subdivide(&self) -> [BoundingBox; 8] {
        let half = self.size() / 2.0;
        core::array::from_fn(|i| {
            let x = (i >> 2) & 1;
            let y = (i >> 1) & 1;
            let z = i & 1;
            let min = Point3::new(
                self.min.x + half.x * x as Real,
                self.min.y + half.y * y as Real,
                self.min.z + half.z * z as Real,
            );
            BoundingBox {
                min,
                max: min + half,
            }
        })
    }

    /// Classify the box against `plane` by OR-combining the classification
    /// of its eight corners: `COPLANAR`, `FRONT`, `BACK`, or `SPANNING`.
    pub fn relation_to_plane(&self, plane: &Plane) -> i8 {
        let mut box_type = 0i8;
        for corner in self.corners() {
            box_type |= plane.orient_point(&corner);
        }
        box_type
    }
}
