use crate::bounds::BoundingBox;
use crate::bsp::Node;
use crate::errors::HullError;
use crate::hull::Hull;
use crate::polygon::Polygon;

/// A solid represented as a list of closed, coplanar polygons, which can be
/// unioned, subtracted, or intersected with other solids. Polygons are not
/// constrained to triangles.
///
/// The boolean operations follow the classic BSP formulation; see
/// <https://github.com/evanw/csg.js> for a discussion of the algorithm.
/// They assume valid, closed input meshes and do not report errors.
#[derive(Debug, Clone)]
pub struct CSG<S: Clone> {
    pub polygons: Vec<Polygon<S>>,
}

impl<S: Clone + Send + Sync> CSG<S> {
    /// Create an empty CSG.
    pub fn new() -> Self {
        CSG {
            polygons: Vec::new(),
        }
    }

    /// Build a CSG from an existing polygon list.
    pub fn from_polygons(polygons: Vec<Polygon<S>>) -> Self {
        CSG { polygons }
    }

    /// Return the internal polygons.
    pub fn to_polygons(&self) -> &[Polygon<S>] {
        &self.polygons
    }

    /// The axis-aligned bounding box over all polygon vertices.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut b = BoundingBox::new();
        for p in &self.polygons {
            b.add_polygon(p);
        }
        b
    }

    /// CSG union: this ∪ other
    pub fn union(&self, other: &CSG<S>) -> CSG<S> {
        let mut a = Node::new(&self.polygons);
        let mut b = Node::new(&other.polygons);

        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(&b.all_polygons());

        CSG::from_polygons(a.all_polygons())
    }

    /// CSG subtract: this \ other
    pub fn subtract(&self, other: &CSG<S>) -> CSG<S> {
        let mut a = Node::new(&self.polygons);
        let mut b = Node::new(&other.polygons);

        a.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(&b.all_polygons());
        a.invert();

        CSG::from_polygons(a.all_polygons())
    }

    /// CSG intersect: this ∩ other
    pub fn intersect(&self, other: &CSG<S>) -> CSG<S> {
        let mut a = Node::new(&self.polygons);
        let mut b = Node::new(&other.polygons);

        a.invert();
        b.clip_to(&a);
        b.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        a.build(&b.all_polygons());
        a.invert();

        CSG::from_polygons(a.all_polygons())
    }

    /// Invert this CSG (flip inside vs. outside).
    pub fn inverse(&self) -> CSG<S> {
        let mut csg = self.clone();
        for p in &mut csg.polygons {
            p.flip();
        }
        csg
    }

    /// The convex hull over all polygon vertex positions, as a new CSG.
    pub fn convex_hull(&self) -> Result<CSG<S>, HullError> {
        let mut hull = Hull::new();
        hull.build_from_csg(std::slice::from_ref(self))?;
        Ok(hull.to_csg())
    }
}

impl<S: Clone + Send + Sync> Default for CSG<S> {
    fn default() -> Self {
        Self::new()
    }
}
