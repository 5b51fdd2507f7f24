use crate::plane::Plane;
use crate::vertex::Vertex;

/// A polygon, defined by an ordered list of at least three coplanar vertices
/// and the plane through the first three of them.
/// - `S` is the generic metadata type, stored as `Option<S>`.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    pub vertices: Vec<Vertex>,
    pub plane: Plane,
    pub metadata: Option<S>,
}

impl<S: Clone + Send + Sync> Polygon<S> {
    /// Create a polygon from vertices, deriving the plane from the first
    /// three.
    pub fn new(vertices: Vec<Vertex>, metadata: Option<S>) -> Self {
        assert!(
            vertices.len() >= 3,
            "Polygon::new requires at least 3 vertices"
        );
        let plane = Plane::from_points(
            &vertices[0].pos,
            &vertices[1].pos,
            &vertices[2].pos,
        );
        Polygon {
            vertices,
            plane,
            metadata,
        }
    }

    /// Create a triangle that carries an existing plane rather than deriving
    /// one, used by triangulation so every triangle shares the parent plane.
    pub fn triangle(a: Vertex, b: Vertex, c: Vertex, plane: Plane, metadata: Option<S>) -> Self {
        Polygon {
            vertices: vec![a, b, c],
            plane,
            metadata,
        }
    }

    /// Reverses winding order, flips the vertex normals, and flips the plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for v in &mut self.vertices {
            v.flip();
        }
        self.plane.flip();
    }

    /// Fan-triangulate this polygon into triangles sharing its plane.
    ///
    /// The patterns are fixed per vertex count and match the convex fans the
    /// shape factories and the polygon splitter emit; no concavity handling.
    pub fn triangles(&self) -> Vec<Polygon<S>> {
        let mut out = Vec::new();
        triangulate(&self.vertices, &self.plane, &self.metadata, &mut out);
        out
    }

    /// Returns a reference to the metadata, if any.
    pub fn metadata(&self) -> Option<&S> {
        self.metadata.as_ref()
    }

    /// Sets the metadata to the given value.
    pub fn set_metadata(&mut self, data: S) {
        self.metadata = Some(data);
    }
}

fn triangulate<S: Clone + Send + Sync>(
    vertices: &[Vertex],
    plane: &Plane,
    metadata: &Option<S>,
    out: &mut Vec<Polygon<S>>,
) {
    let tri = |i: usize, j: usize, k: usize| {
        Polygon::triangle(
            vertices[i].clone(),
            vertices[j].clone(),
            vertices[k].clone(),
            plane.clone(),
            metadata.clone(),
        )
    };
    match vertices.len() {
        0..=2 => {}
        3 => out.push(tri(0, 1, 2)),
        4 => {
            out.push(tri(0, 1, 2));
            out.push(tri(0, 2, 3));
        }
        5 => {
            out.push(tri(0, 1, 2));
            out.push(tri(0, 2, 4));
            out.push(tri(2, 3, 4));
        }
        6 => {
            out.push(tri(0, 1, 2));
            out.push(tri(2, 3, 4));
            out.push(tri(5, 2, 4));
            out.push(tri(0, 2, 5));
        }
        n => {
            out.push(tri(0, 1, 2));
            triangulate(&vertices[2..], plane, metadata, out);
            out.push(tri(0, 2, n - 1));
        }
    }
}
