//! Arena-backed half-edge mesh used by the hull builder.
//!
//! Vertices, half-edges, and faces live in plain `Vec` stores and refer to
//! each other through index newtypes, so the cyclic links of a half-edge
//! structure need no pointer graph. Deleted faces keep their slot and are
//! only dropped from the hull's face list when it compacts.

use crate::float_types::Real;
use crate::plane::Plane;
use nalgebra::{Point3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VertexId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HalfEdgeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FaceId(pub(crate) usize);

/// A candidate hull vertex: an input point plus its links into whichever
/// intrusive list (claimed/unclaimed) currently owns it.
#[derive(Debug, Clone)]
pub(crate) struct HullVertex {
    pub(crate) point: Point3<Real>,
    /// Input point index during construction; reused as the final
    /// contiguous index (-1 = off hull) by the reindex pass.
    pub(crate) index: i32,
    pub(crate) prev: Option<VertexId>,
    pub(crate) next: Option<VertexId>,
    /// The face whose outside set this vertex belongs to, if claimed.
    pub(crate) face: Option<FaceId>,
}

/// A directed edge of one face. `vertex` is the head; the tail is the head
/// of `prev`. For any edge `e`: `e.next.prev == e`, `e.prev.next == e`, and
/// when linked, `e.opposite.opposite == e` with a different face.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HalfEdge {
    pub(crate) vertex: VertexId,
    pub(crate) face: FaceId,
    pub(crate) next: HalfEdgeId,
    pub(crate) prev: HalfEdgeId,
    pub(crate) opposite: Option<HalfEdgeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FaceMark {
    Visible,
    NonConvex,
    Deleted,
}

#[derive(Debug, Clone)]
pub(crate) struct Face {
    pub(crate) plane: Plane,
    pub(crate) edge: HalfEdgeId,
    pub(crate) area: Real,
    pub(crate) num_verts: usize,
    pub(crate) centroid: Point3<Real>,
    pub(crate) mark: FaceMark,
    /// Head of this face's outside-point chain inside the claimed list.
    pub(crate) outside: Option<VertexId>,
    /// Link used by `FaceList`.
    pub(crate) next: Option<FaceId>,
}

/// The three arenas. All topology surgery lives here; the hull driver only
/// decides what to merge and when.
#[derive(Debug, Default)]
pub(crate) struct Mesh {
    pub(crate) verts: Vec<HullVertex>,
    pub(crate) edges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
}

impl Mesh {
    pub(crate) fn clear(&mut self) {
        self.verts.clear();
        self.edges.clear();
        self.faces.clear();
    }

    pub(crate) fn add_vertex(&mut self, point: Point3<Real>, index: i32) -> VertexId {
        let id = VertexId(self.verts.len());
        self.verts.push(HullVertex {
            point,
            index,
            prev: None,
            next: None,
            face: None,
        });
        id
    }

    /// Create a triangular face over three vertices, wiring its half-edge
    /// ring. Opposite links are left for the caller.
    pub(crate) fn new_triangle(&mut self, v0: VertexId, v1: VertexId, v2: VertexId) -> FaceId {
        let f = FaceId(self.faces.len());
        let e0 = HalfEdgeId(self.edges.len());
        let e1 = HalfEdgeId(self.edges.len() + 1);
        let e2 = HalfEdgeId(self.edges.len() + 2);
        self.edges.push(HalfEdge {
            vertex: v0,
            face: f,
            next: e1,
            prev: e2,
            opposite: None,
        });
        self.edges.push(HalfEdge {
            vertex: v1,
            face: f,
            next: e2,
            prev: e0,
            opposite: None,
        });
        self.edges.push(HalfEdge {
            vertex: v2,
            face: f,
            next: e0,
            prev: e1,
            opposite: None,
        });

        let plane = Plane::from_points(
            &self.verts[v0.0].point,
            &self.verts[v1.0].point,
            &self.verts[v2.0].point,
        );
        self.faces.push(Face {
            plane,
            edge: e0,
            area: 0.0,
            num_verts: 3,
            centroid: Point3::origin(),
            mark: FaceMark::Visible,
            outside: None,
            next: None,
        });
        self.update_face(f);
        f
    }

    /// The i'th edge of a face, counted from `face.edge` (negative walks
    /// backwards).
    pub(crate) fn get_edge(&self, f: FaceId, mut i: isize) -> HalfEdgeId {
        let mut he = self.faces[f.0].edge;
        while i > 0 {
            he = self.edges[he.0].next;
            i -= 1;
        }
        while i < 0 {
            he = self.edges[he.0].prev;
            i += 1;
        }
        he
    }

    pub(crate) fn set_opposite(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        self.edges[a.0].opposite = Some(b);
        self.edges[b.0].opposite = Some(a);
    }

    pub(crate) fn head(&self, e: HalfEdgeId) -> VertexId {
        self.edges[e.0].vertex
    }

    pub(crate) fn tail(&self, e: HalfEdgeId) -> VertexId {
        self.edges[self.edges[e.0].prev.0].vertex
    }

    pub(crate) fn opposite_face(&self, e: HalfEdgeId) -> Option<FaceId> {
        self.edges[e.0].opposite.map(|o| self.edges[o.0].face)
    }

    pub(crate) fn distance_to_plane(&self, f: FaceId, p: &Point3<Real>) -> Real {
        self.faces[f.0].plane.signed_distance(p)
    }

    /// Vertex ids around a face, in `next` order starting at `face.edge`.
    pub(crate) fn face_vertices(&self, f: FaceId) -> Vec<VertexId> {
        let start = self.faces[f.0].edge;
        let mut out = Vec::new();
        let mut he = start;
        loop {
            out.push(self.edges[he.0].vertex);
            he = self.edges[he.0].next;
            if he == start {
                break;
            }
        }
        out
    }

    /// Recompute the vertex count, centroid, and triangle-fan area after a
    /// structural change. The plane is fixed at face creation and is never
    /// recomputed.
    pub(crate) fn update_face(&mut self, f: FaceId) {
        let start = self.faces[f.0].edge;
        let mut points = Vec::new();
        let mut he = start;
        loop {
            points.push(self.verts[self.edges[he.0].vertex.0].point);
            he = self.edges[he.0].next;
            if he == start {
                break;
            }
        }
        let n = points.len();

        let mut centroid = Vector3::zeros();
        for p in &points {
            centroid += p.coords;
        }

        let mut area_vec = Vector3::zeros();
        for i in 1..n.saturating_sub(1) {
            area_vec += (points[i] - points[0]).cross(&(points[i + 1] - points[0]));
        }

        let face = &mut self.faces[f.0];
        face.num_verts = n;
        face.centroid = Point3::from(centroid / n as Real);
        face.area = area_vec.norm() / 2.0;
    }

    /// Merge the face across `hedge_adj` into `f`, splicing out the run of
    /// shared edges. Faces that disappear (the absorbed face, plus any
    /// triangle collapsed by redundant-edge elimination) are marked
    /// `Deleted` and pushed onto `discarded`.
    pub(crate) fn merge_adjacent_face(
        &mut self,
        f: FaceId,
        hedge_adj: HalfEdgeId,
        discarded: &mut Vec<FaceId>,
    ) {
        let opp_face = self.opposite_face(hedge_adj).unwrap();
        discarded.push(opp_face);
        self.faces[opp_face.0].mark = FaceMark::Deleted;

        let hedge_opp = self.edges[hedge_adj.0].opposite.unwrap();

        let mut hedge_adj_prev = self.edges[hedge_adj.0].prev;
        let mut hedge_adj_next = self.edges[hedge_adj.0].next;
        let mut hedge_opp_prev = self.edges[hedge_opp.0].prev;
        let mut hedge_opp_next = self.edges[hedge_opp.0].next;

        // Walk back over any additional edges the two faces already share.
        while self.opposite_face(hedge_adj_prev) == Some(opp_face) {
            hedge_adj_prev = self.edges[hedge_adj_prev.0].prev;
            hedge_opp_next = self.edges[hedge_opp_next.0].next;
        }
        while self.opposite_face(hedge_adj_next) == Some(opp_face) {
            hedge_opp_prev = self.edges[hedge_opp_prev.0].prev;
            hedge_adj_next = self.edges[hedge_adj_next.0].next;
        }

        // The absorbed face's surviving edges now belong to f.
        let stop = self.edges[hedge_opp_prev.0].next;
        let mut hedge = hedge_opp_next;
        while hedge != stop {
            self.edges[hedge.0].face = f;
            hedge = self.edges[hedge.0].next;
        }

        if hedge_adj == self.faces[f.0].edge {
            self.faces[f.0].edge = hedge_adj_next;
        }

        // Stitch the boundary at the head and the tail of the merged run.
        if let Some(df) = self.connect_half_edges(f, hedge_opp_prev, hedge_adj_next) {
            discarded.push(df);
        }
        if let Some(df) = self.connect_half_edges(f, hedge_adj_prev, hedge_opp_next) {
            discarded.push(df);
        }

        self.update_face(f);
    }

    /// Join `hedge_prev -> hedge` on face `f`. When both see the same
    /// opposite face the pair is redundant and is removed; removing it from
    /// an opposite triangle deletes that triangle outright, which is
    /// returned to the caller.
    fn connect_half_edges(
        &mut self,
        f: FaceId,
        hedge_prev: HalfEdgeId,
        hedge: HalfEdgeId,
    ) -> Option<FaceId> {
        let mut discarded_face = None;

        if self.opposite_face(hedge_prev) == self.opposite_face(hedge) {
            let opp_face = self.opposite_face(hedge).unwrap();
            let hedge_opp;

            if hedge_prev == self.faces[f.0].edge {
                self.faces[f.0].edge = hedge;
            }
            if self.faces[opp_face.0].num_verts == 3 {
                // The opposite face degenerates; drop it altogether.
                let prev_of_opp = self.edges[self.edges[hedge.0].opposite.unwrap().0].prev;
                hedge_opp = self.edges[prev_of_opp.0].opposite.unwrap();

                self.faces[opp_face.0].mark = FaceMark::Deleted;
                discarded_face = Some(opp_face);
            } else {
                hedge_opp = self.edges[self.edges[hedge.0].opposite.unwrap().0].next;

                if self.faces[opp_face.0].edge == self.edges[hedge_opp.0].prev {
                    self.faces[opp_face.0].edge = hedge_opp;
                }
                let new_prev = self.edges[self.edges[hedge_opp.0].prev.0].prev;
                self.edges[hedge_opp.0].prev = new_prev;
                self.edges[new_prev.0].next = hedge_opp;
            }

            let new_prev = self.edges[hedge_prev.0].prev;
            self.edges[hedge.0].prev = new_prev;
            self.edges[new_prev.0].next = hedge;

            self.set_opposite(hedge, hedge_opp);

            // The opposite face changed shape; refresh its cached data.
            self.update_face(opp_face);
        } else {
            self.edges[hedge_prev.0].next = hedge;
            self.edges[hedge.0].prev = hedge_prev;
        }

        discarded_face
    }
}

/// Doubly-linked intrusive list threaded through the vertex arena. A vertex
/// is a member of at most one list at a time; every move is delete-then-add.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct VertexList {
    head: Option<VertexId>,
    tail: Option<VertexId>,
}

impl VertexList {
    pub(crate) fn clear(&mut self) {
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn first(&self) -> Option<VertexId> {
        self.head
    }

    pub(crate) fn add(&mut self, verts: &mut [HullVertex], vtx: VertexId) {
        match self.tail {
            None => self.head = Some(vtx),
            Some(tail) => verts[tail.0].next = Some(vtx),
        }
        verts[vtx.0].prev = self.tail;
        verts[vtx.0].next = None;
        self.tail = Some(vtx);
    }

    /// Append a pre-linked chain starting at `vtx` (its links are kept).
    pub(crate) fn add_all(&mut self, verts: &mut [HullVertex], vtx: VertexId) {
        match self.tail {
            None => self.head = Some(vtx),
            Some(tail) => verts[tail.0].next = Some(vtx),
        }
        verts[vtx.0].prev = self.tail;
        let mut end = vtx;
        while let Some(n) = verts[end.0].next {
            end = n;
        }
        self.tail = Some(end);
    }

    pub(crate) fn delete(&mut self, verts: &mut [HullVertex], vtx: VertexId) {
        let prev = verts[vtx.0].prev;
        let next = verts[vtx.0].next;
        match prev {
            None => self.head = next,
            Some(p) => verts[p.0].next = next,
        }
        match next {
            None => self.tail = prev,
            Some(n) => verts[n.0].prev = prev,
        }
    }

    /// Unlink the inclusive chain `vtx1..=vtx2` in O(1).
    pub(crate) fn delete_chain(&mut self, verts: &mut [HullVertex], vtx1: VertexId, vtx2: VertexId) {
        let prev = verts[vtx1.0].prev;
        let next = verts[vtx2.0].next;
        match prev {
            None => self.head = next,
            Some(p) => verts[p.0].next = next,
        }
        match next {
            None => self.tail = prev,
            Some(n) => verts[n.0].prev = prev,
        }
    }

    pub(crate) fn insert_before(&mut self, verts: &mut [HullVertex], vtx: VertexId, next: VertexId) {
        let prev = verts[next.0].prev;
        verts[vtx.0].prev = prev;
        match prev {
            None => self.head = Some(vtx),
            Some(p) => verts[p.0].next = Some(vtx),
        }
        verts[vtx.0].next = Some(next);
        verts[next.0].prev = Some(vtx);
    }
}

/// Singly-linked intrusive list threaded through the face arena, used for
/// the batch of faces created around one horizon.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FaceList {
    head: Option<FaceId>,
    tail: Option<FaceId>,
}

impl FaceList {
    pub(crate) fn clear(&mut self) {
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn first(&self) -> Option<FaceId> {
        self.head
    }

    pub(crate) fn add(&mut self, faces: &mut [Face], face: FaceId) {
        match self.tail {
            None => self.head = Some(face),
            Some(tail) => faces[tail.0].next = Some(face),
        }
        faces[face.0].next = None;
        self.tail = Some(face);
    }
}
