use crate::csg::CSG;
use crate::errors::HullError;
use crate::float_types::Real;
use crate::half_edge::{FaceId, FaceList, FaceMark, HalfEdgeId, Mesh, VertexId, VertexList};
use crate::polygon::Polygon;
use crate::vertex::Vertex;
use log::{debug, trace};
use nalgebra::Point3;

/// Sentinel tolerance requesting the automatic, extent-based tolerance.
pub const AUTOMATIC_TOLERANCE: Real = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeKind {
    /// First pass: merge when the larger face sees the smaller one's
    /// centroid at or above its plane.
    NonConvexWrtLargerFace,
    /// Second pass: merge when either face sees the other's centroid at or
    /// above its plane.
    NonConvex,
}

/// Incremental 3D convex hull over a point set.
///
/// Construction follows QuickHull: an initial tetrahedron from the axis
/// extremes, then repeated expansion toward the furthest outside point,
/// attaching a fan of faces around the horizon and merging away non-convex
/// seams. Once built, [`Hull::vertices`] and [`Hull::faces`] expose the
/// result, and [`Hull::to_csg`] wraps it as a polygon mesh.
#[derive(Debug, Default)]
pub struct Hull {
    mesh: Mesh,
    /// Faces in creation order; compacted to the surviving set at the end.
    faces: Vec<FaceId>,
    horizon: Vec<HalfEdgeId>,
    claimed: VertexList,
    unclaimed: VertexList,
    new_faces: FaceList,
    vertex_point_indices: Vec<usize>,
    max_vertex: [Option<VertexId>; 3],
    min_vertex: [Option<VertexId>; 3],
    num_faces: usize,
    num_points: usize,
    num_vertices: usize,
    explicit_tolerance: Real,
    tolerance: Real,
}

impl Hull {
    pub fn new() -> Self {
        Hull::default()
    }

    /// A hull that classifies points with the given tolerance instead of the
    /// automatic one derived from the point cloud extents.
    pub fn with_tolerance(tolerance: Real) -> Self {
        Hull {
            explicit_tolerance: tolerance,
            ..Hull::default()
        }
    }

    /// The tolerance used by the last build.
    pub fn tolerance(&self) -> Real {
        self.tolerance
    }

    /// Build the hull of the first `num_points` entries of `points`.
    ///
    /// No partial hull survives an error.
    pub fn build(&mut self, points: &[Point3<Real>], num_points: usize) -> Result<(), HullError> {
        if num_points < 4 {
            return Err(HullError::TooFewPoints);
        }
        if points.len() < num_points {
            return Err(HullError::UndersizedBuffer);
        }

        self.init_buffers(num_points);
        for (i, p) in points.iter().take(num_points).enumerate() {
            self.mesh.add_vertex(*p, i as i32);
        }
        self.build_hull()
    }

    /// Build the hull over every polygon vertex position of the given
    /// meshes.
    pub fn build_from_csg<S: Clone + Send + Sync>(
        &mut self,
        csgs: &[CSG<S>],
    ) -> Result<(), HullError> {
        let mut points = Vec::new();
        for c in csgs {
            for p in c.to_polygons() {
                for v in &p.vertices {
                    points.push(v.pos);
                }
            }
        }
        let n = points.len();
        self.build(&points, n)
    }

    /// The hull vertices: a duplicate-free subset of the input points,
    /// indexed contiguously from zero.
    pub fn vertices(&self) -> Vec<Point3<Real>> {
        (0..self.num_vertices)
            .map(|i| self.mesh.verts[self.vertex_point_indices[i]].point)
            .collect()
    }

    /// The hull faces as counter-clockwise rings of vertex indices into
    /// [`Hull::vertices`].
    pub fn faces(&self) -> Vec<Vec<usize>> {
        self.faces
            .iter()
            .map(|&f| {
                self.mesh
                    .face_vertices(f)
                    .into_iter()
                    .map(|v| self.mesh.verts[v.0].index as usize)
                    .collect()
            })
            .collect()
    }

    /// Wrap the hull as a polygon mesh, with every vertex carrying its
    /// face's outward normal.
    pub fn to_csg<S: Clone + Send + Sync>(&self) -> CSG<S> {
        let polygons = self
            .faces
            .iter()
            .map(|&f| {
                let normal = self.mesh.faces[f.0].plane.normal;
                let vertices = self
                    .mesh
                    .face_vertices(f)
                    .into_iter()
                    .map(|v| Vertex::new(self.mesh.verts[v.0].point, normal))
                    .collect();
                Polygon::new(vertices, None)
            })
            .collect();
        CSG::from_polygons(polygons)
    }

    fn init_buffers(&mut self, nump: usize) {
        self.mesh.clear();
        self.faces.clear();
        self.horizon.clear();
        self.claimed.clear();
        self.unclaimed.clear();
        self.new_faces.clear();
        self.vertex_point_indices = vec![0; nump];
        self.max_vertex = [None; 3];
        self.min_vertex = [None; 3];
        self.num_faces = 0;
        self.num_points = nump;
        self.num_vertices = 0;
    }

    fn build_hull(&mut self) -> Result<(), HullError> {
        self.compute_min_and_max();
        self.create_initial_simplex()?;

        let mut cnt = 0usize;
        while let Some(eye) = self.next_point_to_add() {
            self.add_point_to_hull(eye);
            cnt += 1;
            trace!("iteration {cnt} done");
        }
        self.reindex_faces_and_vertices();
        debug!(
            "hull done: {} faces over {} vertices",
            self.num_faces, self.num_vertices
        );
        Ok(())
    }

    fn compute_min_and_max(&mut self) {
        let mut max = self.mesh.verts[0].point;
        let mut min = max;
        for i in 0..3 {
            self.max_vertex[i] = Some(VertexId(0));
            self.min_vertex[i] = Some(VertexId(0));
        }

        for i in 0..self.num_points {
            let pnt = self.mesh.verts[i].point;
            if pnt.x > max.x {
                max.x = pnt.x;
                self.max_vertex[0] = Some(VertexId(i));
            } else if pnt.x < min.x {
                min.x = pnt.x;
                self.min_vertex[0] = Some(VertexId(i));
            }
            if pnt.y > max.y {
                max.y = pnt.y;
                self.max_vertex[1] = Some(VertexId(i));
            } else if pnt.y < min.y {
                min.y = pnt.y;
                self.min_vertex[1] = Some(VertexId(i));
            }
            if pnt.z > max.z {
                max.z = pnt.z;
                self.max_vertex[2] = Some(VertexId(i));
            } else if pnt.z < min.z {
                min.z = pnt.z;
                self.min_vertex[2] = Some(VertexId(i));
            }
        }

        self.tolerance = if self.explicit_tolerance == AUTOMATIC_TOLERANCE {
            3.0 * Real::EPSILON
                * (max.x.abs().max(min.x.abs())
                    + max.y.abs().max(min.y.abs())
                    + max.z.abs().max(min.z.abs()))
        } else {
            self.explicit_tolerance
        };
        debug!("extents {min:?}..{max:?}, tolerance {}", self.tolerance);
    }

    fn create_initial_simplex(&mut self) -> Result<(), HullError> {
        // Widest axis picks the first two simplex vertices.
        let mut max_range = 0.0;
        let mut imax = 0usize;
        for i in 0..3 {
            let hi = self.mesh.verts[self.max_vertex[i].unwrap().0].point[i];
            let lo = self.mesh.verts[self.min_vertex[i].unwrap().0].point[i];
            let diff = hi - lo;
            if diff > max_range {
                max_range = diff;
                imax = i;
            }
        }
        if max_range <= self.tolerance {
            return Err(HullError::Coincident);
        }

        let mut vtx = [VertexId(0); 4];
        vtx[0] = self.max_vertex[imax].unwrap();
        vtx[1] = self.min_vertex[imax].unwrap();

        // v2: furthest from the line v0-v1.
        let u01 = (self.mesh.verts[vtx[1].0].point - self.mesh.verts[vtx[0].0].point).normalize();
        let mut normal = nalgebra::Vector3::zeros();
        let mut max_sqr = 0.0;
        for i in 0..self.num_points {
            let id = VertexId(i);
            let diff = self.mesh.verts[i].point - self.mesh.verts[vtx[0].0].point;
            let xprod = u01.cross(&diff);
            let len_sqr = xprod.norm_squared();
            if len_sqr > max_sqr && id != vtx[0] && id != vtx[1] {
                max_sqr = len_sqr;
                vtx[2] = id;
                normal = xprod;
            }
        }
        if max_sqr.sqrt() < 100.0 * self.tolerance {
            return Err(HullError::Colinear);
        }
        let normal = normal.normalize();

        // v3: furthest from the plane through v0, v1, v2.
        let d0 = self.mesh.verts[vtx[2].0].point.coords.dot(&normal);
        let mut max_dist = 0.0;
        for i in 0..self.num_points {
            let id = VertexId(i);
            let dist = (self.mesh.verts[i].point.coords.dot(&normal) - d0).abs();
            if dist > max_dist && id != vtx[0] && id != vtx[1] && id != vtx[2] {
                max_dist = dist;
                vtx[3] = id;
            }
        }
        if max_dist.sqrt() < 100.0 * self.tolerance {
            return Err(HullError::Coplanar);
        }

        debug!(
            "initial simplex: {:?}",
            [vtx[0].0, vtx[1].0, vtx[2].0, vtx[3].0]
        );

        // Orient the tetrahedron outward and pair up the opposite edges.
        let mut tris = [FaceId(0); 4];
        if self.mesh.verts[vtx[3].0].point.coords.dot(&normal) - d0 < 0.0 {
            tris[0] = self.mesh.new_triangle(vtx[0], vtx[1], vtx[2]);
            tris[1] = self.mesh.new_triangle(vtx[3], vtx[1], vtx[0]);
            tris[2] = self.mesh.new_triangle(vtx[3], vtx[2], vtx[1]);
            tris[3] = self.mesh.new_triangle(vtx[3], vtx[0], vtx[2]);

            for i in 0..3 {
                let k = (i + 1) % 3;
                let a = self.mesh.get_edge(tris[i + 1], 1);
                let b = self.mesh.get_edge(tris[k + 1], 0);
                self.mesh.set_opposite(a, b);
                let a = self.mesh.get_edge(tris[i + 1], 2);
                let b = self.mesh.get_edge(tris[0], k as isize);
                self.mesh.set_opposite(a, b);
            }
        } else {
            tris[0] = self.mesh.new_triangle(vtx[0], vtx[2], vtx[1]);
            tris[1] = self.mesh.new_triangle(vtx[3], vtx[0], vtx[1]);
            tris[2] = self.mesh.new_triangle(vtx[3], vtx[1], vtx[2]);
            tris[3] = self.mesh.new_triangle(vtx[3], vtx[2], vtx[0]);

            for i in 0..3 {
                let k = (i + 1) % 3;
                let a = self.mesh.get_edge(tris[i + 1], 0);
                let b = self.mesh.get_edge(tris[k + 1], 1);
                self.mesh.set_opposite(a, b);
                let a = self.mesh.get_edge(tris[i + 1], 2);
                let b = self.mesh.get_edge(tris[0], ((3 - i) % 3) as isize);
                self.mesh.set_opposite(a, b);
            }
        }
        self.faces.extend_from_slice(&tris);

        // Claim every remaining point for the face it is furthest above.
        for i in 0..self.num_points {
            let id = VertexId(i);
            if vtx.contains(&id) {
                continue;
            }
            let mut max_dist = self.tolerance;
            let mut max_face = None;
            for &t in &tris {
                let dist = self.mesh.distance_to_plane(t, &self.mesh.verts[i].point);
                if dist > max_dist {
                    max_face = Some(t);
                    max_dist = dist;
                }
            }
            if let Some(face) = max_face {
                self.add_point_to_face(id, face);
            }
        }

        Ok(())
    }

    fn add_point_to_face(&mut self, vtx: VertexId, face: FaceId) {
        self.mesh.verts[vtx.0].face = Some(face);
        let outside = self.mesh.faces[face.0].outside;
        match outside {
            None => self.claimed.add(&mut self.mesh.verts, vtx),
            Some(outside) => self.claimed.insert_before(&mut self.mesh.verts, vtx, outside),
        }
        self.mesh.faces[face.0].outside = Some(vtx);
    }

    fn remove_point_from_face(&mut self, vtx: VertexId, face: FaceId) {
        if Some(vtx) == self.mesh.faces[face.0].outside {
            let next = self.mesh.verts[vtx.0].next;
            let new_outside = match next {
                Some(n) if self.mesh.verts[n.0].face == Some(face) => next,
                _ => None,
            };
            self.mesh.faces[face.0].outside = new_outside;
        }
        self.claimed.delete(&mut self.mesh.verts, vtx);
    }

    /// Detach a face's entire outside chain from the claimed list and return
    /// its head.
    fn remove_all_points_from_face(&mut self, face: FaceId) -> Option<VertexId> {
        let outside = self.mesh.faces[face.0].outside?;
        let mut end = outside;
        while let Some(n) = self.mesh.verts[end.0].next {
            if self.mesh.verts[n.0].face != Some(face) {
                break;
            }
            end = n;
        }
        self.claimed.delete_chain(&mut self.mesh.verts, outside, end);
        self.mesh.verts[end.0].next = None;
        Some(outside)
    }

    /// Release a doomed face's outside points, re-claiming them for
    /// `absorbing` when they are still above it, otherwise parking them on
    /// the unclaimed list.
    fn delete_face_points(&mut self, face: FaceId, absorbing: Option<FaceId>) {
        let Some(head) = self.remove_all_points_from_face(face) else {
            return;
        };
        match absorbing {
            None => self.unclaimed.add_all(&mut self.mesh.verts, head),
            Some(absorbing) => {
                let mut next = Some(head);
                while let Some(vtx) = next {
                    next = self.mesh.verts[vtx.0].next;
                    let dist = self
                        .mesh
                        .distance_to_plane(absorbing, &self.mesh.verts[vtx.0].point);
                    if dist > self.tolerance {
                        self.add_point_to_face(vtx, absorbing);
                    } else {
                        self.unclaimed.add(&mut self.mesh.verts, vtx);
                    }
                }
            }
        }
    }

    /// The furthest outside point of the first claimed face, or `None` when
    /// the hull is complete.
    fn next_point_to_add(&mut self) -> Option<VertexId> {
        let first = self.claimed.first()?;
        let eye_face = self.mesh.verts[first.0].face.unwrap();
        let mut eye = None;
        let mut max_dist = 0.0;
        let mut cur = self.mesh.faces[eye_face.0].outside;
        while let Some(vtx) = cur {
            if self.mesh.verts[vtx.0].face != Some(eye_face) {
                break;
            }
            let dist = self
                .mesh
                .distance_to_plane(eye_face, &self.mesh.verts[vtx.0].point);
            if dist > max_dist {
                max_dist = dist;
                eye = Some(vtx);
            }
            cur = self.mesh.verts[vtx.0].next;
        }
        eye
    }

    /// Flood outward from the eye point's face, deleting every face visible
    /// from the eye and recording the closed loop of boundary edges.
    fn calculate_horizon(
        &mut self,
        eye_pnt: Point3<Real>,
        edge0: Option<HalfEdgeId>,
        face: FaceId,
    ) {
        self.delete_face_points(face, None);
        self.mesh.faces[face.0].mark = FaceMark::Deleted;
        trace!("visiting face {:?}", face.0);

        let (start, mut edge) = match edge0 {
            None => {
                let e = self.mesh.faces[face.0].edge;
                (e, e)
            }
            Some(e0) => (e0, self.mesh.edges[e0.0].next),
        };
        loop {
            let opp_face = self.mesh.opposite_face(edge).unwrap();
            if self.mesh.faces[opp_face.0].mark == FaceMark::Visible {
                if self.mesh.distance_to_plane(opp_face, &eye_pnt) > self.tolerance {
                    let opp_edge = self.mesh.edges[edge.0].opposite.unwrap();
                    self.calculate_horizon(eye_pnt, Some(opp_edge), opp_face);
                } else {
                    self.horizon.push(edge);
                    trace!("adding horizon edge {:?}", edge.0);
                }
            }
            edge = self.mesh.edges[edge.0].next;
            if edge == start {
                break;
            }
        }
    }

    /// A new triangle (eye, tail, head) over a horizon edge, linked opposite
    /// to the surviving face across the horizon. Returns its eye-side edge.
    fn add_adjoining_face(&mut self, eye: VertexId, he: HalfEdgeId) -> HalfEdgeId {
        let face = self
            .mesh
            .new_triangle(eye, self.mesh.tail(he), self.mesh.head(he));
        self.faces.push(face);

        let horizon_opp = self.mesh.edges[he.0].opposite.unwrap();
        let base = self.mesh.get_edge(face, -1);
        self.mesh.set_opposite(base, horizon_opp);
        self.mesh.get_edge(face, 0)
    }

    /// Attach a fan of new faces from the eye vertex over every horizon
    /// edge, chaining adjacent side edges as opposites and closing the loop.
    fn add_new_faces(&mut self, eye: VertexId) {
        self.new_faces.clear();

        let mut side_prev: Option<HalfEdgeId> = None;
        let mut side_begin: Option<HalfEdgeId> = None;

        for i in 0..self.horizon.len() {
            let horizon_he = self.horizon[i];
            let side = self.add_adjoining_face(eye, horizon_he);
            trace!("new face over horizon edge {:?}", horizon_he.0);

            if let Some(prev) = side_prev {
                let next = self.mesh.edges[side.0].next;
                self.mesh.set_opposite(next, prev);
            } else {
                side_begin = Some(side);
            }
            let face = self.mesh.edges[side.0].face;
            self.new_faces.add(&mut self.mesh.faces, face);
            side_prev = Some(side);
        }
        // Close the fan between the first and last new faces.
        if let (Some(begin), Some(prev)) = (side_begin, side_prev) {
            let next = self.mesh.edges[begin.0].next;
            self.mesh.set_opposite(next, prev);
        }
    }

    fn opp_face_distance(&self, he: HalfEdgeId) -> Real {
        let edge = &self.mesh.edges[he.0];
        let opp = edge.opposite.unwrap();
        let opp_face = self.mesh.edges[opp.0].face;
        let centroid = self.mesh.faces[opp_face.0].centroid;
        self.mesh.faces[edge.face.0].plane.signed_distance(&centroid)
    }

    /// Try to merge `face` with one non-convex neighbor; true if a merge
    /// happened (the caller loops until the face is locally convex).
    fn do_adjacent_merge(&mut self, face: FaceId, kind: MergeKind) -> bool {
        let start = self.mesh.faces[face.0].edge;
        let mut hedge = start;
        let mut convex = true;

        loop {
            let opp_face = self.mesh.opposite_face(hedge).unwrap();
            let opp_edge = self.mesh.edges[hedge.0].opposite.unwrap();
            let mut merge = false;

            match kind {
                MergeKind::NonConvex => {
                    // Merge if definitively non-convex from either side.
                    if self.opp_face_distance(hedge) > -self.tolerance
                        || self.opp_face_distance(opp_edge) > -self.tolerance
                    {
                        merge = true;
                    }
                }
                MergeKind::NonConvexWrtLargerFace => {
                    // Merge if parallel or non-convex wrt the larger face;
                    // otherwise just mark the face for the second pass.
                    if self.mesh.faces[face.0].area > self.mesh.faces[opp_face.0].area {
                        if self.opp_face_distance(hedge) > -self.tolerance {
                            merge = true;
                        } else if self.opp_face_distance(opp_edge) > -self.tolerance {
                            convex = false;
                        }
                    } else if self.opp_face_distance(opp_edge) > -self.tolerance {
                        merge = true;
                    } else if self.opp_face_distance(hedge) > -self.tolerance {
                        convex = false;
                    }
                }
            }

            if merge {
                trace!("merging face {:?} with {:?}", face.0, opp_face.0);
                let mut discarded = Vec::with_capacity(3);
                self.mesh.merge_adjacent_face(face, hedge, &mut discarded);
                for df in discarded {
                    self.delete_face_points(df, Some(face));
                }
                return true;
            }

            hedge = self.mesh.edges[hedge.0].next;
            if hedge == start {
                break;
            }
        }

        if !convex {
            self.mesh.faces[face.0].mark = FaceMark::NonConvex;
        }
        false
    }

    fn add_point_to_hull(&mut self, eye: VertexId) {
        self.horizon.clear();
        self.unclaimed.clear();

        trace!(
            "adding point {:?} at {:?}",
            eye.0,
            self.mesh.verts[eye.0].point
        );
        let eye_face = self.mesh.verts[eye.0].face.unwrap();
        self.remove_point_from_face(eye, eye_face);
        let eye_pnt = self.mesh.verts[eye.0].point;
        self.calculate_horizon(eye_pnt, None, eye_face);
        self.add_new_faces(eye);

        // First merge pass: non-convex seams as judged by the larger face.
        let mut cursor = self.new_faces.first();
        while let Some(face) = cursor {
            if self.mesh.faces[face.0].mark == FaceMark::Visible {
                while self.do_adjacent_merge(face, MergeKind::NonConvexWrtLargerFace) {}
            }
            cursor = self.mesh.faces[face.0].next;
        }

        // Second merge pass: anything still marked non-convex.
        let mut cursor = self.new_faces.first();
        while let Some(face) = cursor {
            if self.mesh.faces[face.0].mark == FaceMark::NonConvex {
                self.mesh.faces[face.0].mark = FaceMark::Visible;
                while self.do_adjacent_merge(face, MergeKind::NonConvex) {}
            }
            cursor = self.mesh.faces[face.0].next;
        }

        self.resolve_unclaimed_points();
    }

    /// Hand every unclaimed point to the new face it is furthest above;
    /// points no longer above any face are dropped for good.
    fn resolve_unclaimed_points(&mut self) {
        let mut next = self.unclaimed.first();
        while let Some(vtx) = next {
            next = self.mesh.verts[vtx.0].next;

            let mut max_dist = self.tolerance;
            let mut max_face = None;
            let mut cursor = self.new_faces.first();
            while let Some(face) = cursor {
                if self.mesh.faces[face.0].mark == FaceMark::Visible {
                    let dist = self
                        .mesh
                        .distance_to_plane(face, &self.mesh.verts[vtx.0].point);
                    if dist > max_dist {
                        max_dist = dist;
                        max_face = Some(face);
                    }
                    if max_dist > 1000.0 * self.tolerance {
                        break;
                    }
                }
                cursor = self.mesh.faces[face.0].next;
            }
            if let Some(face) = max_face {
                self.add_point_to_face(vtx, face);
            }
        }
    }

    fn mark_face_vertices(&mut self, face: FaceId, mark: i32) {
        for v in self.mesh.face_vertices(face) {
            self.mesh.verts[v.0].index = mark;
        }
    }

    /// Drop non-visible faces and renumber the vertices that remain on the
    /// hull with contiguous zero-based indices.
    fn reindex_faces_and_vertices(&mut self) {
        for i in 0..self.num_points {
            self.mesh.verts[i].index = -1;
        }

        self.num_faces = 0;
        let mesh = &self.mesh;
        self.faces.retain(|f| mesh.faces[f.0].mark == FaceMark::Visible);
        for f in self.faces.clone() {
            self.mark_face_vertices(f, 0);
            self.num_faces += 1;
        }
        debug!("faces left after removing inactive: {}", self.num_faces);

        self.num_vertices = 0;
        for i in 0..self.num_points {
            if self.mesh.verts[i].index == 0 {
                self.vertex_point_indices[self.num_vertices] = i;
                self.mesh.verts[i].index = self.num_vertices as i32;
                self.num_vertices += 1;
            }
        }
    }
}
