use crate::csg::CSG;
use crate::float_types::{Real, PI, TAU};
use crate::polygon::Polygon;
use crate::vertex::Vertex;
use nalgebra::{Point3, Vector3};

impl<S: Clone + Send + Sync> CSG<S> {
    /// An axis-aligned cube (box) around `center` with edge lengths `size`.
    ///
    /// Six quadrilateral faces with outward axis normals. A unit cube at the
    /// origin is `cube(Point3::origin(), Vector3::new(1.0, 1.0, 1.0), None)`.
    pub fn cube(center: Point3<Real>, size: Vector3<Real>, metadata: Option<S>) -> CSG<S> {
        // Each face selects four of the eight corners; corner index bits
        // encode (x, y, z) offsets, winding is CCW seen from outside.
        const FACES: [[usize; 4]; 6] = [
            [0, 4, 6, 2],
            [1, 3, 7, 5],
            [0, 1, 5, 4],
            [2, 6, 7, 3],
            [0, 2, 3, 1],
            [4, 5, 7, 6],
        ];
        let normals: [Vector3<Real>; 6] = [
            -Vector3::x(),
            Vector3::x(),
            -Vector3::y(),
            Vector3::y(),
            -Vector3::z(),
            Vector3::z(),
        ];

        let mut polygons = Vec::with_capacity(6);
        for (face, normal) in FACES.iter().zip(normals) {
            let vertices = face
                .iter()
                .map(|&i| {
                    let pos = Point3::new(
                        center.x + size.x / 2.0 * (2.0 * ((i & 1) as Real) - 1.0),
                        center.y + size.y / 2.0 * (2.0 * (((i & 2) >> 1) as Real) - 1.0),
                        center.z + size.z / 2.0 * (2.0 * (((i & 4) >> 2) as Real) - 1.0),
                    );
                    Vertex::new(pos, normal)
                })
                .collect();
            polygons.push(Polygon::new(vertices, metadata.clone()));
        }
        CSG::from_polygons(polygons)
    }

    /// A sphere around `center` tessellated by latitude/longitude.
    ///
    /// Each (slice, stack) cell emits one polygon: a triangle at the poles,
    /// a quad elsewhere. Vertex normals point radially outward. The
    /// conventional tessellation is 16 slices by 8 stacks.
    pub fn sphere(
        center: Point3<Real>,
        radius: Real,
        slices: usize,
        stacks: usize,
        metadata: Option<S>,
    ) -> CSG<S> {
        let vertex = |theta: Real, phi: Real| {
            let theta = theta * TAU;
            let phi = phi * PI;
            let dir = Vector3::new(
                theta.cos() * phi.sin(),
                phi.cos(),
                theta.sin() * phi.sin(),
            );
            Vertex::new(center + dir * radius, dir)
        };

        let mut polygons = Vec::with_capacity(slices * stacks);
        for i in 0..slices {
            for j in 0..stacks {
                let t0 = i as Real / slices as Real;
                let t1 = (i + 1) as Real / slices as Real;
                let p0 = j as Real / stacks as Real;
                let p1 = (j + 1) as Real / stacks as Real;

                let mut vertices = Vec::with_capacity(4);
                vertices.push(vertex(t0, p0));
                if j > 0 {
                    vertices.push(vertex(t1, p0));
                }
                if j < stacks - 1 {
                    vertices.push(vertex(t1, p1));
                }
                vertices.push(vertex(t0, p1));

                polygons.push(Polygon::new(vertices, metadata.clone()));
            }
        }
        CSG::from_polygons(polygons)
    }

    /// A cylinder from `start` to `end` with the given radius.
    ///
    /// Two triangle-fan caps plus a skirt of side quads. The conventional
    /// cylinder runs from (0,-1,0) to (0,1,0) with radius 1 and 16 slices.
    pub fn cylinder(
        start: Point3<Real>,
        end: Point3<Real>,
        radius: Real,
        slices: usize,
        metadata: Option<S>,
    ) -> CSG<S> {
        let ray = end - start;
        let axis_z = ray.normalize();

        // Seed the local frame with whichever axis is less aligned with the
        // cylinder axis.
        let seed = if axis_z.y.abs() > 0.5 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let axis_x = seed.cross(&axis_z).normalize();
        let axis_y = axis_x.cross(&axis_z).normalize();

        let start_v = Vertex::new(start, -axis_z);
        let end_v = Vertex::new(end, axis_z);

        // A vertex on the lateral surface; `normal_blend` pulls the normal
        // toward the cap axis at the rim of each fan.
        let point = |stack: Real, slice: Real, normal_blend: Real| {
            let angle = slice * TAU;
            let out = axis_x * angle.cos() + axis_y * angle.sin();
            let pos = start + ray * stack + out * radius;
            let normal = out * (1.0 - normal_blend.abs()) + axis_z * normal_blend;
            Vertex::new(pos, normal)
        };

        let mut polygons = Vec::with_capacity(3 * slices);
        for i in 0..slices {
            let t0 = i as Real / slices as Real;
            let t1 = (i + 1) as Real / slices as Real;

            polygons.push(Polygon::new(
                vec![start_v.clone(), point(0.0, t0, -1.0), point(0.0, t1, -1.0)],
                metadata.clone(),
            ));
            polygons.push(Polygon::new(
                vec![
                    point(0.0, t1, 0.0),
                    point(0.0, t0, 0.0),
                    point(1.0, t0, 0.0),
                    point(1.0, t1, 0.0),
                ],
                metadata.clone(),
            ));
            polygons.push(Polygon::new(
                vec![end_v.clone(), point(1.0, t1, 1.0), point(1.0, t0, 1.0)],
                metadata.clone(),
            ));
        }
        CSG::from_polygons(polygons)
    }
}
