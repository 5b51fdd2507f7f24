use crate::bounds::BoundingBox;
use crate::bsp::Node;
use crate::csg::CSG;
use crate::errors::HullError;
use crate::float_types::{Real, EPSILON, F64_EPSILON};
use crate::hull::Hull;
use crate::plane::{Plane, BACK, COPLANAR, FRONT, SPANNING};
use crate::polygon::Polygon;
use crate::splitter::Splitter;
use crate::vertex::Vertex;
use nalgebra::{Point3, Vector3};

type Csg = CSG<()>;

// --------------------------------------------------------
//   Helpers
// --------------------------------------------------------

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Quick helper to compare floating-point results with an acceptable
/// tolerance.
fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

fn assert_point_eq(p: &Point3<Real>, x: Real, y: Real, z: Real) {
    assert!(
        approx_eq(p.x, x, F64_EPSILON)
            && approx_eq(p.y, y, F64_EPSILON)
            && approx_eq(p.z, z, F64_EPSILON),
        "expected {p:?} to equal ({x}, {y}, {z})"
    );
}

fn unit_cube() -> Csg {
    Csg::cube(Point3::origin(), Vector3::new(1.0, 1.0, 1.0), None)
}

fn tri_poly(a: [Real; 3], b: [Real; 3], c: [Real; 3]) -> Polygon<()> {
    Polygon::new(
        vec![
            Vertex::new(Point3::new(a[0], a[1], a[2]), Vector3::z()),
            Vertex::new(Point3::new(b[0], b[1], b[2]), Vector3::z()),
            Vertex::new(Point3::new(c[0], c[1], c[2]), Vector3::z()),
        ],
        None,
    )
}

/// A regular n-gon in the XY plane, wound CCW.
fn ngon(n: usize) -> Polygon<()> {
    use crate::float_types::TAU;
    let vertices = (0..n)
        .map(|i| {
            let a = TAU * i as Real / n as Real;
            Vertex::new(Point3::new(a.cos(), a.sin(), 0.0), Vector3::z())
        })
        .collect();
    Polygon::new(vertices, None)
}

// --------------------------------------------------------
//   Vertex tests
// --------------------------------------------------------

#[test]
fn test_vertex_new() {
    let pos = Point3::new(1.0, 2.0, 3.0);
    let normal = Vector3::new(0.0, 1.0, 0.0);
    let v = Vertex::new(pos, normal);
    assert_eq!(v.pos, pos);
    assert_eq!(v.normal, normal);
}

#[test]
fn test_vertex_flip() {
    let mut v = Vertex::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 0.0, 0.0));
    v.flip();
    // Position remains the same, normal is negated.
    assert_eq!(v.pos, Point3::new(1.0, 2.0, 3.0));
    assert_eq!(v.normal, Vector3::new(-1.0, 0.0, 0.0));
}

#[test]
fn test_vertex_interpolate() {
    let v1 = Vertex::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    let v2 = Vertex::new(Point3::new(2.0, 2.0, 2.0), Vector3::new(0.0, 1.0, 0.0));
    let v_mid = v1.interpolate(&v2, 0.5);
    assert!(approx_eq(v_mid.pos.x, 1.0, EPSILON));
    assert!(approx_eq(v_mid.pos.y, 1.0, EPSILON));
    assert!(approx_eq(v_mid.pos.z, 1.0, EPSILON));
    assert!(approx_eq(v_mid.normal.x, 0.5, EPSILON));
    assert!(approx_eq(v_mid.normal.y, 0.5, EPSILON));
}

// --------------------------------------------------------
//   Plane tests
// --------------------------------------------------------

#[test]
fn test_plane_from_points() {
    let a = Point3::new(0.0, 0.0, 0.0);
    let b = Point3::new(1.0, 0.0, 0.0);
    let c = Point3::new(0.0, 1.0, 0.0);
    let plane = Plane::from_points(&a, &b, &c);
    assert!(approx_eq(plane.normal.norm(), 1.0, 1e-12));
    assert!(approx_eq(plane.normal.z, 1.0, EPSILON));
    // All three defining points satisfy normal . p == w.
    for p in [&a, &b, &c] {
        assert!(approx_eq(plane.signed_distance(p), 0.0, EPSILON));
    }
}

#[test]
fn test_plane_flip() {
    let mut plane = Plane {
        normal: Vector3::new(0.0, 1.0, 0.0),
        w: 2.0,
    };
    plane.flip();
    assert_eq!(plane.normal, Vector3::new(0.0, -1.0, 0.0));
    assert_eq!(plane.w, -2.0);
}

#[test]
fn test_plane_orient_point() {
    let plane = Plane {
        normal: Vector3::z(),
        w: 0.0,
    };
    assert_eq!(plane.orient_point(&Point3::new(0.0, 0.0, 1.0)), FRONT);
    assert_eq!(plane.orient_point(&Point3::new(0.0, 0.0, -1.0)), BACK);
    assert_eq!(plane.orient_point(&Point3::new(5.0, -3.0, 0.0)), COPLANAR);
    // Within EPSILON of the plane still counts as coplanar.
    assert_eq!(
        plane.orient_point(&Point3::new(0.0, 0.0, EPSILON / 2.0)),
        COPLANAR
    );
}

#[test]
fn test_plane_split_polygon_spanning() {
    // A plane that splits the XY square at y=0.
    let plane = Plane {
        normal: Vector3::new(0.0, 1.0, 0.0),
        w: 0.0,
    };
    let poly = Polygon::<()>::new(
        vec![
            Vertex::new(Point3::new(-1.0, -1.0, 0.0), Vector3::z()),
            Vertex::new(Point3::new(1.0, -1.0, 0.0), Vector3::z()),
            Vertex::new(Point3::new(1.0, 1.0, 0.0), Vector3::z()),
            Vertex::new(Point3::new(-1.0, 1.0, 0.0), Vector3::z()),
        ],
        None,
    );

    let mut cf = Vec::new();
    let mut cb = Vec::new();
    let mut f = Vec::new();
    let mut b = Vec::new();
    plane.split_polygon(&poly, &mut cf, &mut cb, &mut f, &mut b);

    assert_eq!(cf.len(), 0);
    assert_eq!(cb.len(), 0);
    assert_eq!(f.len(), 1);
    assert_eq!(b.len(), 1);
    for v in &f[0].vertices {
        assert!(v.pos.y >= -EPSILON);
    }
    for v in &b[0].vertices {
        assert!(v.pos.y <= EPSILON);
    }
}

#[test]
fn test_plane_split_polygon_coplanar_dispatch() {
    let plane = Plane {
        normal: Vector3::z(),
        w: 0.0,
    };
    let poly = tri_poly([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);

    let mut cf = Vec::new();
    let mut cb = Vec::new();
    let mut f = Vec::new();
    let mut b = Vec::new();
    plane.split_polygon(&poly, &mut cf, &mut cb, &mut f, &mut b);
    // Same orientation => coplanar front.
    assert_eq!((cf.len(), cb.len(), f.len(), b.len()), (1, 0, 0, 0));

    let mut flipped = poly.clone();
    flipped.flip();
    let mut cf = Vec::new();
    let mut cb = Vec::new();
    let mut f = Vec::new();
    let mut b = Vec::new();
    plane.split_polygon(&flipped, &mut cf, &mut cb, &mut f, &mut b);
    // Opposite orientation => coplanar back.
    assert_eq!((cf.len(), cb.len(), f.len(), b.len()), (0, 1, 0, 0));
}

#[test]
fn test_plane_split_polygon_one_side() {
    let plane = Plane {
        normal: Vector3::z(),
        w: 0.0,
    };
    let above = tri_poly([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
    let below = tri_poly([0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]);

    let mut cf = Vec::new();
    let mut cb = Vec::new();
    let mut f = Vec::new();
    let mut b = Vec::new();
    plane.split_polygon(&above, &mut cf, &mut cb, &mut f, &mut b);
    plane.split_polygon(&below, &mut cf, &mut cb, &mut f, &mut b);
    assert_eq!((cf.len(), cb.len(), f.len(), b.len()), (0, 0, 1, 1));
}

// --------------------------------------------------------
//   Polygon tests
// --------------------------------------------------------

#[test]
fn test_polygon_new() {
    let poly = Polygon::new(
        vec![
            Vertex::new(Point3::new(0.0, 0.0, 0.0), Vector3::z()),
            Vertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::z()),
            Vertex::new(Point3::new(0.0, 1.0, 0.0), Vector3::z()),
        ],
        Some("triangle".to_string()),
    );
    assert_eq!(poly.vertices.len(), 3);
    assert_eq!(poly.metadata(), Some(&"triangle".to_string()));
    assert!(approx_eq(poly.plane.normal.z, 1.0, EPSILON));
}

#[test]
#[should_panic(expected = "Polygon::new requires at least 3 vertices")]
fn test_polygon_new_with_fewer_than_three_vertices() {
    let vertices = vec![
        Vertex::new(Point3::new(0.0, 0.0, 0.0), Vector3::x()),
        Vertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::x()),
    ];
    let _polygon = Polygon::<()>::new(vertices, None);
}

#[test]
fn test_polygon_flip_involution() {
    let poly = ngon(5);
    let mut flipped = poly.clone();
    flipped.flip();
    assert!(approx_eq(
        flipped.plane.normal.z,
        -poly.plane.normal.z,
        EPSILON
    ));
    flipped.flip();
    // Two flips restore the polygon bit for bit.
    assert_eq!(flipped.vertices, poly.vertices);
    assert_eq!(flipped.plane, poly.plane);
}

#[test]
fn test_polygon_triangulation_counts() {
    // A fan triangulation of an n-gon always yields n-2 triangles.
    for n in 3..=9 {
        let poly = ngon(n);
        let tris = poly.triangles();
        assert_eq!(tris.len(), n - 2, "{n}-gon should yield {} triangles", n - 2);
        for t in &tris {
            assert_eq!(t.vertices.len(), 3);
            // Triangles share the parent plane unchanged.
            assert_eq!(t.plane, poly.plane);
            // Triangle vertices are drawn from the original vertex set.
            for v in &t.vertices {
                assert!(poly.vertices.contains(v));
            }
        }
    }
}

#[test]
fn test_polygon_triangulation_quad_pattern() {
    let poly = ngon(4);
    let tris = poly.triangles();
    assert_eq!(tris.len(), 2);
    // (0,1,2) and (0,2,3)
    assert_eq!(tris[0].vertices[0], poly.vertices[0]);
    assert_eq!(tris[0].vertices[1], poly.vertices[1]);
    assert_eq!(tris[0].vertices[2], poly.vertices[2]);
    assert_eq!(tris[1].vertices[0], poly.vertices[0]);
    assert_eq!(tris[1].vertices[1], poly.vertices[2]);
    assert_eq!(tris[1].vertices[2], poly.vertices[3]);
}

// --------------------------------------------------------
//   Splitter tests
// --------------------------------------------------------

#[test]
fn test_splitter_selection_threshold() {
    assert_eq!(Splitter::for_polygon_count(0), Splitter::Serial);
    assert_eq!(Splitter::for_polygon_count(1000), Splitter::Serial);
    assert_eq!(Splitter::for_polygon_count(1001), Splitter::Parallel);
}

#[test]
fn test_splitter_parallel_matches_serial() {
    // 1200 triangles strung out along x, none within EPSILON of the plane.
    let plane = Plane {
        normal: Vector3::x(),
        w: 0.0,
    };
    let polygons: Vec<Polygon<()>> = (0..1200)
        .map(|i| {
            let x = -6.005 + 0.01 * i as Real;
            tri_poly([x, 0.0, 0.0], [x, 1.0, 0.0], [x, 0.0, 1.0])
        })
        .collect();

    let serial = Splitter::Serial.split(&plane, &polygons);
    let parallel = Splitter::Parallel.split(&plane, &polygons);

    // Order is not guaranteed, but the multiset of outputs is.
    assert_eq!(serial.0.len(), parallel.0.len());
    assert_eq!(serial.1.len(), parallel.1.len());
    assert_eq!(serial.2.len(), parallel.2.len());
    assert_eq!(serial.3.len(), parallel.3.len());
    assert_eq!(serial.2.len() + serial.3.len(), 1200);
}

// --------------------------------------------------------
//   Bounding box tests
// --------------------------------------------------------

#[test]
fn test_bounding_box_cube() {
    let bb = unit_cube().bounding_box();
    assert_point_eq(&bb.min, -0.5, -0.5, -0.5);
    assert_point_eq(&bb.max, 0.5, 0.5, 0.5);
    assert_point_eq(&bb.center(), 0.0, 0.0, 0.0);

    let c = Csg::cube(Point3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 4.0, 2.0), None);
    let bb = c.bounding_box();
    assert_point_eq(&bb.min, 0.0, -1.0, 0.0);
    assert_point_eq(&bb.max, 2.0, 3.0, 2.0);
    assert_point_eq(&bb.center(), 1.0, 1.0, 1.0);
    let size = bb.size();
    assert!(approx_eq(size.x, 2.0, F64_EPSILON));
    assert!(approx_eq(size.y, 4.0, F64_EPSILON));
    assert!(approx_eq(size.z, 2.0, F64_EPSILON));
}

#[test]
fn test_bounding_box_contains_is_strict() {
    let mut bb = BoundingBox::new();
    bb.add_point(&Point3::new(0.0, 0.0, 0.0));
    bb.add_point(&Point3::new(1.0, 1.0, 1.0));
    assert!(bb.contains(&Point3::new(0.5, 0.5, 0.5)));
    // Boundary points are not inside.
    assert!(!bb.contains(&Point3::new(0.0, 0.5, 0.5)));
    assert!(!bb.contains(&Point3::new(1.0, 1.0, 1.0)));
    assert!(!bb.contains(&Point3::new(2.0, 0.5, 0.5)));
}

#[test]
fn test_bounding_box_subdivide() {
    let mut bb = BoundingBox::new();
    bb.add_point(&Point3::new(0.0, 0.0, 0.0));
    bb.add_point(&Point3::new(2.0, 2.0, 2.0));

    let octants = bb.subdivide();
    // Octant indices pack as x*4 + y*2 + z.
    assert_point_eq(&octants[0].min, 0.0, 0.0, 0.0);
    assert_point_eq(&octants[0].max, 1.0, 1.0, 1.0);
    assert_point_eq(&octants[7].min, 1.0, 1.0, 1.0);
    assert_point_eq(&octants[7].max, 2.0, 2.0, 2.0);
    assert_point_eq(&octants[4].min, 1.0, 0.0, 0.0);
    assert_point_eq(&octants[2].min, 0.0, 1.0, 0.0);
    assert_point_eq(&octants[1].min, 0.0, 0.0, 1.0);
    for o in &octants {
        let size = o.size();
        assert!(approx_eq(size.x, 1.0, F64_EPSILON));
        assert!(approx_eq(size.y, 1.0, F64_EPSILON));
        assert!(approx_eq(size.z, 1.0, F64_EPSILON));
    }
}

#[test]
fn test_bounding_box_relation_to_plane() {
    let mut bb = BoundingBox::new();
    bb.add_point(&Point3::new(0.0, 0.0, 0.0));
    bb.add_point(&Point3::new(1.0, 1.0, 1.0));

    let through = Plane {
        normal: Vector3::z(),
        w: 0.5,
    };
    assert_eq!(bb.relation_to_plane(&through), SPANNING);

    let below = Plane {
        normal: Vector3::z(),
        w: -1.0,
    };
    assert_eq!(bb.relation_to_plane(&below), FRONT);

    let above = Plane {
        normal: Vector3::z(),
        w: 2.0,
    };
    assert_eq!(bb.relation_to_plane(&above), BACK);
}

// --------------------------------------------------------
//   Shape factory tests
// --------------------------------------------------------

#[test]
fn test_cube_polygons() {
    let cube = unit_cube();
    assert_eq!(cube.polygons.len(), 6);
    for poly in &cube.polygons {
        assert_eq!(poly.vertices.len(), 4);
        // The winding table must agree with the assigned outward normal.
        let n = poly.vertices[0].normal;
        assert!(approx_eq(poly.plane.normal.dot(&n), 1.0, 1e-12));
    }
}

#[test]
fn test_sphere_polygons() {
    let sphere = Csg::sphere(Point3::origin(), 1.0, 8, 4, None);
    assert_eq!(sphere.polygons.len(), 8 * 4);
    let triangles = sphere
        .polygons
        .iter()
        .filter(|p| p.vertices.len() == 3)
        .count();
    let quads = sphere
        .polygons
        .iter()
        .filter(|p| p.vertices.len() == 4)
        .count();
    // One triangle per wedge at each pole, quads in between.
    assert_eq!(triangles, 16);
    assert_eq!(quads, 16);
    // Every vertex sits on the sphere with a radial unit normal.
    for poly in &sphere.polygons {
        for v in &poly.vertices {
            assert!(approx_eq(v.pos.coords.norm(), 1.0, 1e-12));
            assert!(approx_eq(v.normal.dot(&v.pos.coords), 1.0, 1e-12));
        }
    }
}

#[test]
fn test_cylinder_polygons() {
    let cyl = Csg::cylinder(
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        8,
        None,
    );
    // Per slice: one cap triangle each end plus a side quad.
    assert_eq!(cyl.polygons.len(), 3 * 8);
    let bb = cyl.bounding_box();
    assert!(approx_eq(bb.min.y, -1.0, 1e-12));
    assert!(approx_eq(bb.max.y, 1.0, 1e-12));
    assert!(approx_eq(bb.max.x, 1.0, 1e-9));
}

// --------------------------------------------------------
//   BSP node tests
// --------------------------------------------------------

#[test]
fn test_node_new_and_build() {
    let p = tri_poly([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
    let node = Node::new(std::slice::from_ref(&p));
    assert!(node.plane.is_some());
    assert_eq!(node.polygons.len(), 1);
    assert!(node.front.is_none());
    assert!(node.back.is_none());
}

#[test]
fn test_node_build_is_incremental() {
    let coplanar = tri_poly([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
    let mut node = Node::new(std::slice::from_ref(&coplanar));

    // Empty input leaves the tree untouched.
    node.build(&[]);
    assert_eq!(node.polygons.len(), 1);

    // A second coplanar polygon joins this node's list.
    node.build(&[tri_poly([2.0, 0.0, 0.0], [3.0, 0.0, 0.0], [2.0, 1.0, 0.0])]);
    assert_eq!(node.polygons.len(), 2);
    assert!(node.front.is_none());

    // A polygon strictly in front grows a front child.
    node.build(&[tri_poly([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0])]);
    assert!(node.front.is_some());
    assert_eq!(node.all_polygons().len(), 3);
}

#[test]
fn test_node_invert() {
    let p = tri_poly([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
    let mut node = Node::new(std::slice::from_ref(&p));
    let original_normal = node.plane.as_ref().unwrap().normal;
    node.invert();
    let flipped = node.plane.as_ref().unwrap().normal;
    assert!(approx_eq(flipped.x, -original_normal.x, EPSILON));
    assert!(approx_eq(flipped.y, -original_normal.y, EPSILON));
    assert!(approx_eq(flipped.z, -original_normal.z, EPSILON));
    assert_eq!(node.polygons.len(), 1);
}

#[test]
fn test_node_clip_polygons_without_plane_is_identity() {
    let node = Node::<()>::new(&[]);
    let p = tri_poly([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
    let out = node.clip_polygons(std::slice::from_ref(&p));
    assert_eq!(out.len(), 1);
}

#[test]
fn test_clip_to_removes_interior() {
    // Clip a cube against an overlapping cube: nothing that survives may lie
    // strictly inside the clipping solid.
    let a = Csg::cube(Point3::origin(), Vector3::new(2.0, 2.0, 2.0), None);
    let b = Csg::cube(Point3::new(1.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0), None);

    let mut a_node = Node::new(&a.polygons);
    let b_node = Node::new(&b.polygons);
    a_node.clip_to(&b_node);

    let b_box = b.bounding_box();
    for poly in a_node.all_polygons() {
        for v in &poly.vertices {
            assert!(
                !b_box.contains(&v.pos),
                "vertex {:?} survived inside the clip solid",
                v.pos
            );
        }
    }
}

// --------------------------------------------------------
//   CSG boolean tests
// --------------------------------------------------------

#[test]
fn test_union_commutes_on_bounding_boxes() {
    let a = Csg::cube(Point3::origin(), Vector3::new(2.0, 2.0, 2.0), None);
    let b = Csg::cube(
        Point3::new(1.0, 0.5, 0.25),
        Vector3::new(2.0, 2.0, 2.0),
        None,
    );

    let ab = a.union(&b).bounding_box();
    let ba = b.union(&a).bounding_box();
    assert_eq!(ab, ba);
    assert_point_eq(&ab.min, -1.0, -1.0, -1.0);
    assert_point_eq(&ab.max, 2.0, 1.5, 1.25);
}

#[test]
fn test_subtract_sphere_from_cube() {
    init_logging();
    let cube = Csg::cube(Point3::origin(), Vector3::new(2.0, 2.0, 2.0), None);
    let sphere = Csg::sphere(Point3::new(1.0, 1.0, 1.0), 1.2, 15, 15, None);

    let carved = cube.subtract(&sphere);
    assert!(!carved.polygons.is_empty());

    // Carving a corner does not move the extents.
    let bb = carved.bounding_box();
    let cube_bb = cube.bounding_box();
    for i in 0..3 {
        assert!(approx_eq(bb.min[i], cube_bb.min[i], EPSILON));
        assert!(approx_eq(bb.max[i], cube_bb.max[i], EPSILON));
    }
}

#[test]
fn test_intersect_overlapping_cubes() {
    let a = Csg::cube(Point3::origin(), Vector3::new(2.0, 2.0, 2.0), None);
    let b = Csg::cube(Point3::new(1.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0), None);

    let both = a.intersect(&b);
    assert!(!both.polygons.is_empty());
    let bb = both.bounding_box();
    assert!(approx_eq(bb.min.x, 0.0, EPSILON));
    assert!(approx_eq(bb.max.x, 1.0, EPSILON));
    assert!(approx_eq(bb.min.y, -1.0, EPSILON));
    assert!(approx_eq(bb.max.y, 1.0, EPSILON));
}

#[test]
fn test_inverse_involution() {
    let cube = unit_cube();
    let twice = cube.inverse().inverse();
    assert_eq!(cube.polygons.len(), twice.polygons.len());
    for (p, q) in cube.polygons.iter().zip(&twice.polygons) {
        assert_eq!(p.vertices, q.vertices);
        assert_eq!(p.plane, q.plane);
    }
}

// --------------------------------------------------------
//   STL export tests
// --------------------------------------------------------

#[test]
fn test_ascii_stl_output() {
    let cube = unit_cube();
    let stl = cube.to_ascii_stl("test_cube");

    assert!(stl.starts_with("solid test_cube\n"));
    assert!(stl.ends_with("endsolid test_cube\n"));
    // 6 quads fan out into 12 facets of 3 vertices each.
    assert_eq!(stl.matches("facet Normal ").count(), 12);
    assert_eq!(stl.matches("endfacet").count(), 12);
    assert_eq!(stl.matches("outer loop").count(), 12);
    assert_eq!(stl.matches("vertex ").count(), 36);
    // Coordinates print with six decimals.
    assert!(stl.contains("0.500000"));
}

#[test]
fn test_ascii_stl_writer_matches_string() {
    let sphere = Csg::sphere(Point3::origin(), 1.0, 6, 3, None);
    let mut buf = Vec::new();
    sphere.write_ascii_stl("ball", &mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), sphere.to_ascii_stl("ball"));
}

// --------------------------------------------------------
//   Hull tests
// --------------------------------------------------------

#[test]
fn test_hull_of_seven_points() {
    init_logging();
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.5, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(0.5, 0.5, 0.5),
        Point3::new(0.0, 0.0, 2.0),
        Point3::new(0.1, 0.2, 0.3),
        Point3::new(0.0, 2.0, 0.0),
    ];
    let mut hull = Hull::new();
    hull.build(&points, points.len()).unwrap();

    let vs = hull.vertices();
    assert_eq!(vs.len(), 4);
    assert_eq!(vs[0], Point3::new(0.0, 0.0, 0.0));
    assert_eq!(vs[1], Point3::new(2.0, 0.0, 0.0));
    assert_eq!(vs[2], Point3::new(0.0, 0.0, 2.0));
    assert_eq!(vs[3], Point3::new(0.0, 2.0, 0.0));

    let expected = vec![vec![1, 2, 0], vec![3, 1, 0], vec![3, 0, 2], vec![3, 2, 1]];
    assert_eq!(hull.faces(), expected);
}

#[test]
fn test_hull_rejects_too_few_points() {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let mut hull = Hull::new();
    assert_eq!(
        hull.build(&points, points.len()),
        Err(HullError::TooFewPoints)
    );
}

#[test]
fn test_hull_rejects_undersized_buffer() {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let mut hull = Hull::new();
    assert_eq!(hull.build(&points, 5), Err(HullError::UndersizedBuffer));
}

#[test]
fn test_hull_rejects_coincident_points() {
    let points = vec![Point3::new(1.0, 1.0, 1.0); 7];
    let mut hull = Hull::new();
    assert_eq!(
        hull.build(&points, points.len()),
        Err(HullError::Coincident)
    );
}

#[test]
fn test_hull_rejects_colinear_points() {
    let points: Vec<_> = (0..6)
        .map(|i| Point3::new(i as Real, 0.0, 0.0))
        .collect();
    let mut hull = Hull::new();
    assert_eq!(hull.build(&points, points.len()), Err(HullError::Colinear));
}

#[test]
fn test_hull_rejects_coplanar_points() {
    let points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(3.0, 0.0, 0.0),
        Point3::new(0.0, 3.0, 0.0),
        Point3::new(3.0, 3.0, 0.0),
        Point3::new(1.0, 2.0, 0.0),
    ];
    let mut hull = Hull::new();
    assert_eq!(hull.build(&points, points.len()), Err(HullError::Coplanar));
}

#[test]
fn test_hull_contains_all_input_points() {
    // Deterministic pseudo-random cloud.
    let mut state: u64 = 0x2545F4914F6CDD1D;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 11) as Real / (1u64 << 53) as Real) * 10.0
    };
    let points: Vec<_> = (0..50)
        .map(|_| Point3::new(next(), next(), next()))
        .collect();

    let mut hull = Hull::new();
    hull.build(&points, points.len()).unwrap();

    // Every input point lies on or inside every face plane.
    let csg: Csg = hull.to_csg();
    assert!(!csg.polygons.is_empty());
    for poly in &csg.polygons {
        for p in &points {
            assert!(
                poly.plane.signed_distance(p) < 1e-9,
                "point {p:?} is outside a hull face"
            );
        }
    }

    // Hull vertices are a duplicate-free subset of the input.
    let vs = hull.vertices();
    for (i, v) in vs.iter().enumerate() {
        assert!(points.contains(v));
        for w in &vs[i + 1..] {
            assert_ne!(v, w);
        }
    }
}

#[test]
fn test_hull_of_cube_corners() {
    let cube = Csg::cube(Point3::origin(), Vector3::new(2.0, 2.0, 2.0), None);
    let mut hull = Hull::new();
    // 24 face vertices collapse onto the 8 cube corners.
    hull.build_from_csg(std::slice::from_ref(&cube)).unwrap();
    assert_eq!(hull.vertices().len(), 8);

    let hull_csg: Csg = hull.to_csg();
    assert_eq!(hull_csg.bounding_box(), cube.bounding_box());
}

#[test]
fn test_hull_from_two_spheres() {
    init_logging();
    let s1 = Csg::sphere(Point3::origin(), 1.0, 16, 8, None);
    let s2 = Csg::sphere(Point3::new(4.0, 4.0, 4.0), 1.0, 16, 8, None);

    let mut hull = Hull::new();
    hull.build_from_csg(&[s1.clone(), s2.clone()]).unwrap();

    // The hull spans both spheres exactly: extreme input points survive.
    let mut combined = s1.bounding_box();
    for p in s2.to_polygons() {
        combined.add_polygon(p);
    }
    let hull_csg: Csg = hull.to_csg();
    assert_eq!(hull_csg.bounding_box(), combined);

    // Faces are closed rings of at least 3 vertices.
    let n_verts = hull.vertices().len();
    for face in hull.faces() {
        assert!(face.len() >= 3);
        for idx in face {
            assert!(idx < n_verts);
        }
    }
}

#[test]
fn test_convex_hull_of_csg() {
    let cyl = Csg::cylinder(
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        16,
        None,
    );
    let hull = cyl.convex_hull().unwrap();
    // A cylinder is already convex; the hull keeps its extents.
    assert_eq!(hull.bounding_box(), cyl.bounding_box());
}

// --------------------------------------------------------
//   Stress scenario
// --------------------------------------------------------

#[test]
fn test_sphere_grid_union_and_subtract() {
    init_logging();
    // A grid of overlapping spheres unioned together, then carved by a
    // large central sphere.
    let mut last: Option<Csg> = None;
    for i in 0..4 {
        for j in 0..4 {
            let s = Csg::sphere(Point3::new(i as Real, j as Real, 0.0), 2.0, 6, 6, None);
            last = Some(match last {
                Some(acc) => acc.union(&s),
                None => s,
            });
        }
    }
    let grid = last.unwrap();

    let center = Csg::sphere(Point3::origin(), 5.0, 6, 6, None);
    let carved = grid.subtract(&center);

    assert!(!carved.polygons.is_empty());
    let bb = carved.bounding_box();
    for i in 0..3 {
        assert!(bb.min[i].is_finite());
        assert!(bb.max[i].is_finite());
        assert!(bb.min[i] <= bb.max[i]);
    }

    // The result round-trips through the STL writer.
    let stl = carved.to_ascii_stl("sphere_grid");
    assert!(stl.starts_with("solid sphere_grid\n"));
    assert!(stl.ends_with("endsolid sphere_grid\n"));
    assert!(stl.matches("facet Normal ").count() >= carved.polygons.len());
}
