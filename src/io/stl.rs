use crate::csg::CSG;
use std::io::{self, Write};

impl<S: Clone + Send + Sync> CSG<S> {
    /// Write this solid as ASCII STL. Every polygon is fan-triangulated
    /// first and each facet carries its polygon's plane normal.
    pub fn write_ascii_stl<W: Write>(&self, name: &str, out: &mut W) -> io::Result<()> {
        writeln!(out, "solid {name}")?;
        for p in &self.polygons {
            for t in p.triangles() {
                let n = t.plane.normal;
                writeln!(out, "facet Normal {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
                writeln!(out, "\touter loop")?;
                for v in &t.vertices {
                    writeln!(out, "\t\tvertex {:.6} {:.6} {:.6}", v.pos.x, v.pos.y, v.pos.z)?;
                }
                writeln!(out, "\tendloop")?;
                writeln!(out, "endfacet")?;
            }
        }
        writeln!(out, "endsolid {name}")?;
        Ok(())
    }

    /// ASCII STL as an in-memory string.
    pub fn to_ascii_stl(&self, name: &str) -> String {
        let mut buf = Vec::new();
        self.write_ascii_stl(name, &mut buf)
            .expect("writing STL to a Vec cannot fail");
        String::from_utf8(buf).expect("STL output is ASCII")
    }
}
