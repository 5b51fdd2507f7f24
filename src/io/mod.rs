//! Mesh export.

mod stl;
