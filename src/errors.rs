use thiserror::Error;

/// Reasons a convex hull cannot be constructed from the supplied points.
///
/// Hull construction is all-or-nothing: any of these aborts the build and no
/// partial hull is kept. CSG boolean operations do not report errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HullError {
    #[error("fewer than four input points specified")]
    TooFewPoints,

    #[error("point buffer is smaller than the declared point count")]
    UndersizedBuffer,

    #[error("input points appear to be coincident")]
    Coincident,

    #[error("input points appear to be colinear")]
    Colinear,

    #[error("input points appear to be coplanar")]
    Coplanar,
}
