use crate::plane::Plane;
use crate::polygon::Polygon;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Polygon lists above this size are split in parallel.
pub const PARALLEL_THRESHOLD: usize = 1000;

/// Batch size handed to each parallel worker.
pub const BATCH_SIZE: usize = 500;

/// The four output lists of a split: coplanar-front, coplanar-back, front,
/// and back polygons. Callers must treat each list as an orderless set; the
/// parallel splitter only guarantees the multiset of polygons produced.
pub type SplitLists<S> = (
    Vec<Polygon<S>>,
    Vec<Polygon<S>>,
    Vec<Polygon<S>>,
    Vec<Polygon<S>>,
);

/// Strategy for splitting a set of polygons against a plane. The two
/// variants produce the same multiset of polygons; `Parallel` fans the list
/// out across worker threads in batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Splitter {
    Serial,
    Parallel,
}

impl Splitter {
    /// Pick a splitter for a list of `n` polygons: parallel above
    /// `PARALLEL_THRESHOLD`, serial otherwise.
    pub fn for_polygon_count(n: usize) -> Splitter {
        if n > PARALLEL_THRESHOLD {
            Splitter::Parallel
        } else {
            Splitter::Serial
        }
    }

    /// Split `polygons` against `plane` into the four output lists.
    pub fn split<S: Clone + Send + Sync>(
        &self,
        plane: &Plane,
        polygons: &[Polygon<S>],
    ) -> SplitLists<S> {
        match self {
            Splitter::Serial => split_serial(plane, polygons),
            Splitter::Parallel => split_parallel(plane, polygons),
        }
    }
}

fn split_serial<S: Clone + Send + Sync>(
    plane: &Plane,
    polygons: &[Polygon<S>],
) -> SplitLists<S> {
    let mut coplanar_front = Vec::new();
    let mut coplanar_back = Vec::new();
    let mut front = Vec::new();
    let mut back = Vec::new();
    for poly in polygons {
        plane.split_polygon(
            poly,
            &mut coplanar_front,
            &mut coplanar_back,
            &mut front,
            &mut back,
        );
    }
    (coplanar_front, coplanar_back, front, back)
}

#[cfg(feature = "parallel")]
fn split_parallel<S: Clone + Send + Sync>(
    plane: &Plane,
    polygons: &[Polygon<S>],
) -> SplitLists<S> {
    if polygons.len() <= PARALLEL_THRESHOLD {
        return split_serial(plane, polygons);
    }
    polygons
        .par_chunks(BATCH_SIZE)
        .map(|batch| split_serial(plane, batch))
        .reduce(
            || (Vec::new(), Vec::new(), Vec::new(), Vec::new()),
            |mut acc, x| {
                acc.0.extend(x.0);
                acc.1.extend(x.1);
                acc.2.extend(x.2);
                acc.3.extend(x.3);
                acc
            },
        )
}

#[cfg(not(feature = "parallel"))]
fn split_parallel<S: Clone + Send + Sync>(
    plane: &Plane,
    polygons: &[Polygon<S>],
) -> SplitLists<S> {
    split_serial(plane, polygons)
}
