//! Interior classification by flood fill.
//!
//! Labels every non-boundary cell of an [`OccupancyGrid`] as outside or
//! inside: cells 6-connected to any of the six grid faces without crossing
//! a [`Occupancy::Boundary`] cell are outside, the rest are inside.
//!
//! The result is meaningful when the boundary cells form a closed
//! separator, i.e. the rasterized mesh was watertight
//! ([`TriMesh::is_closed`](mesh_types::TriMesh::is_closed)); for open
//! surfaces the fill leaks and everything becomes outside.

use tracing::{debug, info};

use crate::error::{GridError, GridResult};
use crate::occupancy::{Occupancy, OccupancyGrid};

/// Counters reported by [`classify_interior`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloodFillStats {
    /// Cells seeded on the grid faces.
    pub seeds: usize,
    /// Cells reached by the traversal (labelled outside).
    pub visited: usize,
    /// Cells labelled inside.
    pub inside: usize,
    /// Cells labelled outside.
    pub outside: usize,
    /// Boundary cells (left untouched).
    pub boundary: usize,
}

/// Grow-on-demand FIFO of linear cell indices.
///
/// Capacity doubles as needed up to a hard limit; the traversal enqueues
/// each cell at most once, so reaching the limit means a broken invariant
/// rather than a large input.
struct RingQueue {
    buf: Vec<u32>,
    head: usize,
    len: usize,
    limit: usize,
}

impl RingQueue {
    fn new(initial: usize, limit: usize) -> Self {
        Self {
            buf: vec![0; initial.clamp(1, limit.max(1))],
            head: 0,
            len: 0,
            limit,
        }
    }

    fn push(&mut self, value: u32) -> GridResult<()> {
        if self.len == self.buf.len() {
            self.grow()?;
        }
        let tail = (self.head + self.len) % self.buf.len();
        self.buf[tail] = value;
        self.len += 1;
        Ok(())
    }

    fn pop(&mut self) -> Option<u32> {
        if self.len == 0 {
            return None;
        }
        let value = self.buf[self.head];
        self.head = (self.head + 1) % self.buf.len();
        self.len -= 1;
        Some(value)
    }

    fn grow(&mut self) -> GridResult<()> {
        if self.buf.len() >= self.limit {
            return Err(GridError::QueueOverflow {
                capacity: self.limit,
            });
        }
        let new_cap = (self.buf.len() * 2).min(self.limit);
        let mut new_buf = vec![0; new_cap];
        for i in 0..self.len {
            new_buf[i] = self.buf[(self.head + i) % self.buf.len()];
        }
        self.buf = new_buf;
        self.head = 0;
        Ok(())
    }
}

/// One bit per cell, used to avoid revisits.
struct VisitedSet {
    words: Vec<u64>,
}

impl VisitedSet {
    fn new(cells: usize) -> Self {
        Self {
            words: vec![0; cells.div_ceil(64)],
        }
    }

    #[inline]
    fn get(&self, index: usize) -> bool {
        self.words[index / 64] & (1 << (index % 64)) != 0
    }

    #[inline]
    fn set(&mut self, index: usize) {
        self.words[index / 64] |= 1 << (index % 64);
    }
}

/// Labels non-boundary cells of `grid` as outside (face-connected) or
/// inside (enclosed).
///
/// Seeds every non-boundary cell on the six outer faces, runs a
/// 6-connected BFS over linear indices, then relabels: visited cells
/// become [`Occupancy::Outside`], unvisited non-boundary cells become
/// [`Occupancy::Inside`]. Boundary cells are never modified.
///
/// # Errors
///
/// Returns [`GridError::QueueOverflow`] if the work queue outgrows the
/// total cell count, which indicates a traversal invariant violation.
///
/// # Example
///
/// ```
/// use mesh_types::Vector3;
/// use voxel_grid::{classify_interior, GridMeta, Occupancy, OccupancyGrid};
///
/// // A 5x5x5 grid with a hollow 3x3x3 boundary shell around the center.
/// let meta = GridMeta::new([0, 0, 0], [5, 5, 5], Vector3::new(1.0, 1.0, 1.0)).unwrap();
/// let mut grid = OccupancyGrid::new(meta);
/// for z in 1..4 {
///     for y in 1..4 {
///         for x in 1..4 {
///             if x == 2 && y == 2 && z == 2 {
///                 continue;
///             }
///             grid.set(x, y, z, Occupancy::Boundary).unwrap();
///         }
///     }
/// }
///
/// classify_interior(&mut grid).unwrap();
/// assert_eq!(grid.get(2, 2, 2).unwrap(), Occupancy::Inside);
/// assert_eq!(grid.get(0, 0, 0).unwrap(), Occupancy::Outside);
/// ```
pub fn classify_interior(grid: &mut OccupancyGrid) -> GridResult<FloodFillStats> {
    let meta = *grid.meta();
    let [nx, ny, nz] = meta.dims();
    let cell_count = meta.cell_count();
    let (nx, ny, nz) = (nx as usize, ny as usize, nz as usize);

    let mut visited = VisitedSet::new(cell_count);
    let mut queue = RingQueue::new(2 * (nx * ny + ny * nz + nz * nx), cell_count);
    let cells = grid.cells_mut();

    // Seed every non-boundary cell on the six outer faces.
    let mut seeds = 0_usize;
    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                let on_face = x == 0
                    || x == nx - 1
                    || y == 0
                    || y == ny - 1
                    || z == 0
                    || z == nz - 1;
                if !on_face {
                    continue;
                }
                let linear = z * nx * ny + y * nx + x;
                if cells[linear] != Occupancy::Boundary && !visited.get(linear) {
                    visited.set(linear);
                    #[allow(clippy::cast_possible_truncation)]
                    queue.push(linear as u32)?;
                    seeds += 1;
                }
            }
        }
    }
    debug!(seeds, "seeded flood fill from grid faces");

    // 6-connected BFS over linear indices.
    let mut reached = seeds;
    while let Some(linear) = queue.pop() {
        let linear = linear as usize;
        let x = linear % nx;
        let y = (linear / nx) % ny;
        let z = linear / (nx * ny);

        let mut try_visit = |neighbor: usize, queue: &mut RingQueue| -> GridResult<()> {
            if cells[neighbor] != Occupancy::Boundary && !visited.get(neighbor) {
                visited.set(neighbor);
                #[allow(clippy::cast_possible_truncation)]
                queue.push(neighbor as u32)?;
                reached += 1;
            }
            Ok(())
        };

        if x > 0 {
            try_visit(linear - 1, &mut queue)?;
        }
        if x + 1 < nx {
            try_visit(linear + 1, &mut queue)?;
        }
        if y > 0 {
            try_visit(linear - nx, &mut queue)?;
        }
        if y + 1 < ny {
            try_visit(linear + nx, &mut queue)?;
        }
        if z > 0 {
            try_visit(linear - nx * ny, &mut queue)?;
        }
        if z + 1 < nz {
            try_visit(linear + nx * ny, &mut queue)?;
        }
    }

    // Relabel: reachable => outside, enclosed => inside.
    let mut stats = FloodFillStats {
        seeds,
        visited: reached,
        ..FloodFillStats::default()
    };
    for (linear, cell) in cells.iter_mut().enumerate() {
        match *cell {
            Occupancy::Boundary => stats.boundary += 1,
            _ if visited.get(linear) => {
                *cell = Occupancy::Outside;
                stats.outside += 1;
            }
            _ => {
                *cell = Occupancy::Inside;
                stats.inside += 1;
            }
        }
    }

    info!(
        inside = stats.inside,
        outside = stats.outside,
        boundary = stats.boundary,
        "classified grid interior"
    );
    Ok(stats)
}
