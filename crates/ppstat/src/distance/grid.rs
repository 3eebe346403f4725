//! Uniform bucket grid over a window, used to prune distance searches.
//!
//! The index only changes which candidates are visited; every query returns
//! the same value a brute-force scan would.

use nalgebra::Vector2;

use crate::pattern::Window;

/// Target mean occupancy per cell.
const POINTS_PER_CELL: f64 = 2.0;
/// Cap on cells per axis so tiny cells cannot blow up memory.
const MAX_CELLS_PER_AXIS: usize = 1024;

#[derive(Clone, Debug)]
pub(crate) struct GridIndex<'a> {
    points: &'a [Vector2<f64>],
    window: Window,
    cell: f64,
    nx: usize,
    ny: usize,
    buckets: Vec<Vec<usize>>,
}

impl<'a> GridIndex<'a> {
    /// Cell size chosen for `POINTS_PER_CELL` points on average.
    pub(crate) fn build(points: &'a [Vector2<f64>], window: Window) -> Self {
        let n = points.len().max(1) as f64;
        let cell = (window.area() * POINTS_PER_CELL / n).sqrt();
        Self::with_cell(points, window, cell)
    }

    pub(crate) fn with_cell(points: &'a [Vector2<f64>], window: Window, cell: f64) -> Self {
        let nx = axis_cells(window.width(), cell);
        let ny = axis_cells(window.height(), cell);
        // Rescale so cells tile the window exactly; the larger side decides.
        let cell = (window.width() / nx as f64).max(window.height() / ny as f64);
        let mut grid = Self {
            points,
            window,
            cell,
            nx,
            ny,
            buckets: vec![Vec::new(); nx * ny],
        };
        for (k, p) in points.iter().enumerate() {
            let (cx, cy) = grid.cell_of(*p);
            grid.buckets[cy * nx + cx].push(k);
        }
        grid
    }

    #[inline]
    pub(crate) fn cell_size(&self) -> f64 {
        self.cell
    }

    #[inline]
    fn cell_of(&self, p: Vector2<f64>) -> (usize, usize) {
        let fx = ((p.x - self.window.xmin()) / self.cell).floor();
        let fy = ((p.y - self.window.ymin()) / self.cell).floor();
        let cx = (fx.max(0.0) as usize).min(self.nx - 1);
        let cy = (fy.max(0.0) as usize).min(self.ny - 1);
        (cx, cy)
    }

    /// Indices stored in cells at Chebyshev ring `k` around `(cx, cy)`.
    fn ring(&self, cx: usize, cy: usize, k: usize, mut visit: impl FnMut(usize)) {
        let (cx, cy, k) = (cx as isize, cy as isize, k as isize);
        for dy in -k..=k {
            let y = cy + dy;
            if y < 0 || y >= self.ny as isize {
                continue;
            }
            let on_edge_row = dy.abs() == k;
            let step = if on_edge_row || k == 0 { 1 } else { 2 * k };
            let mut dx = -k;
            while dx <= k {
                let x = cx + dx;
                if x >= 0 && x < self.nx as isize {
                    for &idx in &self.buckets[y as usize * self.nx + x as usize] {
                        visit(idx);
                    }
                }
                dx += step;
            }
        }
    }

    /// Distance from `q` to the closest indexed point other than `skip`.
    ///
    /// `q` must lie inside the window; `None` if no candidate exists.
    pub(crate) fn nearest(&self, q: Vector2<f64>, skip: Option<usize>) -> Option<f64> {
        let (cx, cy) = self.cell_of(q);
        let max_ring = self.nx.max(self.ny);
        let mut best = f64::INFINITY;
        for k in 0..=max_ring {
            self.ring(cx, cy, k, |idx| {
                if Some(idx) != skip {
                    let d = (self.points[idx] - q).norm();
                    if d < best {
                        best = d;
                    }
                }
            });
            // Cells in ring k+1 are at least k cell widths away from q.
            if best <= k as f64 * self.cell {
                break;
            }
        }
        best.is_finite().then_some(best)
    }

    /// Calls `visit(i, j)` for every unordered pair `i < j` in cells within
    /// `reach` rings of each other. Callers filter by exact distance.
    pub(crate) fn for_each_candidate_pair(
        &self,
        reach: usize,
        mut visit: impl FnMut(usize, usize),
    ) {
        let reach = reach.min(self.nx.max(self.ny));
        for (i, p) in self.points.iter().enumerate() {
            let (cx, cy) = self.cell_of(*p);
            for k in 0..=reach {
                self.ring(cx, cy, k, |j| {
                    if j > i {
                        visit(i, j);
                    }
                });
            }
        }
    }
}

#[inline]
fn axis_cells(extent: f64, cell: f64) -> usize {
    if !(cell.is_finite() && cell > 0.0) {
        return 1;
    }
    ((extent / cell).ceil() as usize).clamp(1, MAX_CELLS_PER_AXIS)
}
