//! Dense travel-cost matrix.

/// A dense n×n travel-cost matrix stored in row-major order.
///
/// Node 0 is the depot. Costs may be asymmetric but must be finite,
/// non-negative, and zero on the diagonal.
///
/// # Examples
///
/// ```
/// use pdp_gp::distance::CostMatrix;
///
/// let costs = CostMatrix::from_rows(&[
///     vec![0.0, 2.0, 9.0],
///     vec![2.0, 0.0, 6.0],
///     vec![9.0, 6.0, 0.0],
/// ])
/// .expect("valid");
/// assert_eq!(costs.size(), 3);
/// assert_eq!(costs.get(1, 2), 6.0);
/// assert_eq!(costs.route_cost(&[0, 1, 2, 0]), 17.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    data: Vec<f64>,
    size: usize,
}

impl CostMatrix {
    /// Creates a cost matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Creates a cost matrix from a flat row-major grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size` or an
    /// entry is negative, non-finite, or a non-zero diagonal.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        let matrix = Self { data, size };
        matrix.is_well_formed().then_some(matrix)
    }

    /// Creates a cost matrix from nested rows.
    ///
    /// Returns `None` if the rows are ragged or not square, or if an entry
    /// fails the same checks as [`CostMatrix::from_data`].
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Self::from_data(size, rows.iter().flatten().copied().collect())
    }

    fn is_well_formed(&self) -> bool {
        self.data.iter().all(|c| c.is_finite() && *c >= 0.0)
            && (0..self.size).all(|i| self.get(i, i) == 0.0)
    }

    /// Returns the cost of travelling from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the cost of travelling from `from` to `to`.
    pub fn set(&mut self, from: usize, to: usize, cost: f64) {
        self.data[from * self.size + to] = cost;
    }

    /// Number of nodes (depot included) in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Largest single arc cost, `0.0` for an empty matrix.
    pub fn max_entry(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }

    /// Sum of consecutive arc costs along `nodes`.
    pub fn route_cost(&self, nodes: &[usize]) -> f64 {
        nodes.windows(2).map(|w| self.get(w[0], w[1])).sum()
    }

    /// Marginal cost of splicing `node` between `prev` and `next`.
    #[inline]
    pub fn insertion_delta(&self, prev: usize, node: usize, next: usize) -> f64 {
        self.get(prev, node) + self.get(node, next) - self.get(prev, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CostMatrix {
        CostMatrix::from_rows(&[
            vec![0.0, 2.0, 9.0],
            vec![3.0, 0.0, 6.0],
            vec![9.0, 6.0, 0.0],
        ])
        .expect("valid")
    }

    #[test]
    fn test_from_rows() {
        let cm = sample();
        assert_eq!(cm.size(), 3);
        assert_eq!(cm.get(0, 1), 2.0);
        assert_eq!(cm.get(1, 0), 3.0);
    }

    #[test]
    fn test_from_rows_ragged() {
        assert!(CostMatrix::from_rows(&[vec![0.0, 1.0], vec![1.0]]).is_none());
    }

    #[test]
    fn test_from_data_rejects_bad_entries() {
        assert!(CostMatrix::from_data(2, vec![0.0, 1.0, 2.0]).is_none());
        assert!(CostMatrix::from_data(2, vec![0.0, -1.0, 1.0, 0.0]).is_none());
        assert!(CostMatrix::from_data(2, vec![1.0, 1.0, 1.0, 0.0]).is_none());
        assert!(CostMatrix::from_data(2, vec![0.0, f64::NAN, 1.0, 0.0]).is_none());
    }

    #[test]
    fn test_symmetry() {
        assert!(!sample().is_symmetric(1e-10));
        let mut cm = sample();
        cm.set(1, 0, 2.0);
        assert!(cm.is_symmetric(1e-10));
    }

    #[test]
    fn test_max_entry() {
        assert_eq!(sample().max_entry(), 9.0);
        assert_eq!(CostMatrix::new(0).max_entry(), 0.0);
    }

    #[test]
    fn test_route_cost_and_delta() {
        let cm = sample();
        assert!((cm.route_cost(&[0, 1, 2, 0]) - 17.0).abs() < 1e-10);
        assert_eq!(cm.route_cost(&[0, 0]), 0.0);
        // 0 -> 1 -> 0 versus 0 -> 0
        assert!((cm.insertion_delta(0, 1, 0) - 5.0).abs() < 1e-10);
    }
}
