//! Adjacency and all-pairs shortest distances.

use fixedbitset::FixedBitSet;
use torusnav_macros::profile;

use super::edges::Edge;
use super::types::NodeId;
use crate::game::collections::CompressedRows;

/// Dense row-major node×node distance matrix. Unreachable pairs hold `f32::INFINITY`.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceTable {
    n: usize,
    data: Vec<f32>,
}

impl DistanceTable {
    /// Zero on the diagonal, unreachable everywhere else.
    pub fn unconnected(n: usize) -> Self {
        let mut data = vec![f32::INFINITY; n * n];
        for i in 0..n {
            data[i * n + i] = 0.0;
        }
        Self { n, data }
    }

    pub(super) fn from_raw(n: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), n * n);
        Self { n, data }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, a: NodeId, b: NodeId) -> f32 {
        self.data[a.index() * self.n + b.index()]
    }

    pub fn row(&self, a: NodeId) -> &[f32] {
        let start = a.index() * self.n;
        &self.data[start..start + self.n]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    fn relax(&mut self, a: usize, b: usize, length: f32) {
        let n = self.n;
        if length < self.data[a * n + b] {
            self.data[a * n + b] = length;
            self.data[b * n + a] = length;
        }
    }
}

/// Fold edges into neighbor rows and a direct-edge distance table.
pub(super) fn adjacency(n: usize, edges: &[Edge]) -> (CompressedRows<NodeId>, DistanceTable) {
    let mut rows: Vec<Vec<NodeId>> = vec![Vec::new(); n];
    let mut table = DistanceTable::unconnected(n);

    for edge in edges {
        rows[edge.a.index()].push(edge.b);
        rows[edge.b.index()].push(edge.a);
        table.relax(edge.a.index(), edge.b.index(), edge.length);
    }

    (CompressedRows::from_rows(rows), table)
}

/// All-pairs shortest paths in place.
///
/// Each round only reads row and column `k`, which the round itself cannot
/// change, so a symmetric input stays exactly symmetric.
#[profile]
pub(super) fn floyd_warshall(table: &mut DistanceTable) {
    let n = table.n;
    let data = &mut table.data;
    for k in 0..n {
        for i in 0..n {
            let dik = data[i * n + k];
            if !dik.is_finite() {
                continue;
            }
            for j in 0..n {
                let candidate = dik + data[k * n + j];
                if candidate < data[i * n + j] {
                    data[i * n + j] = candidate;
                }
            }
        }
    }
}

/// Number of connected components of the neighbor graph.
pub(super) fn count_components(neighbors: &CompressedRows<NodeId>) -> usize {
    let n = neighbors.len();
    let mut seen = FixedBitSet::with_capacity(n);
    let mut stack = Vec::new();
    let mut components = 0;

    for root in 0..n {
        if seen.contains(root) {
            continue;
        }
        components += 1;
        seen.insert(root);
        stack.push(root);
        while let Some(node) = stack.pop() {
            for next in neighbors.row(node) {
                if !seen.contains(next.index()) {
                    seen.insert(next.index());
                    stack.push(next.index());
                }
            }
        }
    }

    components
}
