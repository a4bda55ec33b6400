//! Tree nodes and the bottom-up tree builder.

use serde::Serialize;
use tamperline_types::Digest;

/// One node of the ledger tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    /// Digest of this node.
    pub digest: Digest,
    /// Level in the tree; leaves are level 0.
    pub level: usize,
    /// Position within its level, left to right.
    pub index: usize,
    /// Leaf or internal.
    pub kind: NodeKind,
}

/// What a node covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Wraps the leaf digest of event `event`.
    Leaf { event: usize },
    /// Digest of two children, given as node-array indices.
    ///
    /// `left == right` when an odd last node was paired with itself.
    Internal { left: usize, right: usize },
}

impl TreeNode {
    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}

/// Full node array plus the offset of each level within it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Tree {
    pub(crate) nodes: Vec<TreeNode>,
    /// `offsets[l]` is the node-array index of the first node on level `l`.
    pub(crate) offsets: Vec<usize>,
}

impl Tree {
    /// Build the unique tree over `leaves`.
    ///
    /// Level 0 holds the leaves. Each following level pairs adjacent nodes
    /// left to right, repeating the last node when the level has odd length,
    /// until one node remains.
    pub(crate) fn build(leaves: &[Digest]) -> Self {
        if leaves.is_empty() {
            return Self::default();
        }

        let mut nodes: Vec<TreeNode> = leaves
            .iter()
            .enumerate()
            .map(|(i, digest)| TreeNode {
                digest: *digest,
                level: 0,
                index: i,
                kind: NodeKind::Leaf { event: i },
            })
            .collect();
        let mut offsets = vec![0];

        let mut level_start = 0;
        let mut level_len = leaves.len();
        let mut level = 0;

        while level_len > 1 {
            level += 1;
            let next_start = nodes.len();
            offsets.push(next_start);

            for (index, pair_start) in (0..level_len).step_by(2).enumerate() {
                let left = level_start + pair_start;
                let right = if pair_start + 1 < level_len {
                    left + 1
                } else {
                    left
                };
                let digest = Digest::combine(&nodes[left].digest, &nodes[right].digest);
                nodes.push(TreeNode {
                    digest,
                    level,
                    index,
                    kind: NodeKind::Internal { left, right },
                });
            }

            level_start = next_start;
            level_len = nodes.len() - next_start;
        }

        Self { nodes, offsets }
    }

    /// Digest of the single top node, `None` for an empty tree.
    pub(crate) fn root(&self) -> Option<Digest> {
        // The top node is always pushed last.
        self.nodes.last().map(|n| n.digest)
    }

    /// Node-array indices from leaf `leaf` up to the root, inclusive.
    ///
    /// Caller guarantees `leaf` is in range.
    pub(crate) fn path_from_leaf(&self, leaf: usize) -> Vec<usize> {
        let mut path = Vec::with_capacity(self.offsets.len());
        let mut position = leaf;
        for &offset in &self.offsets {
            path.push(offset + position);
            position /= 2;
        }
        path
    }

    /// Node slices per level, leaves first.
    pub(crate) fn levels(&self) -> Vec<&[TreeNode]> {
        self.offsets
            .iter()
            .enumerate()
            .map(|(l, &start)| {
                let end = self.offsets.get(l + 1).copied().unwrap_or(self.nodes.len());
                &self.nodes[start..end]
            })
            .collect()
    }
}
