//! Keccak-256 Merkle tree committing to a set of airdrop items.
//!
//! Construction rules:
//! - Items are sorted (address, then value) before hashing, so the root does
//!   not depend on input order.
//! - Adjacent nodes are paired `(0, 1), (2, 3), ...` and combined with
//!   [`compute_parent_hash`], which is symmetric.
//! - An odd node at the end of a layer is carried up unchanged. It is neither
//!   duplicated nor rehashed, and contributes nothing to proofs at that layer.
//!
//! Nodes live in a single arena owned by the tree; parent and child links are
//! indices into it. A second map from leaf hash to leaf index gives O(1)
//! membership checks and proof starts.

use std::collections::HashMap;

use crate::error::TreeError;
use crate::hasher::{compute_leaf_hash, compute_parent_hash};
use crate::types::{Hash256, Item};

/// Index of a node inside a tree's arena.
pub type NodeIndex = usize;

/// One node of the tree. Leaves have no children, internal nodes have two.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub hash: Hash256,
    pub parent: Option<NodeIndex>,
    pub children: Option<(NodeIndex, NodeIndex)>,
}

impl Node {
    fn leaf(hash: Hash256) -> Self {
        Self {
            hash,
            parent: None,
            children: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Immutable Merkle tree over a sorted item set.
///
/// `nodes[..items.len()]` are the leaves, in item order. Every other node is
/// internal and was appended while reducing layers, so the root is always the
/// last node pushed (or the only leaf).
#[derive(Clone, Debug)]
pub struct MerkleTree {
    nodes: Vec<Node>,
    items: Vec<Item>,
    root: NodeIndex,
    leaf_index: HashMap<Hash256, NodeIndex>,
}

impl MerkleTree {
    /// Build a tree from any collection of items.
    ///
    /// Exact duplicates collapse into a single leaf. Fails with
    /// [`TreeError::EmptyTree`] when there is nothing to commit to.
    pub fn build<I>(items: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = Item>,
    {
        let mut items: Vec<Item> = items.into_iter().collect();
        if items.is_empty() {
            return Err(TreeError::EmptyTree);
        }
        items.sort_unstable();
        items.dedup();

        let mut nodes: Vec<Node> = Vec::with_capacity(2 * items.len() - 1);
        let mut leaf_index = HashMap::with_capacity(items.len());
        for item in &items {
            let hash = compute_leaf_hash(item);
            leaf_index.insert(hash, nodes.len());
            nodes.push(Node::leaf(hash));
        }

        let mut layer: Vec<NodeIndex> = (0..nodes.len()).collect();
        while layer.len() > 1 {
            layer = reduce_layer(&mut nodes, &layer);
        }

        Ok(Self {
            root: layer[0],
            nodes,
            items,
            leaf_index,
        })
    }

    /// The root digest committing to the whole item set.
    pub fn root(&self) -> Hash256 {
        self.nodes[self.root].hash
    }

    /// The root node.
    pub fn root_node(&self) -> &Node {
        &self.nodes[self.root]
    }

    /// Leaf nodes in sorted item order.
    pub fn leaves(&self) -> &[Node] {
        &self.nodes[..self.items.len()]
    }

    /// Committed items in sorted order, parallel to [`leaves`](Self::leaves).
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.items.len()
    }

    /// Look up a node by arena index.
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Position of an item among the sorted leaves, if committed.
    pub fn position(&self, item: &Item) -> Option<usize> {
        self.leaf_index.get(&compute_leaf_hash(item)).copied()
    }

    /// Whether the item is committed by this tree.
    pub fn contains(&self, item: &Item) -> bool {
        self.position(item).is_some()
    }

    /// Sibling path from the item's leaf up to the root.
    ///
    /// Only levels where the node actually had a sibling contribute an entry,
    /// so the proof can be shorter than the tree height.
    pub fn proof(&self, item: &Item) -> Result<Vec<Hash256>, TreeError> {
        let mut current = self
            .position(item)
            .ok_or_else(|| TreeError::ItemNotInTree {
                address: item.address.to_string(),
                value: item.value.to_string(),
            })?;

        let mut path = Vec::new();
        while let Some(parent) = self.nodes[current].parent {
            let sibling = match self.nodes[parent].children {
                Some((left, right)) if left == current => right,
                Some((left, right)) if right == current => left,
                _ => {
                    return Err(TreeError::InvariantViolation(format!(
                        "node {current} is not a child of its parent {parent}"
                    )));
                }
            };
            path.push(self.nodes[sibling].hash);
            current = parent;
        }

        if current != self.root {
            return Err(TreeError::InvariantViolation(format!(
                "walk from leaf ended at node {current}, root is {}",
                self.root
            )));
        }
        Ok(path)
    }
}

/// Reduce one layer to the next, appending new parents to the arena.
fn reduce_layer(nodes: &mut Vec<Node>, layer: &[NodeIndex]) -> Vec<NodeIndex> {
    let mut next = Vec::with_capacity(layer.len().div_ceil(2));
    for pair in layer.chunks(2) {
        match *pair {
            [left, right] => {
                let parent = nodes.len();
                let hash = compute_parent_hash(&nodes[left].hash, &nodes[right].hash);
                nodes.push(Node {
                    hash,
                    parent: None,
                    children: Some((left, right)),
                });
                nodes[left].parent = Some(parent);
                nodes[right].parent = Some(parent);
                next.push(parent);
            }
            // Odd node out: carried up as-is.
            [single] => next.push(single),
            _ => unreachable!("chunks(2) yields one or two elements"),
        }
    }
    next
}

/// Build a tree over `items`. See [`MerkleTree::build`].
pub fn build_tree<I>(items: I) -> Result<MerkleTree, TreeError>
where
    I: IntoIterator<Item = Item>,
{
    MerkleTree::build(items)
}

/// Compute only the root of the tree over `items`.
pub fn compute_merkle_root<I>(items: I) -> Result<Hash256, TreeError>
where
    I: IntoIterator<Item = Item>,
{
    Ok(MerkleTree::build(items)?.root())
}

/// Proof for `item` in `tree`. Fails with [`TreeError::ItemNotInTree`] when
/// the item is not committed.
pub fn create_proof(item: &Item, tree: &MerkleTree) -> Result<Vec<Hash256>, TreeError> {
    tree.proof(item)
}

/// Recompute the root from `item` and `proof` and compare with `root`.
pub fn validate_proof(item: &Item, proof: &[Hash256], root: &Hash256) -> bool {
    let computed = proof
        .iter()
        .fold(compute_leaf_hash(item), |acc, sibling| {
            compute_parent_hash(&acc, sibling)
        });
    computed == *root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, Value};
    use proptest::prelude::*;

    fn item(byte: u8, value: u64) -> Item {
        Item::new(Address([byte; 20]), Value::from(value))
    }

    fn tree_data() -> Vec<Item> {
        vec![
            item(0xAA, 1),
            item(0xBB, 2),
            item(0xCC, 3),
            item(0xDD, 4),
            item(0xEE, 5),
        ]
    }

    fn other_data() -> Vec<Item> {
        vec![item(0xFF, 6), item(0x00, 7)]
    }

    // --- construction ---

    #[test]
    fn empty_input_rejected() {
        assert_eq!(build_tree(Vec::<Item>::new()).unwrap_err(), TreeError::EmptyTree);
    }

    #[test]
    fn single_item_root_is_leaf_hash() {
        let a = item(0xAA, 1);
        let tree = build_tree([a]).unwrap();
        assert_eq!(tree.root(), compute_leaf_hash(&a));
        assert!(tree.root_node().is_leaf());
        assert!(tree.proof(&a).unwrap().is_empty());
    }

    #[test]
    fn two_items() {
        let (a, b) = (item(0xAA, 1), item(0xBB, 2));
        let tree = build_tree([a, b]).unwrap();
        let expected = compute_parent_hash(&compute_leaf_hash(&a), &compute_leaf_hash(&b));
        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn three_items_carry_last_node_up() {
        let (a, b, c) = (item(0x01, 1), item(0x02, 2), item(0x03, 3));
        let tree = build_tree([c, a, b]).unwrap();
        // Layer 0: [la, lb, lc]
        // Layer 1: [p(la, lb), lc]  -- lc carried, not duplicated
        // Layer 2: [p(p(la, lb), lc)]
        let (la, lb, lc) = (
            compute_leaf_hash(&a),
            compute_leaf_hash(&b),
            compute_leaf_hash(&c),
        );
        let expected = compute_parent_hash(&compute_parent_hash(&la, &lb), &lc);
        assert_eq!(tree.root(), expected);
        assert_eq!(tree.proof(&c).unwrap(), vec![compute_parent_hash(&la, &lb)]);
    }

    #[test]
    fn five_items_structure() {
        let items = tree_data();
        let tree = build_tree(items.clone()).unwrap();
        let l: Vec<Hash256> = items.iter().map(compute_leaf_hash).collect();
        let p01 = compute_parent_hash(&l[0], &l[1]);
        let p23 = compute_parent_hash(&l[2], &l[3]);
        let p0123 = compute_parent_hash(&p01, &p23);
        assert_eq!(tree.root(), compute_parent_hash(&p0123, &l[4]));

        assert_eq!(tree.proof(&items[0]).unwrap(), vec![l[1], p23, l[4]]);
        // The fifth leaf is carried up twice and only pairs at the top.
        assert_eq!(tree.proof(&items[4]).unwrap(), vec![p0123]);
    }

    #[test]
    fn internal_hashes_match_children() {
        let tree = build_tree((0..11).map(|i| item(i, i as u64))).unwrap();
        let mut internal = 0;
        for index in 0.. {
            let Some(node) = tree.node(index) else { break };
            if let Some((l, r)) = node.children {
                internal += 1;
                let (l, r) = (tree.node(l).unwrap(), tree.node(r).unwrap());
                assert_eq!(node.hash, compute_parent_hash(&l.hash, &r.hash));
                assert_eq!(l.parent, Some(index));
                assert_eq!(r.parent, Some(index));
            }
        }
        // A binary tree with n leaves and carry-ups still has n - 1 internal nodes.
        assert_eq!(internal, 10);
        assert_eq!(tree.root_node().parent, None);
    }

    #[test]
    fn leaves_sorted_and_complete() {
        let mut items = tree_data();
        items.reverse();
        let tree = build_tree(items.clone()).unwrap();
        items.sort();
        assert_eq!(tree.items(), items.as_slice());
        let hashes: Vec<Hash256> = tree.leaves().iter().map(|n| n.hash).collect();
        let expected: Vec<Hash256> = items.iter().map(compute_leaf_hash).collect();
        assert_eq!(hashes, expected);
    }

    #[test]
    fn duplicate_items_collapse() {
        let a = item(0xAA, 1);
        let tree = build_tree([a, a, item(0xBB, 2)]).unwrap();
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn tree_is_sorted() {
        let items = tree_data();
        let reversed: Vec<Item> = items.iter().rev().copied().collect();
        assert_eq!(
            compute_merkle_root(items).unwrap(),
            compute_merkle_root(reversed).unwrap()
        );
    }

    // --- membership ---

    #[test]
    fn in_tree() {
        let tree = build_tree(tree_data()).unwrap();
        assert!(tree_data().iter().all(|i| tree.contains(i)));
    }

    #[test]
    fn not_in_tree() {
        let tree = build_tree(tree_data()).unwrap();
        assert!(!other_data().iter().any(|i| tree.contains(i)));
        // Right address, wrong value.
        assert!(!tree.contains(&item(0xAA, 2)));
    }

    #[test]
    fn proof_for_missing_item_is_an_error() {
        let tree = build_tree(tree_data()).unwrap();
        assert!(matches!(
            create_proof(&other_data()[0], &tree),
            Err(TreeError::ItemNotInTree { .. })
        ));
    }

    // --- proofs ---

    #[test]
    fn valid_proofs() {
        let tree = build_tree(tree_data()).unwrap();
        for i in tree_data() {
            let proof = create_proof(&i, &tree).unwrap();
            assert!(validate_proof(&i, &proof, &tree.root()), "proof failed for {i}");
        }
    }

    #[test]
    fn empty_proof_is_invalid() {
        let tree = build_tree(tree_data()).unwrap();
        assert!(!validate_proof(&tree_data()[0], &[], &tree.root()));
    }

    #[test]
    fn wrong_proof() {
        let tree = build_tree(tree_data()).unwrap();
        let proof_4 = create_proof(&tree_data()[4], &tree).unwrap();
        assert!(!validate_proof(&tree_data()[0], &proof_4, &tree.root()));
    }

    #[test]
    fn wrong_value() {
        let tree = build_tree(tree_data()).unwrap();
        let proof_0 = create_proof(&tree_data()[0], &tree).unwrap();
        assert!(!validate_proof(&other_data()[0], &proof_0, &tree.root()));
        assert!(!validate_proof(&item(0xAA, 2), &proof_0, &tree.root()));
    }

    #[test]
    fn proof_from_different_tree_fails() {
        let tree_a = build_tree([item(1, 1), item(2, 2)]).unwrap();
        let tree_b = build_tree([item(3, 3), item(4, 4)]).unwrap();
        let proof = tree_a.proof(&item(1, 1)).unwrap();
        assert!(!validate_proof(&item(1, 1), &proof, &tree_b.root()));
    }

    #[test]
    fn proof_length_bounded_by_height() {
        for n in 1..=40u8 {
            let items: Vec<Item> = (0..n).map(|i| item(i, 1)).collect();
            let tree = build_tree(items.clone()).unwrap();
            let bound = (n as usize).next_power_of_two().trailing_zeros() as usize;
            for i in &items {
                let proof = tree.proof(i).unwrap();
                assert!(proof.len() <= bound, "n={n}: {} > {bound}", proof.len());
                assert!(validate_proof(i, &proof, &tree.root()));
            }
        }
    }

    #[test]
    fn power_of_two_proofs_are_full_height() {
        let items: Vec<Item> = (0..8).map(|i| item(i, 1)).collect();
        let tree = build_tree(items.clone()).unwrap();
        assert!(items.iter().all(|i| tree.proof(i).unwrap().len() == 3));
    }

    proptest! {
        #[test]
        fn every_member_validates(
            entries in proptest::collection::btree_map(any::<[u8; 20]>(), any::<u64>(), 1..64)
        ) {
            let items: Vec<Item> = entries
                .into_iter()
                .map(|(a, v)| Item::new(Address(a), Value::from(v)))
                .collect();
            let tree = build_tree(items.clone()).unwrap();
            for i in &items {
                let proof = tree.proof(i).unwrap();
                prop_assert!(validate_proof(i, &proof, &tree.root()));
            }
        }

        #[test]
        fn root_independent_of_order(
            entries in proptest::collection::btree_map(any::<[u8; 20]>(), any::<u64>(), 1..32),
            seed in any::<u64>(),
        ) {
            let items: Vec<Item> = entries
                .into_iter()
                .map(|(a, v)| Item::new(Address(a), Value::from(v)))
                .collect();
            let mut shuffled = items.clone();
            // Deterministic rotation plus reversal keyed on the seed.
            let k = (seed as usize) % shuffled.len();
            shuffled.rotate_left(k);
            if seed % 2 == 0 {
                shuffled.reverse();
            }
            prop_assert_eq!(
                compute_merkle_root(items).unwrap(),
                compute_merkle_root(shuffled).unwrap()
            );
        }
    }
}
