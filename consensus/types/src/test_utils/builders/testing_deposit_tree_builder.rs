use crate::*;
use merkle_proof::{MerkleTree, MerkleTreeError};
use tree_hash::TreeHash;

/// Mirrors the deposit contract: an append-only Merkle tree over `DepositData` roots.
///
/// Produces `Deposit`s with valid proofs and the `Eth1Data` that commits to them.
///
/// This struct should **never be used for production purposes.**
pub struct TestingDepositTreeBuilder {
    tree: MerkleTree,
    data: Vec<DepositData>,
    depth: usize,
}

impl TestingDepositTreeBuilder {
    pub fn new(spec: &ChainSpec) -> Self {
        let depth = spec.deposit_contract_tree_depth as usize;
        Self {
            tree: MerkleTree::create(&[], depth),
            data: vec![],
            depth,
        }
    }

    /// Append `data` as the next leaf of the tree.
    pub fn push(&mut self, data: DepositData) -> Result<(), MerkleTreeError> {
        self.tree.push_leaf(data.tree_hash_root(), self.depth)?;
        self.data.push(data);
        Ok(())
    }

    /// The number of deposits in the tree.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn root(&self) -> Hash256 {
        self.tree.hash()
    }

    /// `Eth1Data` voting for the current contents of the tree.
    pub fn eth1_data(&self) -> Eth1Data {
        Eth1Data {
            deposit_root: self.root(),
            deposit_count: self.len() as u64,
            block_hash: Hash256::repeat_byte(0x42),
        }
    }

    /// The deposit at `index`, with a proof against the current root.
    pub fn deposit(&self, index: usize) -> Result<Deposit, MerkleTreeError> {
        let data = self.data.get(index).ok_or(MerkleTreeError::Invalid)?.clone();
        let (_, proof) = self.tree.generate_proof(index, self.depth)?;
        Ok(Deposit {
            proof,
            index: index as u64,
            data,
        })
    }

    /// The deposits at each of `indices`, in the order given.
    pub fn deposits<I: IntoIterator<Item = usize>>(
        &self,
        indices: I,
    ) -> Result<Vec<Deposit>, MerkleTreeError> {
        indices.into_iter().map(|i| self.deposit(i)).collect()
    }
}
