use crate::derivation::{DerivationPath, PathSegment, PathTemplate};
use crate::error::Result;
use crate::extended_key::ExtendedKey;
use crate::keypair::KeyPair;
use crate::mnemonic::{Seed, seed_from_phrase};
use secp256k1::{All, Secp256k1};
use std::ops::RangeInclusive;

/// Walks derivation paths from a seed.
///
/// Holds only the secp256k1 context; every call is independent, so a
/// `KeyTree` can be shared across threads.
pub struct KeyTree {
    secp: Secp256k1<All>,
}

impl Default for KeyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyTree {
    pub fn new() -> Self {
        KeyTree {
            secp: Secp256k1::new(),
        }
    }

    pub fn master_key(&self, seed: &Seed) -> Result<ExtendedKey> {
        self.master_key_from_bytes(seed.as_bytes())
    }

    /// Fails with `InvalidSeedLength` unless `seed` is 64 bytes.
    pub fn master_key_from_bytes(&self, seed: &[u8]) -> Result<ExtendedKey> {
        ExtendedKey::new_master(&self.secp, seed)
    }

    pub fn derive_child(&self, parent: &ExtendedKey, segment: PathSegment) -> Result<ExtendedKey> {
        parent.derive_child(&self.secp, segment)
    }

    /// Applies `segments` in order, starting below `node`.
    pub fn derive_from(&self, node: &ExtendedKey, segments: &[PathSegment]) -> Result<ExtendedKey> {
        segments
            .iter()
            .try_fold(node.clone(), |key, &segment| key.derive_child(&self.secp, segment))
    }

    /// The node at `path` below the master key of `seed`.
    pub fn derive_at(&self, seed: &Seed, path: &DerivationPath) -> Result<ExtendedKey> {
        log::debug!("deriving {path}");
        let master = self.master_key(seed)?;
        self.derive_from(&master, path.segments())
    }

    pub fn keypair_at(&self, seed: &Seed, path: &DerivationPath) -> Result<KeyPair> {
        Ok(self.derive_at(seed, path)?.to_keypair())
    }

    /// Same as `derive_at(seed, prefix / index)`, where the new segment takes
    /// the hardened flag of the prefix's last segment (normal below "m").
    pub fn sibling_at(&self, seed: &Seed, prefix: &DerivationPath, index: u32) -> Result<ExtendedKey> {
        self.siblings(seed, prefix)?.node_at(index)
    }

    /// Caches the node at `prefix` for repeated [`SiblingDeriver::at`] calls.
    pub fn siblings(&self, seed: &Seed, prefix: &DerivationPath) -> Result<SiblingDeriver<'_>> {
        let hardened = prefix.last().is_some_and(|s| s.is_hardened());
        Ok(SiblingDeriver {
            tree: self,
            parent: self.derive_at(seed, prefix)?,
            hardened,
        })
    }

    /// Caches the template's prefix node; siblings use the template's flag.
    pub fn siblings_for(&self, seed: &Seed, template: &PathTemplate) -> Result<SiblingDeriver<'_>> {
        Ok(SiblingDeriver {
            tree: self,
            parent: self.derive_at(seed, template.prefix())?,
            hardened: template.is_hardened(),
        })
    }

    /// Key pair at `template` / `index` for a recovery phrase.
    pub fn keypair_from_phrase(
        &self,
        phrase: &str,
        passphrase: &str,
        template: &PathTemplate,
        index: u32,
    ) -> Result<KeyPair> {
        let path = template.at(index)?;
        let seed = seed_from_phrase(phrase, passphrase)?;
        self.keypair_at(&seed, &path)
    }

    /// Key pairs for every index in `indices`, sharing one prefix walk.
    pub fn keypairs_from_phrase(
        &self,
        phrase: &str,
        passphrase: &str,
        template: &PathTemplate,
        indices: RangeInclusive<u32>,
    ) -> Result<Vec<KeyPair>> {
        let seed = seed_from_phrase(phrase, passphrase)?;
        self.siblings_for(&seed, template)?.range(indices)
    }
}

/// Children of one cached node, differing only in their last index.
///
/// Owned by the caller that created it for the length of one enumeration.
pub struct SiblingDeriver<'a> {
    tree: &'a KeyTree,
    parent: ExtendedKey,
    hardened: bool,
}

impl SiblingDeriver<'_> {
    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    pub fn node_at(&self, index: u32) -> Result<ExtendedKey> {
        let segment = PathSegment::new(index, self.hardened)?;
        self.tree.derive_child(&self.parent, segment)
    }

    pub fn at(&self, index: u32) -> Result<KeyPair> {
        Ok(self.node_at(index)?.to_keypair())
    }

    /// Stops at the first failing index; no partial result is returned.
    pub fn range(&self, indices: RangeInclusive<u32>) -> Result<Vec<KeyPair>> {
        log::debug!(
            "deriving siblings {}..={} (hardened: {})",
            indices.start(),
            indices.end(),
            self.hardened
        );
        indices.map(|index| self.at(index)).collect()
    }
}
