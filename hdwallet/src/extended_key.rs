use crate::derivation::PathSegment;
use crate::error::{Result, WalletError};
use crate::keypair::KeyPair;
use crypto_utils::{
    base58::{base58_check_decode, base58_check_encode},
    hash::hash160,
    hmac::hmac_sha512_halves,
};
use secp256k1::{All, PublicKey, Scalar, Secp256k1, SecretKey};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// HMAC key for master key generation on secp256k1.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

const MASTER_SEED_LEN: usize = 64;
const SERIALIZED_LEN: usize = 78;

// Version bytes for serialization
const VERSION_MAINNET_PRIVATE: [u8; 4] = [0x04, 0x88, 0xAD, 0xE4];
const VERSION_MAINNET_PUBLIC: [u8; 4] = [0x04, 0x88, 0xB2, 0x1E];
const VERSION_TESTNET_PRIVATE: [u8; 4] = [0x04, 0x35, 0x83, 0x94];
const VERSION_TESTNET_PUBLIC: [u8; 4] = [0x04, 0x35, 0x87, 0xCF];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

/// One node of the derivation tree.
///
/// A node always carries its public point; the private scalar is absent for
/// public-only nodes. When present, the point is the scalar times G.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    depth: u8,
    parent_fingerprint: [u8; 4],
    child: PathSegment,
    chain_code: [u8; 32],
    private_key: Option<SecretKey>,
    public_key: PublicKey,
}

impl ExtendedKey {
    /// Master node from a 64-byte seed.
    pub fn new_master(secp: &Secp256k1<All>, seed: &[u8]) -> Result<Self> {
        if seed.len() != MASTER_SEED_LEN {
            return Err(WalletError::InvalidSeedLength(seed.len()));
        }
        let (mut il, chain_code) = hmac_sha512_halves(MASTER_HMAC_KEY, seed);
        let private_key = SecretKey::from_slice(&il);
        il.zeroize();
        let private_key = private_key.map_err(|_| WalletError::InvalidMasterKey)?;

        Ok(ExtendedKey {
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child: PathSegment::from_effective_index(0),
            chain_code,
            public_key: PublicKey::from_secret_key(secp, &private_key),
            private_key: Some(private_key),
        })
    }

    /// Child key derivation (CKDpriv for private nodes, CKDpub otherwise).
    pub fn derive_child(&self, secp: &Secp256k1<All>, segment: PathSegment) -> Result<Self> {
        let depth = self
            .depth
            .checked_add(1)
            .ok_or(WalletError::InvalidChildKey)?;

        // Hardened: 0x00 || privkey (32) || index (4)
        // Normal:   compressed pubkey (33) || index (4)
        let mut data = Zeroizing::new(Vec::with_capacity(1 + 33 + 4));
        if segment.is_hardened() {
            let sk = self
                .private_key
                .as_ref()
                .ok_or(WalletError::HardenedRequiresPrivateKey)?;
            let mut secret = sk.secret_bytes();
            data.push(0u8);
            data.extend_from_slice(&secret);
            secret.zeroize();
        } else {
            data.extend_from_slice(&self.public_key.serialize());
        }
        data.extend_from_slice(&segment.effective_index().to_be_bytes());

        let (mut il, chain_code) = hmac_sha512_halves(&self.chain_code, &data);
        let tweak = Scalar::from_be_bytes(il);
        il.zeroize();
        let tweak = tweak.map_err(|_| WalletError::InvalidChildKey)?;

        // child = parent + IL (mod n), or parent point + IL*G when public-only
        let (private_key, public_key) = match &self.private_key {
            Some(sk) => {
                let child_sk = sk
                    .add_tweak(&tweak)
                    .map_err(|_| WalletError::InvalidChildKey)?;
                (Some(child_sk), PublicKey::from_secret_key(secp, &child_sk))
            }
            None => {
                let child_pk = self
                    .public_key
                    .add_exp_tweak(secp, &tweak)
                    .map_err(|_| WalletError::InvalidChildKey)?;
                (None, child_pk)
            }
        };

        log::trace!("derived child {segment} at depth {depth}");
        Ok(ExtendedKey {
            depth,
            parent_fingerprint: self.fingerprint(),
            child: segment,
            chain_code,
            private_key,
            public_key,
        })
    }

    /// Public-only copy of this node.
    pub fn neuter(&self) -> Self {
        ExtendedKey {
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child: self.child,
            chain_code: self.chain_code,
            private_key: None,
            public_key: self.public_key,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    /// The segment that produced this node; index 0, normal, for the master.
    pub fn child(&self) -> PathSegment {
        self.child
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// First 4 bytes of HASH160 of the compressed public key.
    pub fn fingerprint(&self) -> [u8; 4] {
        let id = hash160(&self.public_key.serialize());
        [id[0], id[1], id[2], id[3]]
    }

    pub fn to_keypair(&self) -> KeyPair {
        KeyPair::from_parts(self.private_key.as_ref(), &self.public_key)
    }

    /// Base58Check xprv/tprv.
    pub fn to_xprv(&self, network: Network) -> Result<Zeroizing<String>> {
        let sk = self.private_key.as_ref().ok_or(WalletError::NoPrivateKey)?;
        let version = match network {
            Network::Mainnet => VERSION_MAINNET_PRIVATE,
            Network::Testnet => VERSION_TESTNET_PRIVATE,
        };
        let mut key_data = Zeroizing::new([0u8; 33]);
        key_data[1..].copy_from_slice(&sk.secret_bytes());
        let payload = self.serialize(version, &key_data);
        Ok(Zeroizing::new(base58_check_encode(&payload)))
    }

    /// Base58Check xpub/tpub.
    pub fn to_xpub(&self, network: Network) -> String {
        let version = match network {
            Network::Mainnet => VERSION_MAINNET_PUBLIC,
            Network::Testnet => VERSION_TESTNET_PUBLIC,
        };
        let payload = self.serialize(version, &self.public_key.serialize());
        base58_check_encode(&payload)
    }

    // version (4) | depth (1) | parent_fp (4) | child_index (4) | chain_code (32) | key_data (33)
    fn serialize(&self, version: [u8; 4], key_data: &[u8; 33]) -> Zeroizing<Vec<u8>> {
        let mut payload = Zeroizing::new(Vec::with_capacity(SERIALIZED_LEN));
        payload.extend_from_slice(&version);
        payload.push(self.depth);
        payload.extend_from_slice(&self.parent_fingerprint);
        payload.extend_from_slice(&self.child.effective_index().to_be_bytes());
        payload.extend_from_slice(&self.chain_code);
        payload.extend_from_slice(key_data);
        payload
    }

    /// Parses an xprv/xpub (or testnet equivalent). Private versions yield a
    /// node with its scalar, public versions a public-only node.
    pub fn from_base58(secp: &Secp256k1<All>, s: &str) -> Result<Self> {
        let data = Zeroizing::new(base58_check_decode(s)?);
        if data.len() != SERIALIZED_LEN {
            return Err(WalletError::InvalidLength);
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&data[0..4]);
        let is_private = match version {
            VERSION_MAINNET_PRIVATE | VERSION_TESTNET_PRIVATE => true,
            VERSION_MAINNET_PUBLIC | VERSION_TESTNET_PUBLIC => false,
            _ => return Err(WalletError::InvalidVersion),
        };

        let depth = data[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);
        let mut index = [0u8; 4];
        index.copy_from_slice(&data[9..13]);
        let child_index = u32::from_be_bytes(index);
        if depth == 0 && (parent_fingerprint != [0u8; 4] || child_index != 0) {
            return Err(WalletError::InvalidChildKey);
        }
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);

        let key_data = &data[45..SERIALIZED_LEN];
        let (private_key, public_key) = if is_private {
            // 0x00 followed by the 32-byte scalar
            if key_data[0] != 0 {
                return Err(WalletError::InvalidKeyData);
            }
            let sk = SecretKey::from_slice(&key_data[1..]).map_err(|_| WalletError::InvalidKeyData)?;
            (Some(sk), PublicKey::from_secret_key(secp, &sk))
        } else {
            let pk = PublicKey::from_slice(key_data).map_err(|_| WalletError::InvalidKeyData)?;
            (None, pk)
        };

        Ok(ExtendedKey {
            depth,
            parent_fingerprint,
            child: PathSegment::from_effective_index(child_index),
            chain_code,
            private_key,
            public_key,
        })
    }
}

impl ExtendedKey {
    /// Overwrites the chain code and private scalar in place.
    fn wipe(&mut self) {
        self.chain_code.zeroize();
        if let Some(sk) = self.private_key.as_mut() {
            sk.non_secure_erase();
        }
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("depth", &self.depth)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .field("child", &self.child)
            .field("has_private_key", &self.private_key.is_some())
            .field("public_key", &hex::encode(self.public_key.serialize()))
            .finish()
    }
}
