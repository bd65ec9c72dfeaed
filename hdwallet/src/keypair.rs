use crate::entropy::{EntropySource, OsRng};
use crate::error::{Result, WalletError};
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

pub const PRIVATE_KEY_LEN: usize = 32;
pub const PUBLIC_KEY_LEN: usize = 33;

/// A secp256k1 private scalar and compressed public point, or the point
/// alone. Equality and ordering are over the raw bytes.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPair {
    private_key: Option<[u8; PRIVATE_KEY_LEN]>,
    public_key: [u8; PUBLIC_KEY_LEN],
}

impl KeyPair {
    pub(crate) fn from_parts(secret: Option<&SecretKey>, public: &PublicKey) -> Self {
        KeyPair {
            private_key: secret.map(SecretKey::secret_bytes),
            public_key: public.serialize(),
        }
    }

    pub fn from_private_key(bytes: &[u8]) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| WalletError::InvalidKeyData)?;
        let public = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret);
        Ok(Self::from_parts(Some(&secret), &public))
    }

    /// Public-only pair. Accepts compressed or uncompressed SEC1 points.
    pub fn from_public_key(bytes: &[u8]) -> Result<Self> {
        let public = PublicKey::from_slice(bytes).map_err(|_| WalletError::InvalidKeyData)?;
        Ok(Self::from_parts(None, &public))
    }

    pub fn from_private_key_hex(s: &str) -> Result<Self> {
        let bytes = Zeroizing::new(hex::decode(s.trim()).map_err(|_| WalletError::InvalidHex)?);
        Self::from_private_key(&bytes)
    }

    pub fn from_public_key_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim()).map_err(|_| WalletError::InvalidHex)?;
        Self::from_public_key(&bytes)
    }

    /// Random pair from the OS generator.
    pub fn generate() -> Result<Self> {
        Self::generate_with(&mut OsRng)
    }

    pub fn generate_with<S: EntropySource + ?Sized>(source: &mut S) -> Result<Self> {
        let mut bytes = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
        source.fill_entropy(&mut bytes[..])?;
        Self::from_private_key(&bytes[..])
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn private_key_data(&self) -> Result<&[u8; PRIVATE_KEY_LEN]> {
        self.private_key.as_ref().ok_or(WalletError::NoPrivateKey)
    }

    pub fn public_key_data(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    /// Lowercase hex of the private scalar.
    pub fn private_key(&self) -> Result<Zeroizing<String>> {
        Ok(Zeroizing::new(hex::encode(self.private_key_data()?)))
    }

    /// Lowercase hex of the compressed public point.
    pub fn public_key(&self) -> String {
        hex::encode(self.public_key)
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let private = if self.private_key.is_some() { "<redacted>" } else { "<none>" };
        f.debug_struct("KeyPair")
            .field("private_key", &private)
            .field("public_key", &self.public_key())
            .finish()
    }
}
