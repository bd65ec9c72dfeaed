use crypto_utils::base58::Base58Error;
use std::fmt;
use thiserror::Error;

/// Why a recovery phrase was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MnemonicFault {
    /// Word count is not one of 12, 15, 18, 21 or 24.
    WordCount(usize),
    /// The word at this zero-based position is not in the wordlist.
    UnknownWord(usize),
    Checksum,
}

impl fmt::Display for MnemonicFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MnemonicFault::WordCount(n) => write!(f, "unsupported word count {n}"),
            MnemonicFault::UnknownWord(pos) => write!(f, "word #{} is not in the wordlist", pos + 1),
            MnemonicFault::Checksum => f.write_str("checksum mismatch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("invalid mnemonic strength: {0} bits")]
    InvalidStrength(usize),
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(MnemonicFault),
    #[error("no mnemonic text is associated with this seed")]
    NoMnemonicText,
    #[error("seed must be 64 bytes, got {0}")]
    InvalidSeedLength(usize),
    #[error("derived master key is not a valid scalar")]
    InvalidMasterKey,
    #[error("hardened derivation requires a private key")]
    HardenedRequiresPrivateKey,
    #[error("derived child key is invalid")]
    InvalidChildKey,
    #[error("malformed derivation path: {0}")]
    MalformedPath(String),
    #[error("key pair has no private key")]
    NoPrivateKey,
    #[error("entropy source unavailable")]
    EntropyUnavailable,
    #[error("invalid key data")]
    InvalidKeyData,
    #[error("invalid base58 encoding")]
    InvalidBase58,
    #[error("invalid checksum")]
    InvalidChecksum,
    #[error("invalid length")]
    InvalidLength,
    #[error("unknown extended key version")]
    InvalidVersion,
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<Base58Error> for WalletError {
    fn from(e: Base58Error) -> Self {
        match e {
            Base58Error::InvalidChecksum => WalletError::InvalidChecksum,
            Base58Error::InvalidLength => WalletError::InvalidLength,
            Base58Error::InvalidCharacter(_) => WalletError::InvalidBase58,
        }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
