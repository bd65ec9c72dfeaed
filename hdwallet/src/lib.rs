pub mod config;
pub mod derivation;
pub mod entropy;
pub mod error;
pub mod extended_key;
pub mod key_tree;
pub mod keypair;
pub mod mnemonic;

pub use config::WalletConfig;
pub use derivation::{DerivationPath, PathSegment, PathTemplate};
pub use entropy::EntropySource;
pub use error::{MnemonicFault, Result, WalletError};
pub use extended_key::{ExtendedKey, Network};
pub use key_tree::{KeyTree, SiblingDeriver};
pub use keypair::KeyPair;
pub use mnemonic::{Mnemonic, Seed, seed_from_phrase};
