use crate::error::{Result, WalletError};
use rand::{CryptoRng, RngCore};

pub use rand::rngs::OsRng;

/// Supplier of cryptographically secure random bytes.
///
/// Every `RngCore + CryptoRng` is a source; [`OsRng`] is the one used when
/// no source is given explicitly.
pub trait EntropySource {
    fn fill_entropy(&mut self, buf: &mut [u8]) -> Result<()>;
}

impl<R: RngCore + CryptoRng> EntropySource for R {
    fn fill_entropy(&mut self, buf: &mut [u8]) -> Result<()> {
        self.try_fill_bytes(buf).map_err(|e| {
            log::error!("entropy source failed: {e}");
            WalletError::EntropyUnavailable
        })
    }
}
