//! BIP39 recovery phrases and the seeds derived from them.
//!
//! Entropy of 128 to 256 bits (in 32-bit steps) is extended with the first
//! `ENT / 32` bits of its SHA-256 and cut into 11-bit groups, each naming a
//! word of the English list. The seed is
//! `PBKDF2-HMAC-SHA512(NFKD(phrase), "mnemonic" + NFKD(passphrase), 2048)`.

use crate::entropy::{EntropySource, OsRng};
use crate::error::{MnemonicFault, Result, WalletError};
use bip39::Language;
use crypto_utils::{hash::sha256, kdf::pbkdf2_hmac_sha512};
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

pub const SEED_LEN: usize = 64;

/// Entropy sizes accepted by [`Mnemonic::generate`], in bits.
pub const STRENGTHS: [usize; 5] = [128, 160, 192, 224, 256];

/// Phrase lengths matching [`STRENGTHS`].
pub const WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

const PBKDF2_ROUNDS: u32 = 2048;
const SALT_PREFIX: &str = "mnemonic";
const BITS_PER_WORD: usize = 11;

/// 64-byte BIP39 seed. Wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Seed(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SEED_LEN] = bytes
            .try_into()
            .map_err(|_| WalletError::InvalidSeedLength(bytes.len()))?;
        Ok(Seed(arr))
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

/// A recovery phrase, a seed, or both.
///
/// Mnemonics built by [`Mnemonic::generate`] or [`Mnemonic::from_entropy`]
/// carry no seed until [`Mnemonic::with_passphrase`] is called. Mnemonics
/// built by [`Mnemonic::from_seed`] carry no phrase, and every accessor
/// that needs one fails with [`WalletError::NoMnemonicText`].
#[derive(Clone)]
pub struct Mnemonic {
    phrase: Option<Zeroizing<String>>,
    seed: Option<Seed>,
}

impl Mnemonic {
    /// Fresh phrase of `strength` bits drawn from the OS generator.
    pub fn generate(strength: usize) -> Result<Self> {
        Self::generate_with(&mut OsRng, strength)
    }

    pub fn generate_with<S: EntropySource + ?Sized>(source: &mut S, strength: usize) -> Result<Self> {
        check_strength(strength)?;
        let mut entropy = Zeroizing::new(vec![0u8; strength / 8]);
        source.fill_entropy(&mut entropy)?;
        log::debug!("generated {strength}-bit mnemonic entropy");
        Self::from_entropy(&entropy)
    }

    pub fn from_entropy(entropy: &[u8]) -> Result<Self> {
        let strength = entropy.len() * 8;
        check_strength(strength)?;

        // Checksum is at most 8 bits, so the first hash byte covers it.
        let checksum = sha256(entropy)[0];
        let word_count = (strength + strength / 32) / BITS_PER_WORD;
        let list = Language::English.word_list();

        let mut phrase = Zeroizing::new(String::with_capacity(word_count * 9));
        for w in 0..word_count {
            let index = (0..BITS_PER_WORD).fold(0usize, |acc, b| {
                (acc << 1) | bit_at(entropy, checksum, w * BITS_PER_WORD + b) as usize
            });
            if w > 0 {
                phrase.push(' ');
            }
            phrase.push_str(list[index]);
        }

        Ok(Mnemonic {
            phrase: Some(phrase),
            seed: None,
        })
    }

    /// Validates `phrase` and derives its seed under `passphrase`.
    pub fn from_phrase(phrase: &str, passphrase: &str) -> Result<Self> {
        let normalized = checked_phrase(phrase)?;
        let seed = derive_seed(&normalized, passphrase);
        Ok(Mnemonic {
            phrase: Some(normalized),
            seed: Some(seed),
        })
    }

    /// Wraps a precomputed seed. No phrase is attached.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        Ok(Mnemonic {
            phrase: None,
            seed: Some(Seed::from_slice(seed)?),
        })
    }

    /// Attaches the seed for `passphrase`, replacing any earlier one.
    pub fn with_passphrase(mut self, passphrase: &str) -> Result<Self> {
        let seed = self.to_seed(passphrase)?;
        self.seed = Some(seed);
        Ok(self)
    }

    pub fn to_seed(&self, passphrase: &str) -> Result<Seed> {
        Ok(derive_seed(self.phrase()?, passphrase))
    }

    pub fn seed(&self) -> Option<&Seed> {
        self.seed.as_ref()
    }

    pub fn phrase(&self) -> Result<&str> {
        self.phrase
            .as_deref()
            .map(String::as_str)
            .ok_or(WalletError::NoMnemonicText)
    }

    pub fn words(&self) -> Result<Vec<&str>> {
        Ok(self.phrase()?.split_whitespace().collect())
    }

    pub fn word_count(&self) -> Result<usize> {
        Ok(self.phrase()?.split_whitespace().count())
    }

    /// The entropy the phrase encodes, without its checksum.
    pub fn entropy(&self) -> Result<Zeroizing<Vec<u8>>> {
        decode_entropy(&self.words()?)
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("words", &self.word_count().ok())
            .field("has_seed", &self.seed.is_some())
            .finish()
    }
}

/// Checks word count, wordlist membership and checksum of `phrase`.
pub fn validate(phrase: &str) -> Result<()> {
    let normalized = normalize_phrase(phrase);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    decode_entropy(&words).map(drop)
}

/// Validates `phrase` and returns its seed under `passphrase`.
pub fn seed_from_phrase(phrase: &str, passphrase: &str) -> Result<Seed> {
    let normalized = checked_phrase(phrase)?;
    Ok(derive_seed(&normalized, passphrase))
}

pub fn is_valid(phrase: &str) -> bool {
    validate(phrase).is_ok()
}

/// Zero-based positions of the entries that are not wordlist words.
pub fn find_invalid_words<S: AsRef<str>>(words: &[S]) -> Vec<usize> {
    words
        .iter()
        .enumerate()
        .filter(|(_, w)| {
            let word: String = w.as_ref().trim().nfkd().collect();
            Language::English.find_word(&word).is_none()
        })
        .map(|(i, _)| i)
        .collect()
}

fn check_strength(strength: usize) -> Result<()> {
    if STRENGTHS.contains(&strength) {
        Ok(())
    } else {
        Err(WalletError::InvalidStrength(strength))
    }
}

/// Bit `pos` of `entropy || checksum`, most significant first.
fn bit_at(entropy: &[u8], checksum: u8, pos: usize) -> bool {
    let ent_bits = entropy.len() * 8;
    let (byte, offset) = if pos < ent_bits {
        (entropy[pos / 8], pos % 8)
    } else {
        (checksum, pos - ent_bits)
    };
    (byte >> (7 - offset)) & 1 == 1
}

/// Normalized `phrase`, or the reason it is not a valid mnemonic.
fn checked_phrase(phrase: &str) -> Result<Zeroizing<String>> {
    let normalized = normalize_phrase(phrase);
    let checked = {
        let words: Vec<&str> = normalized.split_whitespace().collect();
        decode_entropy(&words)
    };
    if let Err(e) = checked {
        log::warn!("rejected recovery phrase: {e}");
        return Err(e);
    }
    Ok(normalized)
}

/// NFKD form of the phrase with words joined by single spaces.
fn normalize_phrase(phrase: &str) -> Zeroizing<String> {
    let nfkd: Zeroizing<String> = Zeroizing::new(phrase.nfkd().collect());
    let mut out = Zeroizing::new(String::with_capacity(nfkd.len()));
    for (i, word) in nfkd.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

fn decode_entropy(words: &[&str]) -> Result<Zeroizing<Vec<u8>>> {
    let count = words.len();
    if !WORD_COUNTS.contains(&count) {
        return Err(WalletError::InvalidMnemonic(MnemonicFault::WordCount(count)));
    }

    let total_bits = count * BITS_PER_WORD;
    let cs_bits = total_bits / 33;
    let ent_bits = total_bits - cs_bits;

    let mut entropy = Zeroizing::new(vec![0u8; ent_bits / 8]);
    let mut checksum = 0u8;
    for (position, word) in words.iter().enumerate() {
        let index = Language::English
            .find_word(word)
            .ok_or(WalletError::InvalidMnemonic(MnemonicFault::UnknownWord(position)))?;
        for b in 0..BITS_PER_WORD {
            if (index >> (BITS_PER_WORD - 1 - b)) & 1 == 0 {
                continue;
            }
            let pos = position * BITS_PER_WORD + b;
            if pos < ent_bits {
                entropy[pos / 8] |= 0x80 >> (pos % 8);
            } else {
                checksum |= 0x80 >> (pos - ent_bits);
            }
        }
    }

    let mask = !u8::MAX.checked_shr(cs_bits as u32).unwrap_or(0);
    if sha256(&entropy)[0] & mask != checksum {
        return Err(WalletError::InvalidMnemonic(MnemonicFault::Checksum));
    }
    Ok(entropy)
}

fn derive_seed(normalized_phrase: &str, passphrase: &str) -> Seed {
    let mut salt = Zeroizing::new(String::from(SALT_PREFIX));
    salt.extend(passphrase.nfkd());
    let mut out = [0u8; SEED_LEN];
    pbkdf2_hmac_sha512(
        normalized_phrase.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ROUNDS,
        &mut out,
    );
    let seed = Seed(out);
    out.zeroize();
    seed
}
