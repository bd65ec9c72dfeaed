use crate::error::{Result, WalletError};
use std::fmt;
use std::str::FromStr;

/// Offset added to hardened indices when they enter the derivation function.
pub(crate) const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Suffix of the enumerated segment in a [`PathTemplate`].
const INDEX_PLACEHOLDER: &str = "index";

fn malformed(what: impl fmt::Display) -> WalletError {
    WalletError::MalformedPath(what.to_string())
}

/// One step of a derivation path: a 31-bit index and a hardened flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathSegment {
    index: u32,
    hardened: bool,
}

impl PathSegment {
    pub fn new(index: u32, hardened: bool) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(malformed(format_args!("index {index} is out of range")));
        }
        Ok(PathSegment { index, hardened })
    }

    pub fn normal(index: u32) -> Result<Self> {
        Self::new(index, false)
    }

    pub fn hardened(index: u32) -> Result<Self> {
        Self::new(index, true)
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// The 32-bit value fed to HMAC and written into serialized keys.
    pub(crate) fn effective_index(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_OFFSET
        } else {
            self.index
        }
    }

    pub(crate) fn from_effective_index(raw: u32) -> Self {
        PathSegment {
            index: raw & !HARDENED_OFFSET,
            hardened: raw & HARDENED_OFFSET != 0,
        }
    }
}

impl FromStr for PathSegment {
    type Err = WalletError;

    fn from_str(part: &str) -> Result<Self> {
        let (digits, hardened) = match part.strip_suffix(|c: char| matches!(c, '\'' | 'h' | 'H')) {
            Some(digits) => (digits, true),
            None => (part, false),
        };
        // `u32::from_str` would accept a leading '+'.
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(format_args!("segment {part:?} is not a number")));
        }
        let index: u32 = digits
            .parse()
            .map_err(|_| malformed(format_args!("segment {part:?} is out of range")))?;
        PathSegment::new(index, hardened)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// A BIP-32 derivation path (e.g., "m/44'/313'/0'/0/1").
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<PathSegment>);

impl FromStr for DerivationPath {
    type Err = WalletError;

    /// Parses "m/44'/0'/0'/0/0". Hardened segments take a `'`, `h` or `H`
    /// suffix; a bare "m" is the master path.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(malformed("empty path"));
        }
        let mut parts = s.split('/');
        if parts.next() != Some("m") {
            return Err(malformed(format_args!("{s:?} does not start with \"m\"")));
        }
        parts
            .map(str::parse)
            .collect::<Result<Vec<_>>>()
            .map(DerivationPath)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromIterator<PathSegment> for DerivationPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        DerivationPath(iter.into_iter().collect())
    }
}

impl DerivationPath {
    pub fn master() -> Self {
        DerivationPath(Vec::new())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the master path "m".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<PathSegment> {
        self.0.last().copied()
    }

    /// This path extended by one segment.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment);
        DerivationPath(segments)
    }

    pub fn parent(&self) -> Option<Self> {
        self.0
            .split_last()
            .map(|(_, rest)| DerivationPath(rest.to_vec()))
    }
}

/// A path whose last segment is the literal `index`, e.g.
/// "m/44'/313'/0'/0/index". Filled in with [`PathTemplate::at`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    prefix: DerivationPath,
    hardened: bool,
}

impl PathTemplate {
    pub fn new(prefix: DerivationPath, hardened: bool) -> Self {
        PathTemplate { prefix, hardened }
    }

    pub fn prefix(&self) -> &DerivationPath {
        &self.prefix
    }

    /// Whether the enumerated segment is hardened.
    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    pub fn segment(&self, index: u32) -> Result<PathSegment> {
        PathSegment::new(index, self.hardened)
    }

    pub fn at(&self, index: u32) -> Result<DerivationPath> {
        Ok(self.prefix.child(self.segment(index)?))
    }
}

impl FromStr for PathTemplate {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (prefix, last) = s
            .rsplit_once('/')
            .ok_or_else(|| malformed(format_args!("template {s:?} has no index segment")))?;
        let hardened = match last.strip_prefix(INDEX_PLACEHOLDER) {
            Some("") => false,
            Some("'" | "h" | "H") => true,
            _ => {
                return Err(malformed(format_args!(
                    "template {s:?} must end in \"/{INDEX_PLACEHOLDER}\""
                )));
            }
        };
        Ok(PathTemplate {
            prefix: prefix.parse()?,
            hardened,
        })
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{INDEX_PLACEHOLDER}", self.prefix)?;
        if self.hardened {
            f.write_str("'")?;
        }
        Ok(())
    }
}
