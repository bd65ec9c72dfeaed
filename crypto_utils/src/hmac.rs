use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// HMAC-SHA512 split into its left (`IL`) and right (`IR`) 32-byte halves,
/// the shape every BIP32 step consumes.
pub fn hmac_sha512_halves(key: &[u8], data: &[u8]) -> ([u8; 32], [u8; 32]) {
    let full = hmac_sha512(key, data);
    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&full[..32]);
    right.copy_from_slice(&full[32..]);
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    /// Test case 1 from RFC 4231
    #[test]
    fn rfc4231_case1() {
        let key = [0x0b; 20];
        let expected = hex!(
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cde"
            "daa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
        assert_eq!(hmac_sha512(&key, b"Hi There"), expected);
    }

    /// Test case 2 from RFC 4231
    #[test]
    fn rfc4231_case2() {
        let expected = hex!(
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554"
            "9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
        assert_eq!(
            hmac_sha512(b"Jefe", b"what do ya want for nothing?"),
            expected
        );
    }

    #[test]
    fn halves_cover_full_output() {
        let full = hmac_sha512(b"Jefe", b"what do ya want for nothing?");
        let (left, right) = hmac_sha512_halves(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(left, full[..32]);
        assert_eq!(right, full[32..]);
    }

    #[test]
    fn empty_key_and_data() {
        let expected = hex!(
            "b936cee86c9f87aa5d3c6f2e84cb5a4239a5fe50480a6ec66b70ab5b1f4ac673"
            "0c6c515421b327ec1d69402e53dfb49ad7381eb067b338fd7b0cb22247225d47"
        );
        assert_eq!(hmac_sha512(b"", b""), expected);
    }
}
