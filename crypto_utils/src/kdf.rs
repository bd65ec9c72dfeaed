use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;

/// PBKDF2 with HMAC-SHA512 as the PRF. `out` may be any length; its size
/// selects the derived key length.
pub fn pbkdf2_hmac_sha512(password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]) {
    pbkdf2_hmac::<Sha512>(password, salt, rounds, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn single_round_vector() {
        let mut out = [0u8; 64];
        pbkdf2_hmac_sha512(b"password", b"salt", 1, &mut out);
        let expected = hex!(
            "867f70cf1ade02cff3752599a3a53dc4af34c7a669815ae5d513554e1c8cf252"
            "c02d470a285a0501bad999bfe943c08f050235d7d68b1da55e63f73b60a57fce"
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn output_length_follows_buffer() {
        let mut short = [0u8; 16];
        let mut long = [0u8; 64];
        pbkdf2_hmac_sha512(b"password", b"salt", 1, &mut short);
        pbkdf2_hmac_sha512(b"password", b"salt", 1, &mut long);
        // The first block is shared, so a shorter output is a prefix.
        assert_eq!(short, long[..16]);
    }

    #[test]
    fn rounds_change_output() {
        let mut one = [0u8; 64];
        let mut two = [0u8; 64];
        pbkdf2_hmac_sha512(b"password", b"salt", 1, &mut one);
        pbkdf2_hmac_sha512(b"password", b"salt", 2, &mut two);
        assert_ne!(one, two);
    }
}
