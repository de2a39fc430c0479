//! Random tokens for staging directory names.

use rand::Rng;

/// Characters a token is drawn from (uppercase letters and digits).
pub const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a `len`-character token from [`TOKEN_ALPHABET`].
pub fn unique_token(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

pub fn is_token_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}
