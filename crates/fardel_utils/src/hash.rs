use sha2::{Digest, Sha256};

/// Lowercase hex of the SHA-256 digest of `input`.
pub fn sha256_hex(input: &str) -> String {
  format!("{:x}", Sha256::digest(input.as_bytes()))
}

#[test]
fn test_sha256_hex() {
  assert_eq!(sha256_hex("hello"), "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824");
}
