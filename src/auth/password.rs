use tracing::error;

/// bcrypt only reads the first 72 bytes of its input. Both hashing and
/// verification cut the password there explicitly so longer passwords
/// behave the same regardless of the bcrypt backend.
pub const BCRYPT_MAX_BYTES: usize = 72;

fn truncated(plain: &str) -> &[u8] {
    let bytes = plain.as_bytes();
    &bytes[..bytes.len().min(BCRYPT_MAX_BYTES)]
}

pub fn hash_password(plain: &str, cost: u32) -> anyhow::Result<String> {
    bcrypt::hash(truncated(plain), cost).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        anyhow::anyhow!(e)
    })
}

/// Never fails: a malformed digest or backend error counts as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match bcrypt::verify(truncated(plain), hash) {
        Ok(ok) => ok,
        Err(e) => {
            error!(error = %e, "bcrypt verify error");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COST: u32 = 4;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password, COST).expect("hashing should succeed");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn hashing_is_salted() {
        let a = hash_password("same-password", COST).unwrap();
        let b = hash_password("same-password", COST).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same-password", &a));
        assert!(verify_password("same-password", &b));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse-battery-staple", COST).unwrap();
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn verify_is_false_on_malformed_hash() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
    }

    #[test]
    fn long_passwords_are_cut_at_72_bytes() {
        let long = "x".repeat(100);
        let cut = "x".repeat(72);
        let hash = hash_password(&long, COST).unwrap();
        assert!(verify_password(&long, &hash));
        assert!(verify_password(&cut, &hash));

        let hash_of_cut = hash_password(&cut, COST).unwrap();
        assert!(verify_password(&long, &hash_of_cut));
    }

    #[test]
    fn multibyte_passwords_are_cut_on_bytes() {
        // 40 two-byte chars = 80 bytes
        let long = "é".repeat(40);
        let hash = hash_password(&long, COST).unwrap();
        assert!(verify_password(&long, &hash));
        assert_eq!(truncated(&long).len(), BCRYPT_MAX_BYTES);
    }
}
