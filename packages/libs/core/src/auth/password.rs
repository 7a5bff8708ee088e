//! 비밀번호 해시

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// SHA-256 hex 다이제스트
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// 저장된 다이제스트와 비교 (상수 시간)
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let computed = hash_password(password);
    let stored = stored_hash.trim().to_ascii_lowercase();
    computed.as_bytes().ct_eq(stored.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        assert_eq!(
            hash_password("secret"),
            "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("secret");
        assert!(verify_password("secret", &hash));
        assert!(verify_password("secret", &hash.to_uppercase()));
        assert!(!verify_password("Secret", &hash));
        assert!(!verify_password("secret", ""));
    }
}
