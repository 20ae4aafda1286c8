use rand::Rng;

/// 生成 24 位十六进制的用户业务ID（12 字节随机数）
pub fn generate_user_id() -> String {
    let bytes: [u8; 12] = rand::thread_rng().r#gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn is_valid_user_id(id: &str) -> bool {
    id.len() == 24 && id.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_user_id() {
        let id = generate_user_id();
        assert_eq!(id.len(), 24);
        assert!(is_valid_user_id(&id));
        assert!(id.chars().all(|c| !c.is_ascii_uppercase()));
        assert_ne!(id, generate_user_id());
    }

    #[test]
    fn test_is_valid_user_id() {
        assert!(is_valid_user_id("64f1a2b3c4d5e6f708192a3b"));
        assert!(!is_valid_user_id("64f1a2b3c4d5e6f708192a3"));
        assert!(!is_valid_user_id("64f1a2b3c4d5e6f708192a3z"));
        assert!(!is_valid_user_id(""));
    }
}
