use crate::error::{AppError, AppResult};
use bcrypt::{DEFAULT_COST, hash, verify};

/// 管理员密码：6-64 位，需同时包含字母和数字
pub fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if !(6..=64).contains(&len) {
        return Err(AppError::ValidationError(
            "密码长度必须在6-64字符之间".to_string(),
        ));
    }

    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(AppError::ValidationError(
            "密码必须同时包含字母和数字".to_string(),
        ));
    }

    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::InternalError(format!("密码哈希失败: {e}")))
}

/// 校验密码，存储的哈希损坏时按不匹配处理
pub fn verify_password(password: &str, hashed: &str) -> bool {
    match verify(password, hashed) {
        Ok(ok) => ok,
        Err(e) => {
            log::warn!("Stored admin password hash is invalid: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("admin123").is_ok());
        assert!(validate_password("a1b2c3").is_ok());
        assert!(validate_password("abcdefgh").is_err()); // 缺少数字
        assert!(validate_password("12345678").is_err()); // 缺少字母
        assert!(validate_password("ab12").is_err()); // 太短
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hashed = hash_password("admin123").unwrap();
        assert_ne!(hashed, "admin123");
        assert!(verify_password("admin123", &hashed));
        assert!(!verify_password("admin124", &hashed));
    }

    #[test]
    fn test_verify_against_garbage_hash() {
        assert!(!verify_password("admin123", "not-a-bcrypt-hash"));
    }
}
