use crate::error::{AppError, AppResult};
use regex::Regex;

/// 校验大陆手机号：11 位，以 1 开头
pub fn validate_cn_phone(phone: &str) -> AppResult<()> {
    let phone_regex = Regex::new(r"^1\d{10}$")
        .map_err(|e| AppError::InternalError(format!("手机号正则错误: {e}")))?;

    if !phone_regex.is_match(phone) {
        return Err(AppError::ValidationError("手机号格式不正确".to_string()));
    }

    Ok(())
}

/// 13812345678 -> 138****5678
pub fn mask_phone(phone: &str) -> String {
    if phone.len() != 11 || !phone.is_ascii() {
        return phone.to_string();
    }
    format!("{}****{}", &phone[..3], &phone[7..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cn_phone() {
        assert!(validate_cn_phone("13812345678").is_ok());
        assert!(validate_cn_phone("1381234567").is_err());
        assert!(validate_cn_phone("23812345678").is_err());
        assert!(validate_cn_phone("+8613812345678").is_err());
        assert!(validate_cn_phone("1381234567a").is_err());
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("13812345678"), "138****5678");
        assert_eq!(mask_phone("123"), "123");
    }
}
