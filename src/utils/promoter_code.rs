use crate::error::AppResult;
use chrono::Utc;
use rand::Rng;
use std::future::Future;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const PROMOTER_CODE_LEN: usize = 6;
const MAX_ATTEMPTS: usize = 100;

/// 随机生成一个 6 位推广码（A-Z0-9）
pub fn generate_promoter_code() -> String {
    let mut rng = rand::thread_rng();
    (0..PROMOTER_CODE_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

pub fn validate_promoter_code(code: &str) -> bool {
    code.len() == PROMOTER_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// ABC123 -> ABC-123，非法码原样返回
pub fn format_promoter_code(code: &str) -> String {
    if !validate_promoter_code(code) {
        return code.to_string();
    }
    format!("{}-{}", &code[..3], &code[3..])
}

/// 多次尝试仍冲突时的兜底码：P + 时间戳后 5 位
fn fallback_promoter_code(unix_secs: i64) -> String {
    format!("P{:05}", unix_secs.rem_euclid(100_000))
}

/// 生成唯一推广码，`exists` 负责查库判重
pub async fn generate_unique_promoter_code<F, Fut>(mut exists: F) -> AppResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    for _ in 0..MAX_ATTEMPTS {
        let code = generate_promoter_code();
        if !exists(code.clone()).await? {
            return Ok(code);
        }
    }

    let code = fallback_promoter_code(Utc::now().timestamp());
    log::warn!("Promoter code space exhausted after {MAX_ATTEMPTS} attempts, fallback {code}");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_valid() {
        for _ in 0..200 {
            let code = generate_promoter_code();
            assert_eq!(code.len(), 6);
            assert!(validate_promoter_code(&code), "{code}");
        }
    }

    #[test]
    fn test_validate_promoter_code() {
        assert!(validate_promoter_code("ABC123"));
        assert!(validate_promoter_code("000000"));
        assert!(!validate_promoter_code("abc123"));
        assert!(!validate_promoter_code("ABC12"));
        assert!(!validate_promoter_code("ABC1234"));
        assert!(!validate_promoter_code("ABC-12"));
        assert!(!validate_promoter_code(""));
    }

    #[test]
    fn test_format_promoter_code() {
        assert_eq!(format_promoter_code("ABC123"), "ABC-123");
        assert_eq!(format_promoter_code("bad"), "bad");
    }

    #[test]
    fn test_fallback_code() {
        assert_eq!(fallback_promoter_code(1_700_000_042), "P00042");
        assert_eq!(fallback_promoter_code(99_999), "P99999");
        let code = fallback_promoter_code(Utc::now().timestamp());
        assert!(validate_promoter_code(&code));
    }

    #[tokio::test]
    async fn test_unique_code_retries_on_collision() {
        let mut calls = 0;
        let code = generate_unique_promoter_code(|_| {
            calls += 1;
            let taken = calls < 3;
            async move { Ok(taken) }
        })
        .await
        .unwrap();
        assert_eq!(calls, 3);
        assert!(validate_promoter_code(&code));
    }

    #[tokio::test]
    async fn test_unique_code_falls_back_when_exhausted() {
        let code = generate_unique_promoter_code(|_| async { Ok(true) })
            .await
            .unwrap();
        assert!(code.starts_with('P'));
        assert_eq!(code.len(), 6);
    }
}
