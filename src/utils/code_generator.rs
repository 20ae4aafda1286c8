use chrono::{DateTime, Datelike, Local};
use rand::Rng;

/// 生成6位数字（允许前导零，000000-999999）
pub fn generate_six_digit_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..1_000_000))
}

/// 订单号：ORDER + 年月日（月日不补零）+ 6位随机数
/// 不做碰撞检查，由 order_no 唯一索引兜底
pub fn generate_order_no(now: DateTime<Local>) -> String {
    format!(
        "ORDER{}{}{}{}",
        now.year(),
        now.month(),
        now.day(),
        generate_six_digit_code()
    )
}

/// 交易号：TXN + YYYYMMDDHHMMSS + 6位随机数
pub fn generate_transaction_id(now: DateTime<Local>) -> String {
    format!("TXN{}{}", now.format("%Y%m%d%H%M%S"), generate_six_digit_code())
}

/// 支付参数中的随机串
pub fn generate_nonce_str() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_six_digit_code() {
        for _ in 0..50 {
            let code = generate_six_digit_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_order_no_format() {
        let now = Local.with_ymd_and_hms(2025, 3, 7, 10, 0, 0).unwrap();
        let no = generate_order_no(now);
        assert!(no.starts_with("ORDER202537"));
        assert_eq!(no.len(), "ORDER202537".len() + 6);
        assert!(no["ORDER202537".len()..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_transaction_id_format() {
        let now = Local.with_ymd_and_hms(2025, 11, 30, 8, 5, 9).unwrap();
        let txn = generate_transaction_id(now);
        assert!(txn.starts_with("TXN20251130080509"));
        assert_eq!(txn.len(), 3 + 14 + 6);
    }

    #[test]
    fn test_nonce_str() {
        let a = generate_nonce_str();
        assert_eq!(a.len(), 32);
        assert_ne!(a, generate_nonce_str());
    }
}
