use crate::error::{AppError, AppResult};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// 可预约时段：上午 08-11 点，下午 14-19 点，整点
const MORNING_HOURS: std::ops::RangeInclusive<u32> = 8..=11;
const AFTERNOON_HOURS: std::ops::RangeInclusive<u32> = 14..=19;
/// 最多可提前预约的天数
pub const MAX_ADVANCE_DAYS: i64 = 7;

pub fn allowed_time_slots() -> Vec<String> {
    MORNING_HOURS
        .chain(AFTERNOON_HOURS)
        .map(|h| format!("{h:02}:00"))
        .collect()
}

pub fn is_allowed_slot(time: &str) -> bool {
    allowed_time_slots().iter().any(|s| s == time)
}

/// 预约窗口：明天 00:00 至 今天+7 天 23:59:59（本地时间）
pub fn appointment_window(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let today = now.date();
    let start = (today + Duration::days(1)).and_time(NaiveTime::MIN);
    let end_time = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    let end = (today + Duration::days(MAX_ADVANCE_DAYS)).and_time(end_time);
    (start, end)
}

fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::ValidationError("预约日期格式错误".to_string()))
}

/// 校验预约日期与时段，返回预约时间点
pub fn validate_appointment(
    date: &str,
    time: &str,
    now: NaiveDateTime,
) -> AppResult<NaiveDateTime> {
    if date.is_empty() || time.is_empty() {
        return Err(AppError::ValidationError("请选择预约时间".to_string()));
    }

    let appointment = NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M")
        .map_err(|_| AppError::ValidationError("预约时间格式错误".to_string()))?;

    let (start, end) = appointment_window(now);
    if appointment < start {
        return Err(AppError::ValidationError("预约时间不能早于明天".to_string()));
    }
    if appointment > end {
        return Err(AppError::ValidationError(
            "预约时间不能超过未来7天".to_string(),
        ));
    }

    if !is_allowed_slot(time) {
        return Err(AppError::ValidationError("预约时段不可用".to_string()));
    }

    Ok(appointment)
}

/// 指定日期可选的时段
pub fn time_slots_for(date: &str, now: NaiveDateTime) -> AppResult<Vec<String>> {
    let day = parse_date(date)?;
    let (start, end) = appointment_window(now);
    if day < start.date() || day > end.date() {
        return Err(AppError::ValidationError(
            "只能预约明天起7天内的日期".to_string(),
        ));
    }
    Ok(allowed_time_slots())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_allowed_slots() {
        let slots = allowed_time_slots();
        assert_eq!(slots.len(), 10);
        assert_eq!(slots.first().map(String::as_str), Some("08:00"));
        assert_eq!(slots.last().map(String::as_str), Some("19:00"));
        assert!(is_allowed_slot("11:00"));
        assert!(!is_allowed_slot("12:00"));
        assert!(!is_allowed_slot("08:30"));
        assert!(!is_allowed_slot("20:00"));
    }

    #[test]
    fn test_validate_appointment_window() {
        assert!(validate_appointment("2025-06-11", "08:00", now()).is_ok());
        assert!(validate_appointment("2025-06-17", "19:00", now()).is_ok());
        // 今天不可约
        assert!(validate_appointment("2025-06-10", "19:00", now()).is_err());
        // 超过 7 天
        assert!(validate_appointment("2025-06-18", "08:00", now()).is_err());
    }

    #[test]
    fn test_validate_appointment_rejects_bad_input() {
        assert!(validate_appointment("", "08:00", now()).is_err());
        assert!(validate_appointment("2025/06/11", "08:00", now()).is_err());
        assert!(validate_appointment("2025-06-11", "12:00", now()).is_err());
        assert!(validate_appointment("2025-06-11", "25:00", now()).is_err());
    }

    #[test]
    fn test_time_slots_for() {
        assert_eq!(time_slots_for("2025-06-12", now()).unwrap().len(), 10);
        assert!(time_slots_for("2025-06-10", now()).is_err());
        assert!(time_slots_for("bad", now()).is_err());
    }
}
