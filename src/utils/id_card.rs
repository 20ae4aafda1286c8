use chrono::{Datelike, NaiveDate};

/// 根据 18 位身份证号计算周岁，格式不对返回 0
pub fn age_from_id_card(id_card: &str, today: NaiveDate) -> i32 {
    if id_card.len() != 18 || !id_card.is_ascii() {
        return 0;
    }

    // 第 7-14 位为出生日期 YYYYMMDD
    let birth = &id_card[6..14];
    let (Ok(year), Ok(month), Ok(day)) = (
        birth[..4].parse::<i32>(),
        birth[4..6].parse::<u32>(),
        birth[6..8].parse::<u32>(),
    ) else {
        return 0;
    };

    let mut age = today.year() - year;
    if today.month() < month || (today.month() == month && today.day() < day) {
        age -= 1;
    }
    age.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    #[test]
    fn test_birthday_passed() {
        assert_eq!(age_from_id_card("110101198001011234", today()), 45);
    }

    #[test]
    fn test_birthday_not_yet() {
        assert_eq!(age_from_id_card("11010119801231123X", today()), 44);
    }

    #[test]
    fn test_birthday_today() {
        assert_eq!(age_from_id_card("110101200006101234", today()), 25);
    }

    #[test]
    fn test_invalid_card() {
        assert_eq!(age_from_id_card("", today()), 0);
        assert_eq!(age_from_id_card("11010119800101", today()), 0);
        assert_eq!(age_from_id_card("110101ABCD0101123X", today()), 0);
    }
}
