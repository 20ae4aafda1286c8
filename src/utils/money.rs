/// 金额统一四舍五入到分
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn sum2<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    round2(values.into_iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(10.0), 10.0);
        assert_eq!(round2(0.1 + 0.2), 0.3);
        assert_eq!(round2(200.0 * 0.05), 10.0);
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(12.345_6), 12.35);
    }

    #[test]
    fn test_sum2() {
        assert_eq!(sum2(vec![0.1; 10]), 1.0);
        assert_eq!(sum2(Vec::<f64>::new()), 0.0);
    }
}
