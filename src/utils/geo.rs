use crate::utils::money::round2;

const EARTH_RADIUS_KM: f64 = 6371.0;
/// 驾车估算速度 km/h
const DRIVING_SPEED_KMH: f64 = 30.0;

/// Haversine 球面距离（公里）
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// 对外展示的距离，保留两位小数
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    round2(haversine_km(lat1, lon1, lat2, lon2))
}

/// 按驾车速度估算的分钟数，至少 1 分钟
pub fn estimate_driving_minutes(distance_km: f64) -> i64 {
    ((distance_km / DRIVING_SPEED_KMH) * 60.0).ceil().max(1.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(distance_km(31.23, 121.47, 31.23, 121.47), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // 北京 -> 上海 约 1068 km
        let d = haversine_km(39.9042, 116.4074, 31.2304, 121.4737);
        assert!((d - 1068.0).abs() < 10.0, "{d}");
    }

    #[test]
    fn test_one_degree_latitude() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 0.05, "{d}");
    }

    #[test]
    fn test_estimate_driving_minutes() {
        assert_eq!(estimate_driving_minutes(15.0), 30);
        assert_eq!(estimate_driving_minutes(0.0), 1);
        assert_eq!(estimate_driving_minutes(45.0), 90);
    }
}
