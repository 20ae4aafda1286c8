use crate::entities::{
    banner_entity, home_service_entity, hospital_entity, navigation_entity, service_item_entity,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListQuery {
    pub category: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetailQuery {
    pub service_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItemResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: f64,
    pub original_price: f64,
    pub image_url: Option<String>,
    pub detail_images: Vec<String>,
    pub sort: i32,
    pub created_at: DateTime<Utc>,
}

impl From<service_item_entity::Model> for ServiceItemResponse {
    fn from(m: service_item_entity::Model) -> Self {
        let detail_images = m
            .detail_images
            .as_deref()
            .and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
            .unwrap_or_default();
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            category: m.category,
            price: m.price,
            original_price: m.original_price,
            image_url: m.image_url,
            detail_images,
            sort: m.sort,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormConfigResponse {
    pub service_id: i64,
    #[schema(value_type = Object)]
    pub form_config: serde_json::Value,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GeoQuery {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub limit: Option<u64>,
}

impl GeoQuery {
    /// (latitude, longitude)，缺一不可
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BannerItem {
    pub id: i64,
    pub title: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
}

impl From<banner_entity::Model> for BannerItem {
    fn from(m: banner_entity::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            image_url: m.image_url,
            link_url: m.link_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItem {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub link_url: Option<String>,
}

impl From<navigation_entity::Model> for NavigationItem {
    fn from(m: navigation_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            icon: m.icon,
            link_url: m.link_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeServiceItem {
    pub id: i64,
    pub service_item_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
}

impl From<home_service_entity::Model> for HomeServiceItem {
    fn from(m: home_service_entity::Model) -> Self {
        Self {
            id: m.id,
            service_item_id: m.service_item_id,
            name: m.name,
            description: m.description,
            icon: m.icon,
            image_url: m.image_url,
            link_url: m.link_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HospitalItem {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub level: Option<String>,
    pub hospital_type: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// 距离（公里），未传坐标时为空
    pub distance: Option<f64>,
}

impl HospitalItem {
    pub fn with_distance(m: hospital_entity::Model, distance: Option<f64>) -> Self {
        Self {
            id: m.id,
            name: m.name,
            logo: m.logo,
            address: m.address,
            phone: m.phone,
            description: m.description,
            level: m.level,
            hospital_type: m.hospital_type,
            longitude: m.longitude,
            latitude: m.latitude,
            distance,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeInitResponse {
    pub banners: Vec<BannerItem>,
    pub navigations: Vec<NavigationItem>,
    pub services: Vec<HomeServiceItem>,
    pub hospitals: Vec<HospitalItem>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HospitalListQuery {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavigationInfo {
    /// 公里
    pub distance: f64,
    /// 分钟
    pub duration: i64,
    pub route_type: String,
    pub route_points: Vec<RoutePoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HospitalDetailResponse {
    pub hospital: HospitalItem,
    pub navigation: Option<NavigationInfo>,
}
