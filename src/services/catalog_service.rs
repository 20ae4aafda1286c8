use crate::database::DbPool;
use crate::entities::{
    banner_entity as banners, home_service_entity as home_services, hospital_entity as hospitals,
    navigation_entity as navigations, service_item_entity as service_items,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    FormConfigResponse, GeoQuery, HomeInitResponse, HospitalDetailResponse, HospitalItem,
    HospitalListQuery, NavigationInfo, PaginatedResponse, Pagination, RoutePoint,
    ServiceItemResponse, ServiceListQuery,
};
use crate::utils::geo::{distance_km, estimate_driving_minutes};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde_json::{Value, json};

const STATUS_ACTIVE: i32 = 1;
const HOME_SECTION_LIMIT: u64 = 10;

/// 服务未配置表单时使用的默认字段
pub fn default_form_config() -> Value {
    json!({
        "fields": [
            { "name": "patient", "label": "就诊人", "type": "patient", "required": true },
            { "name": "address", "label": "服务地址", "type": "address", "required": true },
            { "name": "appointmentDate", "label": "预约日期", "type": "date", "required": true },
            { "name": "appointmentTime", "label": "预约时间", "type": "time", "required": true },
            { "name": "diseaseInfo", "label": "病情描述", "type": "textarea", "required": false },
            { "name": "needToiletAssist", "label": "是否需要如厕协助", "type": "switch", "required": false }
        ]
    })
}

/// 解析表单配置；为空或非法 JSON 时回落到默认字段
pub fn parse_form_config(raw: Option<&str>) -> Value {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| serde_json::from_str::<Value>(s).ok())
        .filter(|v| !v.is_null())
        .unwrap_or_else(default_form_config)
}

/// 带坐标时按距离升序，缺坐标的医院排在最后
pub fn rank_hospitals(
    rows: Vec<hospitals::Model>,
    origin: Option<(f64, f64)>,
) -> Vec<HospitalItem> {
    let Some((lat, lon)) = origin else {
        return rows
            .into_iter()
            .map(|h| HospitalItem::with_distance(h, None))
            .collect();
    };

    let mut items: Vec<HospitalItem> = rows
        .into_iter()
        .map(|h| {
            let distance = match (h.latitude, h.longitude) {
                (Some(h_lat), Some(h_lon)) => Some(distance_km(lat, lon, h_lat, h_lon)),
                _ => None,
            };
            HospitalItem::with_distance(h, distance)
        })
        .collect();
    items.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    items
}

#[derive(Clone)]
pub struct CatalogService {
    pool: DbPool,
}

impl CatalogService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_services(
        &self,
        query: &ServiceListQuery,
    ) -> AppResult<PaginatedResponse<ServiceItemResponse>> {
        let pagination = Pagination::new(query.page, query.page_size, 10, 50);
        let mut select =
            service_items::Entity::find().filter(service_items::Column::Status.eq(STATUS_ACTIVE));
        if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
            select = select.filter(service_items::Column::Category.eq(category));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let rows = select
            .order_by_asc(service_items::Column::Sort)
            .order_by_desc(service_items::Column::Id)
            .limit(pagination.limit())
            .offset(pagination.offset())
            .all(self.pool.as_ref())
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(Into::into).collect(),
            pagination,
            total,
        ))
    }

    async fn find_service(&self, service_id: i64) -> AppResult<service_items::Model> {
        service_items::Entity::find_by_id(service_id)
            .filter(service_items::Column::Status.eq(STATUS_ACTIVE))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("服务不存在".into()))
    }

    pub async fn service_detail(&self, service_id: i64) -> AppResult<ServiceItemResponse> {
        Ok(self.find_service(service_id).await?.into())
    }

    pub async fn form_config(&self, service_id: i64) -> AppResult<FormConfigResponse> {
        let service = self.find_service(service_id).await?;
        Ok(FormConfigResponse {
            service_id: service.id,
            form_config: parse_form_config(service.form_config.as_deref()),
        })
    }

    async fn active_hospitals(&self) -> AppResult<Vec<hospitals::Model>> {
        Ok(hospitals::Entity::find()
            .filter(hospitals::Column::Status.eq(STATUS_ACTIVE))
            .order_by_asc(hospitals::Column::Sort)
            .order_by_asc(hospitals::Column::Id)
            .all(self.pool.as_ref())
            .await?)
    }

    /// 首页聚合：轮播图、金刚区、推荐服务、附近医院
    pub async fn home_init(&self, query: &GeoQuery) -> AppResult<HomeInitResponse> {
        let limit = query.limit.filter(|l| *l > 0).unwrap_or(HOME_SECTION_LIMIT);

        let banners = banners::Entity::find()
            .filter(banners::Column::Status.eq(STATUS_ACTIVE))
            .order_by_asc(banners::Column::Sort)
            .all(self.pool.as_ref())
            .await?;
        let navigations = navigations::Entity::find()
            .filter(navigations::Column::Status.eq(STATUS_ACTIVE))
            .order_by_asc(navigations::Column::Sort)
            .all(self.pool.as_ref())
            .await?;
        let services = home_services::Entity::find()
            .filter(home_services::Column::Status.eq(STATUS_ACTIVE))
            .order_by_asc(home_services::Column::Sort)
            .limit(limit)
            .all(self.pool.as_ref())
            .await?;

        let mut hospitals = rank_hospitals(self.active_hospitals().await?, query.coordinates());
        hospitals.truncate(limit as usize);

        Ok(HomeInitResponse {
            banners: banners.into_iter().map(Into::into).collect(),
            navigations: navigations.into_iter().map(Into::into).collect(),
            services: services.into_iter().map(Into::into).collect(),
            hospitals,
        })
    }

    /// 医院列表；带坐标时按距离排序后在内存中分页
    pub async fn list_hospitals(
        &self,
        query: &HospitalListQuery,
    ) -> AppResult<PaginatedResponse<HospitalItem>> {
        let pagination = Pagination::new(query.page, query.page_size, 10, 50);
        let origin = query.latitude.zip(query.longitude);
        let ranked = rank_hospitals(self.active_hospitals().await?, origin);
        let total = ranked.len() as u64;
        let list = ranked
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();
        Ok(PaginatedResponse::new(list, pagination, total))
    }

    pub async fn hospital_detail(
        &self,
        hospital_id: i64,
        query: &GeoQuery,
    ) -> AppResult<HospitalDetailResponse> {
        let hospital = hospitals::Entity::find_by_id(hospital_id)
            .filter(hospitals::Column::Status.eq(STATUS_ACTIVE))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("医院不存在".into()))?;

        let navigation = match (query.coordinates(), hospital.latitude, hospital.longitude) {
            (Some((lat, lon)), Some(h_lat), Some(h_lon)) => {
                let distance = distance_km(lat, lon, h_lat, h_lon);
                Some(NavigationInfo {
                    distance,
                    duration: estimate_driving_minutes(distance),
                    route_type: "driving".to_string(),
                    route_points: vec![
                        RoutePoint {
                            latitude: lat,
                            longitude: lon,
                        },
                        RoutePoint {
                            latitude: h_lat,
                            longitude: h_lon,
                        },
                    ],
                })
            }
            _ => None,
        };

        let distance = navigation.as_ref().map(|n| n.distance);
        Ok(HospitalDetailResponse {
            hospital: HospitalItem::with_distance(hospital, distance),
            navigation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::testing::IntoPool;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn hospital(id: i64, coords: Option<(f64, f64)>) -> hospitals::Model {
        let now = Utc::now();
        hospitals::Model {
            id,
            name: format!("医院{id}"),
            logo: None,
            address: None,
            phone: None,
            description: None,
            level: Some("三甲".into()),
            hospital_type: None,
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            sort: id as i32,
            status: STATUS_ACTIVE,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_form_config_defaults_when_empty_or_invalid() {
        let fields = |v: &Value| v["fields"].as_array().map(Vec::len).unwrap_or(0);
        assert_eq!(fields(&parse_form_config(None)), 6);
        assert_eq!(fields(&parse_form_config(Some("  "))), 6);
        assert_eq!(fields(&parse_form_config(Some("{oops"))), 6);

        let custom = parse_form_config(Some(r#"{"fields":[{"name":"x"}]}"#));
        assert_eq!(fields(&custom), 1);
    }

    #[test]
    fn test_rank_hospitals_by_distance() {
        let origin = (22.54, 114.05);
        let rows = vec![
            hospital(1, Some((23.13, 113.26))),
            hospital(2, None),
            hospital(3, Some((22.55, 114.06))),
        ];
        let ranked = rank_hospitals(rows, Some(origin));
        let ids: Vec<i64> = ranked.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(ranked[0].distance.unwrap() < 2.0);
        assert!(ranked[2].distance.is_none());
    }

    #[test]
    fn test_rank_hospitals_without_origin_keeps_order() {
        let rows = vec![hospital(1, Some((23.13, 113.26))), hospital(2, None)];
        let ranked = rank_hospitals(rows, None);
        assert_eq!(ranked[0].id, 1);
        assert!(ranked.iter().all(|h| h.distance.is_none()));
    }

    #[tokio::test]
    async fn test_hospital_detail_navigation() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![hospital(3, Some((22.55, 114.06)))]])
            .into_pool();
        let resp = CatalogService::new(db)
            .hospital_detail(
                3,
                &GeoQuery {
                    latitude: Some(22.54),
                    longitude: Some(114.05),
                    limit: None,
                },
            )
            .await
            .unwrap();
        let nav = resp.navigation.unwrap();
        assert_eq!(nav.route_type, "driving");
        assert_eq!(nav.route_points.len(), 2);
        assert!(nav.duration >= 1);
        assert_eq!(resp.hospital.distance, Some(nav.distance));
    }
}
