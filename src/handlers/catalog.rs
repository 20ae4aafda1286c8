use crate::models::*;
use crate::services::CatalogService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/service/list",
    tag = "catalog",
    params(
        ("category" = Option<String>, Query, description = "服务分类"),
        ("page" = Option<u64>, Query, description = "页码"),
        ("pageSize" = Option<u64>, Query, description = "每页数量，默认10，最大50")
    ),
    responses((status = 200, description = "服务列表"))
)]
pub async fn service_list(
    catalog_service: web::Data<CatalogService>,
    query: web::Query<ServiceListQuery>,
) -> Result<HttpResponse> {
    match catalog_service.list_services(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/service/detail",
    tag = "catalog",
    params(("serviceId" = i64, Query, description = "服务ID")),
    responses((status = 200, description = "服务详情", body = ServiceItemResponse))
)]
pub async fn service_detail(
    catalog_service: web::Data<CatalogService>,
    query: web::Query<ServiceDetailQuery>,
) -> Result<HttpResponse> {
    match catalog_service.service_detail(query.service_id).await {
        Ok(item) => Ok(HttpResponse::Ok().json(ApiResponse::success(item))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/service/form_config/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "服务ID")),
    responses((status = 200, description = "下单表单配置", body = FormConfigResponse))
)]
pub async fn form_config(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match catalog_service.form_config(path.into_inner()).await {
        Ok(cfg) => Ok(HttpResponse::Ok().json(ApiResponse::success(cfg))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 首页数据，GET 与 POST 均可
#[utoipa::path(
    get,
    path = "/api/home/init",
    tag = "catalog",
    params(
        ("longitude" = Option<f64>, Query, description = "经度"),
        ("latitude" = Option<f64>, Query, description = "纬度"),
        ("limit" = Option<u64>, Query, description = "每个模块条数，默认10")
    ),
    responses((status = 200, description = "首页数据", body = HomeInitResponse))
)]
pub async fn home_init(
    catalog_service: web::Data<CatalogService>,
    query: web::Query<GeoQuery>,
) -> Result<HttpResponse> {
    match catalog_service.home_init(&query).await {
        Ok(home) => Ok(HttpResponse::Ok().json(ApiResponse::success(home))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/hospital/list",
    tag = "catalog",
    params(
        ("longitude" = Option<f64>, Query, description = "经度"),
        ("latitude" = Option<f64>, Query, description = "纬度"),
        ("page" = Option<u64>, Query, description = "页码"),
        ("pageSize" = Option<u64>, Query, description = "每页数量")
    ),
    responses((status = 200, description = "医院列表"))
)]
pub async fn hospital_list(
    catalog_service: web::Data<CatalogService>,
    query: web::Query<HospitalListQuery>,
) -> Result<HttpResponse> {
    match catalog_service.list_hospitals(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/hospital/detail/{id}",
    tag = "catalog",
    params(
        ("id" = i64, Path, description = "医院ID"),
        ("longitude" = Option<f64>, Query, description = "经度"),
        ("latitude" = Option<f64>, Query, description = "纬度")
    ),
    responses((status = 200, description = "医院详情与导航", body = HospitalDetailResponse))
)]
pub async fn hospital_detail(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
    query: web::Query<GeoQuery>,
) -> Result<HttpResponse> {
    match catalog_service
        .hospital_detail(path.into_inner(), &query)
        .await
    {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn catalog_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/service")
            .route("/list", web::get().to(service_list))
            .route("/detail", web::get().to(service_detail))
            .route("/form_config/{id}", web::get().to(form_config)),
    )
    .route("/home/init", web::get().to(home_init))
    .route("/home/init", web::post().to(home_init))
    .service(
        web::scope("/hospital")
            .route("/list", web::get().to(hospital_list))
            .route("/detail/{id}", web::get().to(hospital_detail)),
    );
}
