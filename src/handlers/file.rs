use crate::middlewares::CurrentUser;
use crate::models::*;
use crate::services::FileService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "file",
    request_body = UploadFileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "上传成功", body = FileItem),
        (status = 400, description = "文件类型或大小不符合要求")
    )
)]
pub async fn upload(
    file_service: web::Data<FileService>,
    user: CurrentUser,
    request: web::Json<UploadFileRequest>,
) -> Result<HttpResponse> {
    match file_service
        .upload(&user.user_id, request.into_inner())
        .await
    {
        Ok(file) => Ok(HttpResponse::Ok().json(ApiResponse::success(file))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/files",
    tag = "file",
    params(
        ("category" = Option<String>, Query, description = "分类"),
        ("limit" = Option<u64>, Query, description = "条数，默认20")
    ),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "文件列表", body = [FileItem]))
)]
pub async fn list(
    file_service: web::Data<FileService>,
    user: CurrentUser,
    query: web::Query<FileListQuery>,
) -> Result<HttpResponse> {
    match file_service.list(&user.user_id, &query).await {
        Ok(files) => Ok(HttpResponse::Ok().json(ApiResponse::success(files))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/file/delete",
    tag = "file",
    params(("fileId" = i64, Query, description = "文件ID")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "删除成功", body = MessageResponse))
)]
pub async fn delete(
    file_service: web::Data<FileService>,
    user: CurrentUser,
    query: web::Query<FileIdQuery>,
) -> Result<HttpResponse> {
    match file_service.delete(&user.user_id, query.file_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success(MessageResponse::new("删除成功")))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/file/permission",
    tag = "file",
    request_body = FilePermissionRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "设置成功", body = FilePermissionResponse))
)]
pub async fn set_permission(
    file_service: web::Data<FileService>,
    user: CurrentUser,
    request: web::Json<FilePermissionRequest>,
) -> Result<HttpResponse> {
    match file_service
        .set_permission(&user.user_id, request.file_id, request.is_public)
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/file/permission/get",
    tag = "file",
    params(("fileId" = i64, Query, description = "文件ID")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "文件权限", body = FilePermissionResponse))
)]
pub async fn get_permission(
    file_service: web::Data<FileService>,
    user: CurrentUser,
    query: web::Query<FileIdQuery>,
) -> Result<HttpResponse> {
    match file_service
        .get_permission(&user.user_id, query.file_id)
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn file_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload", web::post().to(upload))
        .route("/files", web::get().to(list))
        .service(
            web::scope("/file")
                .route("/delete", web::delete().to(delete))
                .route("/permission", web::put().to(set_permission))
                .route("/permission/get", web::get().to(get_permission)),
        );
}
