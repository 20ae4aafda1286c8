use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::user::wx_login,
        handlers::user::refresh,
        handlers::user::get_info,
        handlers::user::update_info,
        handlers::user::bind_phone,
        handlers::user::list_addresses,
        handlers::user::save_address,
        handlers::user::delete_address,
        handlers::user::list_patients,
        handlers::user::save_patient,
        handlers::user::delete_patient,
        handlers::order::submit,
        handlers::order::pay,
        handlers::order::pay_confirm,
        handlers::order::cancel,
        handlers::order::refund,
        handlers::order::list,
        handlers::order::detail,
        handlers::order::time_slots,
        handlers::order::check_expired,
        handlers::order::expired_count,
        handlers::promoter::promoter_info,
        handlers::promoter::commission_list,
        handlers::promoter::cashout_list,
        handlers::promoter::by_code,
        handlers::promoter::bind,
        handlers::promoter::qrcode,
        handlers::promoter::report,
        handlers::promoter::referral_config_info,
        handlers::promoter::apply_cashout,
        handlers::admin::login,
        handlers::admin::check,
        handlers::admin::users,
        handlers::admin::orders,
        handlers::admin::stats,
        handlers::admin::set_admin,
        handlers::admin::remove_admin,
        handlers::admin::admins,
        handlers::admin::login_logs,
        handlers::admin::complete_order,
        handlers::admin::confirm_refund,
        handlers::admin::settle_commissions,
        handlers::admin::cashouts,
        handlers::admin::approve_cashout,
        handlers::admin::reject_cashout,
        handlers::admin::pay_cashout,
        handlers::admin::consultations,
        handlers::admin::reply_consultation,
        handlers::admin::consultation_messages,
        handlers::admin::generate_codes,
        handlers::catalog::service_list,
        handlers::catalog::service_detail,
        handlers::catalog::form_config,
        handlers::catalog::home_init,
        handlers::catalog::hospital_list,
        handlers::catalog::hospital_detail,
        handlers::support::send_kefu_message,
        handlers::support::faq_list,
        handlers::support::faq_detail,
        handlers::support::create_consultation,
        handlers::support::send_consultation_message,
        handlers::support::consultation_messages,
        handlers::support::close_consultation,
        handlers::support::notifications,
        handlers::file::upload,
        handlers::file::list,
        handlers::file::delete,
        handlers::file::set_permission,
        handlers::file::get_permission,
        handlers::platform::platform_config,
        handlers::sse::connect,
        handlers::sse::clients,
    ),
    components(
        schemas(
            WxLoginRequest,
            LoginResponse,
            RefreshTokenRequest,
            TokenResponse,
            UserInfo,
            UpdateUserInfoRequest,
            BindPhoneRequest,
            AddressRequest,
            AddressResponse,
            PatientRequest,
            PatientResponse,
            MessageResponse,
            SubmitOrderRequest,
            SubmitOrderResponse,
            PayOrderRequest,
            PayParams,
            PayConfirmRequest,
            CancelOrderRequest,
            RefundOrderRequest,
            OrderResponse,
            TimeSlotsRequest,
            TimeSlotsResponse,
            ExpiredCheckResponse,
            ExpiredCountResponse,
            PromoterStats,
            PromoterInfoResponse,
            CommissionItem,
            CashoutItem,
            PromoterPublicInfo,
            BindReferrerRequest,
            BindReferrerResponse,
            GenerateCodesResponse,
            QrcodeResponse,
            ReferralUserItem,
            ReferralReportResponse,
            ReferralConfigResponse,
            ApplyCashoutRequest,
            ApplyCashoutResponse,
            SettleCommissionRequest,
            SettleCommissionResponse,
            CashoutReviewRequest,
            AdminLoginRequest,
            AdminLoginResponse,
            AdminProfile,
            AdminOrderItem,
            AdminStats,
            SetAdminRequest,
            RemoveAdminRequest,
            AdminCheckResponse,
            AdminItem,
            LoginLogItem,
            ConsultationReplyRequest,
            ServiceItemResponse,
            FormConfigResponse,
            BannerItem,
            NavigationItem,
            HomeServiceItem,
            HospitalItem,
            HomeInitResponse,
            RoutePoint,
            NavigationInfo,
            HospitalDetailResponse,
            SendKefuMessageRequest,
            SendKefuMessageResponse,
            FaqItem,
            ConsultationResponse,
            ConsultationMessageRequest,
            ConsultationMessageItem,
            ConsultationNotificationItem,
            UploadFileRequest,
            FileItem,
            FilePermissionRequest,
            FilePermissionResponse,
            PlatformConfig,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "user", description = "登录、用户资料、地址与就诊人"),
        (name = "order", description = "订单与支付"),
        (name = "promoter", description = "推广员与佣金"),
        (name = "referral", description = "推荐关系与提现"),
        (name = "admin", description = "管理后台"),
        (name = "catalog", description = "服务、首页与医院"),
        (name = "support", description = "客服、常见问题与在线咨询"),
        (name = "file", description = "文件"),
        (name = "platform", description = "平台配置"),
        (name = "sse", description = "实时推送"),
    ),
    info(
        title = "WeChat Mini-Program Backend API",
        version = "1.0.0",
        description = "陪诊小程序后端 REST API"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_has_bearer_scheme_and_order_paths() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["components"]["securitySchemes"]["bearer_auth"].is_object());
        assert!(json["paths"]["/api/order/submit"].is_object());
        assert!(json["paths"]["/api/admin/commission/settle"].is_object());
    }
}
