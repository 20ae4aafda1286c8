use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use tokio::sync::watch;

use wxapp_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::WechatClient,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().map_err(|e| anyhow::anyhow!("加载配置失败: {e}"))?;

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database connection pool")?;

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );
    let wechat = WechatClient::new(config.wechat.clone());
    if !wechat.is_enabled() {
        log::warn!("WeChat app_id not configured, login runs in offline mode");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (sse, sse_handle) = SseBroadcaster::spawn(config.sse.client_buffer, shutdown_rx.clone());

    // 创建服务
    let commission_service = CommissionService::new(pool.clone());
    let referral_service = ReferralService::new(
        pool.clone(),
        commission_service.clone(),
        &config.referral.qrcode_base_url,
    );
    let user_service = UserService::new(
        pool.clone(),
        jwt_service.clone(),
        wechat,
        referral_service.clone(),
        &config.user.phone_verify_code,
    );
    let order_service = OrderService::new(
        pool.clone(),
        sse.clone(),
        &config.order,
        &config.wechat.app_id,
    );
    let order_timeout_service = OrderTimeoutService::new(pool.clone(), sse.clone());
    let admin_service = AdminService::new(pool.clone(), jwt_service.clone());
    let catalog_service = CatalogService::new(pool.clone());
    let kefu_service = KefuService::new(pool.clone(), sse.clone());
    let consultation_service = ConsultationService::new(pool.clone(), sse.clone());
    let file_service = FileService::new(pool.clone());
    let config_service = ConfigService::new(pool.clone());

    let reaper_handle =
        tasks::spawn_order_timeout_reaper(order_timeout_service.clone(), shutdown_rx);

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .app_data(handlers::path_config())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(referral_service.clone()))
            .app_data(web::Data::new(commission_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(order_timeout_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(kefu_service.clone()))
            .app_data(web::Data::new(consultation_service.clone()))
            .app_data(web::Data::new(file_service.clone()))
            .app_data(web::Data::new(config_service.clone()))
            .app_data(web::Data::new(sse.clone()))
            .configure(swagger_config)
            .configure(handlers::api_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    // HTTP 服务已停止，通知后台任务退出并等待结束
    log::info!("HTTP server stopped, shutting down background tasks");
    let _ = shutdown_tx.send(true);
    if let Err(e) = reaper_handle.await {
        log::error!("Order timeout reaper panicked: {e}");
    }
    if let Err(e) = sse_handle.await {
        log::error!("SSE broadcaster panicked: {e}");
    }

    Ok(())
}
