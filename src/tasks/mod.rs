//! 后台定时任务
//!
//! 目前只有订单超时取消。任务监听 shutdown 信号退出，`main` 在 HTTP 服务停止后
//! 发送信号并等待 `JoinHandle` 结束。

use crate::services::OrderTimeoutService;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// 超时检查间隔，固定 60 秒
pub const ORDER_TIMEOUT_INTERVAL: Duration = Duration::from_secs(60);

pub fn spawn_order_timeout_reaper(
    service: OrderTimeoutService,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    spawn_order_timeout_reaper_every(service, shutdown, ORDER_TIMEOUT_INTERVAL)
}

fn spawn_order_timeout_reaper_every(
    service: OrderTimeoutService,
    mut shutdown: watch::Receiver<bool>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!("Order timeout reaper started, interval {}s", period.as_secs());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match service.run_once().await {
                        Ok(n) if n > 0 => log::info!("Expired orders cancelled: {n}"),
                        Ok(_) => {}
                        Err(e) => log::error!("Failed to cancel expired orders: {e:?}"),
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
        log::info!("Order timeout reaper stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::testing::IntoPool;
    use crate::entities::order_entity as orders;
    use crate::services::SseBroadcaster;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_reaper_stops_on_shutdown() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<orders::Model>::new()])
            .into_pool();
        let (tx, rx) = watch::channel(false);
        let (sse, _sse_handle) = SseBroadcaster::spawn(4, rx.clone());
        let service = OrderTimeoutService::new(db, sse);

        let handle = spawn_order_timeout_reaper_every(service, rx, Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reaper did not stop")
            .unwrap();
    }
}
