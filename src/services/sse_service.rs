use crate::entities::order_entity;
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sea_orm::ActiveEnum;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// 命令通道容量，写满时丢弃广播并告警
const COMMAND_BUFFER: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseEventType {
    OrderUpdate,
    Notification,
    SystemMessage,
    Heartbeat,
    /// 连接建立时的欢迎消息
    System,
}

impl SseEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SseEventType::OrderUpdate => "orderUpdate",
            SseEventType::Notification => "notification",
            SseEventType::SystemMessage => "systemMessage",
            SseEventType::Heartbeat => "heartbeat",
            SseEventType::System => "system",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SseMessage {
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub data: Value,
    pub timestamp: i64,
}

impl SseMessage {
    pub fn new(event_type: SseEventType, data: Value) -> Self {
        Self {
            event_type: event_type.as_str(),
            data,
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn heartbeat() -> Self {
        Self::new(SseEventType::Heartbeat, json!({ "status": "alive" }))
    }

    pub fn order_update(order: &order_entity::Model) -> Self {
        Self::new(
            SseEventType::OrderUpdate,
            json!({
                "orderId": order.id,
                "orderNo": order.order_no,
                "userId": order.user_id,
                "status": order.status.to_value(),
                "statusText": order.status.text(),
            }),
        )
    }

    /// 序列化成 SSE 帧：`data: {json}\n\n`
    pub fn to_frame(&self) -> String {
        let body = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("data: {body}\n\n")
    }
}

/// 订阅者身份，决定能收到哪些推送
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub user_id: String,
    pub is_admin: bool,
}

/// 推送的接收范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    /// 订单所属用户与管理员
    OwnerAndAdmins(String),
    Admins,
}

impl Audience {
    pub fn admits(&self, subscriber: &Subscriber) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::OwnerAndAdmins(owner) => subscriber.is_admin || subscriber.user_id == *owner,
            Audience::Admins => subscriber.is_admin,
        }
    }
}

enum Command {
    Register {
        subscriber: Subscriber,
        reply: oneshot::Sender<(u64, mpsc::Receiver<String>)>,
    },
    Unregister(u64),
    Broadcast {
        frame: String,
        audience: Audience,
    },
    Count(oneshot::Sender<usize>),
}

struct Client {
    subscriber: Subscriber,
    tx: mpsc::Sender<String>,
}

/// 订阅者表，仅由 actor 任务持有
struct SseHub {
    clients: HashMap<u64, Client>,
    next_id: u64,
    client_buffer: usize,
}

impl SseHub {
    fn new(client_buffer: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_id: 1,
            client_buffer,
        }
    }

    fn register(&mut self, subscriber: Subscriber) -> (u64, mpsc::Receiver<String>) {
        let id = self.next_id;
        self.next_id += 1;
        let (tx, rx) = mpsc::channel(self.client_buffer);
        log::info!(
            "SSE client {id} connected for {}, total {}",
            subscriber.user_id,
            self.clients.len() + 1
        );
        self.clients.insert(id, Client { subscriber, tx });
        (id, rx)
    }

    fn unregister(&mut self, id: u64) {
        if self.clients.remove(&id).is_some() {
            log::info!("SSE client {id} disconnected, total {}", self.clients.len());
        }
    }

    /// 非阻塞分发给范围内的订阅者；缓冲区已满或已关闭的直接移除
    fn fan_out(&mut self, frame: &str, audience: &Audience) -> usize {
        let mut dropped = Vec::new();
        for (id, client) in &self.clients {
            if !audience.admits(&client.subscriber) {
                continue;
            }
            match client.tx.try_send(frame.to_string()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    log::warn!("SSE client {id} is too slow, dropping");
                    dropped.push(*id);
                }
                Err(TrySendError::Closed(_)) => dropped.push(*id),
            }
        }
        for id in &dropped {
            self.clients.remove(id);
        }
        self.clients.len()
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Register { subscriber, reply } => {
                let (id, rx) = self.register(subscriber);
                // 请求方已放弃时回收这个订阅
                if reply.send((id, rx)).is_err() {
                    self.unregister(id);
                }
            }
            Command::Unregister(id) => self.unregister(id),
            Command::Broadcast { frame, audience } => {
                self.fan_out(&frame, &audience);
            }
            Command::Count(reply) => {
                let _ = reply.send(self.clients.len());
            }
        }
    }
}

/// SSE 广播句柄，可在各服务间克隆共享
#[derive(Clone)]
pub struct SseBroadcaster {
    tx: mpsc::Sender<Command>,
}

/// 单个连接的订阅，drop 时自动注销
pub struct SseSubscription {
    pub id: u64,
    pub receiver: mpsc::Receiver<String>,
    broadcaster: SseBroadcaster,
}

impl Drop for SseSubscription {
    fn drop(&mut self) {
        self.broadcaster.unsubscribe(self.id);
    }
}

impl SseBroadcaster {
    /// 启动 actor 任务，收到关闭信号后退出并释放所有订阅者
    pub fn spawn(client_buffer: usize, mut shutdown: watch::Receiver<bool>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Command>(COMMAND_BUFFER);
        let handle = tokio::spawn(async move {
            let mut hub = SseHub::new(client_buffer);
            loop {
                tokio::select! {
                    cmd = rx.recv() => match cmd {
                        Some(cmd) => hub.handle(cmd),
                        None => break,
                    },
                    _ = shutdown.changed() => break,
                }
            }
            log::info!("SSE broadcaster stopped, releasing {} clients", hub.clients.len());
        });
        (Self { tx }, handle)
    }

    pub async fn subscribe(&self, subscriber: Subscriber) -> AppResult<SseSubscription> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Register { subscriber, reply })
            .await
            .map_err(|_| AppError::InternalError("SSE broadcaster is not running".into()))?;
        let (id, receiver) = rx
            .await
            .map_err(|_| AppError::InternalError("SSE broadcaster is not running".into()))?;
        Ok(SseSubscription {
            id,
            receiver,
            broadcaster: self.clone(),
        })
    }

    pub fn unsubscribe(&self, id: u64) {
        let _ = self.tx.try_send(Command::Unregister(id));
    }

    pub fn broadcast(&self, message: SseMessage, audience: Audience) {
        let frame = message.to_frame();
        match self.tx.try_send(Command::Broadcast { frame, audience }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log::warn!("SSE command queue full, dropping {} event", message.event_type)
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }

    /// 订单变更只推给下单用户与管理员
    pub fn order_updated(&self, order: &order_entity::Model) {
        self.broadcast(
            SseMessage::order_update(order),
            Audience::OwnerAndAdmins(order.user_id.clone()),
        );
    }

    /// 客服/咨询提醒，仅管理员可见
    pub fn notify(&self, title: &str, content: &str) {
        self.broadcast(
            SseMessage::new(
                SseEventType::Notification,
                json!({ "title": title, "content": content }),
            ),
            Audience::Admins,
        );
    }

    pub async fn client_count(&self) -> AppResult<usize> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Count(reply))
            .await
            .map_err(|_| AppError::InternalError("SSE broadcaster is not running".into()))?;
        rx.await
            .map_err(|_| AppError::InternalError("SSE broadcaster is not running".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(user_id: &str) -> Subscriber {
        Subscriber {
            user_id: user_id.into(),
            is_admin: false,
        }
    }

    fn admin(user_id: &str) -> Subscriber {
        Subscriber {
            user_id: user_id.into(),
            is_admin: true,
        }
    }

    #[test]
    fn test_fan_out_drops_full_and_closed_clients() {
        let mut hub = SseHub::new(1);
        let (_fast_id, mut fast_rx) = hub.register(user("u1"));
        let (_slow_id, _slow_rx) = hub.register(user("u2"));
        let (_gone_id, gone_rx) = hub.register(user("u3"));
        drop(gone_rx);

        // 第一条：关闭的连接被移除
        assert_eq!(hub.fan_out("a", &Audience::Everyone), 2);
        assert_eq!(fast_rx.try_recv().unwrap(), "a");

        // 第二条：slow 未消费，缓冲已满被移除
        assert_eq!(hub.fan_out("b", &Audience::Everyone), 1);
        assert_eq!(fast_rx.try_recv().unwrap(), "b");
    }

    #[test]
    fn test_order_frames_reach_only_owner_and_admins() {
        let mut hub = SseHub::new(4);
        let (_, mut owner_rx) = hub.register(user("buyer"));
        let (_, mut other_rx) = hub.register(user("stranger"));
        let (_, mut admin_rx) = hub.register(admin("boss"));

        hub.fan_out("order", &Audience::OwnerAndAdmins("buyer".into()));
        assert_eq!(owner_rx.try_recv().unwrap(), "order");
        assert_eq!(admin_rx.try_recv().unwrap(), "order");
        assert!(other_rx.try_recv().is_err());

        hub.fan_out("notice", &Audience::Admins);
        assert_eq!(admin_rx.try_recv().unwrap(), "notice");
        assert!(owner_rx.try_recv().is_err());
        // 被跳过的订阅者不受影响
        assert_eq!(hub.clients.len(), 3);
    }

    #[test]
    fn test_frame_format() {
        let frame = SseMessage::new(SseEventType::SystemMessage, json!({"x": 1})).to_frame();
        assert!(frame.starts_with("data: {"));
        assert!(frame.ends_with("\n\n"));
        let body: Value = serde_json::from_str(frame.trim_start_matches("data: ").trim()).unwrap();
        assert_eq!(body["type"], "systemMessage");
        assert_eq!(body["data"]["x"], 1);
        assert!(body["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_actor_broadcast_and_shutdown() {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (sse, handle) = SseBroadcaster::spawn(8, stop_rx);

        let mut sub = sse.subscribe(admin("boss")).await.unwrap();
        let mut plain = sse.subscribe(user("u1")).await.unwrap();
        assert_eq!(sse.client_count().await.unwrap(), 2);

        sse.notify("新消息", "hello");
        let frame = sub.receiver.recv().await.unwrap();
        assert!(frame.contains("\"notification\""));
        // count 请求排在广播之后，返回时分发已完成
        assert_eq!(sse.client_count().await.unwrap(), 2);
        assert!(plain.receiver.try_recv().is_err());

        drop(sub);
        drop(plain);
        assert_eq!(sse.client_count().await.unwrap(), 0);

        stop_tx.send(true).unwrap();
        handle.await.unwrap();
        assert!(sse.client_count().await.is_err());
    }
}
