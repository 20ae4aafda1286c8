use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 订单状态
/// 0 待支付 -> 1 已支付 -> {2 已完成, 4 已退款}；0 -> 3 已取消
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum OrderStatus {
    #[sea_orm(num_value = 0)]
    Pending,
    #[sea_orm(num_value = 1)]
    Paid,
    #[sea_orm(num_value = 2)]
    Completed,
    #[sea_orm(num_value = 3)]
    Cancelled,
    #[sea_orm(num_value = 4)]
    Refunded,
}

impl OrderStatus {
    pub fn text(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "待支付",
            OrderStatus::Paid => "已支付",
            OrderStatus::Completed => "已完成",
            OrderStatus::Cancelled => "已取消",
            OrderStatus::Refunded => "已退款",
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(OrderStatus::Pending),
            1 => Some(OrderStatus::Paid),
            2 => Some(OrderStatus::Completed),
            3 => Some(OrderStatus::Cancelled),
            4 => Some(OrderStatus::Refunded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum PayStatus {
    #[sea_orm(num_value = 0)]
    Unpaid,
    #[sea_orm(num_value = 1)]
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum RefundStatus {
    #[sea_orm(num_value = 0)]
    None,
    #[sea_orm(num_value = 1)]
    Processing,
    #[sea_orm(num_value = 2)]
    Refunded,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub order_no: String,
    pub user_id: String,
    pub service_id: i64,
    pub patient_id: i64,
    pub address_id: i64,
    pub appointment_date: String,
    pub appointment_time: String,
    pub disease_info: Option<String>,
    pub need_toilet_assist: i32,
    pub service_name: String,
    pub price: f64,
    pub quantity: i32,
    pub total_amount: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub form_data: Option<String>,
    pub status: OrderStatus,
    pub pay_status: PayStatus,
    pub pay_deadline: Option<DateTime<Utc>>,
    pub pay_time: Option<DateTime<Utc>>,
    pub pay_method: Option<String>,
    pub transaction_id: Option<String>,
    pub refund_status: RefundStatus,
    pub refund_time: Option<DateTime<Utc>>,
    pub refund_amount: f64,
    pub refund_reason: Option<String>,
    pub remark: Option<String>,
    /// 推荐人 user_id，为空表示无推荐人
    pub referrer_id: Option<String>,
    /// 下单时预计算的佣金
    pub commission: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 是否存在有效推荐人
    pub fn has_referrer(&self) -> bool {
        self.referrer_id.as_deref().is_some_and(|r| !r.is_empty())
    }
}
