use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 提现状态：0 待审核 -> {1 已通过, 2 已拒绝}；1 -> 3 已到账
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum CashoutStatus {
    #[sea_orm(num_value = 0)]
    Pending,
    #[sea_orm(num_value = 1)]
    Approved,
    #[sea_orm(num_value = 2)]
    Rejected,
    #[sea_orm(num_value = 3)]
    Paid,
}

impl CashoutStatus {
    pub fn text(&self) -> &'static str {
        match self {
            CashoutStatus::Pending => "待审核",
            CashoutStatus::Approved => "已通过",
            CashoutStatus::Rejected => "已拒绝",
            CashoutStatus::Paid => "已到账",
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(CashoutStatus::Pending),
            1 => Some(CashoutStatus::Approved),
            2 => Some(CashoutStatus::Rejected),
            3 => Some(CashoutStatus::Paid),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
pub enum CashoutMethod {
    #[sea_orm(string_value = "wechat")]
    Wechat,
    #[sea_orm(string_value = "alipay")]
    Alipay,
    #[sea_orm(string_value = "bank")]
    Bank,
}

impl CashoutMethod {
    pub fn text(&self) -> &'static str {
        match self {
            CashoutMethod::Wechat => "微信",
            CashoutMethod::Alipay => "支付宝",
            CashoutMethod::Bank => "银行卡",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "wechat" => Some(CashoutMethod::Wechat),
            "alipay" => Some(CashoutMethod::Alipay),
            "bank" => Some(CashoutMethod::Bank),
            _ => None,
        }
    }
}

impl std::fmt::Display for CashoutMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CashoutMethod::Wechat => write!(f, "wechat"),
            CashoutMethod::Alipay => write!(f, "alipay"),
            CashoutMethod::Bank => write!(f, "bank"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cashouts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub amount: f64,
    pub method: CashoutMethod,
    pub account: String,
    pub status: CashoutStatus,
    pub remark: Option<String>,
    pub process_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
