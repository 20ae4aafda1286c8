use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 佣金状态：0 待结算 -> 1 已结算 -> 2 已提现
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum CommissionStatus {
    #[sea_orm(num_value = 0)]
    Pending,
    #[sea_orm(num_value = 1)]
    Settled,
    #[sea_orm(num_value = 2)]
    Withdrawn,
}

impl CommissionStatus {
    pub fn text(&self) -> &'static str {
        match self {
            CommissionStatus::Pending => "待结算",
            CommissionStatus::Settled => "已结算",
            CommissionStatus::Withdrawn => "已提现",
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(CommissionStatus::Pending),
            1 => Some(CommissionStatus::Settled),
            2 => Some(CommissionStatus::Withdrawn),
            _ => None,
        }
    }
}

/// 佣金记录：一单一条，金额创建后不再修改
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "commissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 推荐人 user_id
    pub user_id: String,
    pub order_id: i64,
    pub order_no: String,
    pub amount: f64,
    pub rate: f64,
    pub status: CommissionStatus,
    pub cashout_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
