use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    UserId,
    OpenId,
    UnionId,
    NickName,
    AvatarUrl,
    Gender,
    Phone,
    Country,
    Province,
    City,
    Language,
    SessionKey,
    IsAdmin,
    AdminLevel,
    ParentAdminId,
    AdminUsername,
    AdminPassword,
    AdminCreatedAt,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ServiceItems {
    Table,
    Id,
    Name,
    Description,
    Category,
    Price,
    OriginalPrice,
    ImageUrl,
    DetailImages,
    FormConfig,
    Status,
    Sort,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderNo,
    UserId,
    ServiceId,
    PatientId,
    AddressId,
    AppointmentDate,
    AppointmentTime,
    DiseaseInfo,
    NeedToiletAssist,
    ServiceName,
    Price,
    Quantity,
    TotalAmount,
    FormData,
    Status,
    PayStatus,
    PayDeadline,
    PayTime,
    PayMethod,
    TransactionId,
    RefundStatus,
    RefundTime,
    RefundAmount,
    RefundReason,
    Remark,
    ReferrerId,
    Commission,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Referrals {
    Table,
    Id,
    UserId,
    ReferrerId,
    PromoterCode,
    QrCodeUrl,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Commissions {
    Table,
    Id,
    UserId,
    OrderId,
    OrderNo,
    Amount,
    Rate,
    Status,
    CashoutTime,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Cashouts {
    Table,
    Id,
    UserId,
    Amount,
    Method,
    Account,
    Status,
    Remark,
    ProcessTime,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserAddresses {
    Table,
    Id,
    UserId,
    Name,
    Phone,
    Province,
    City,
    District,
    Address,
    IsDefault,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Patients {
    Table,
    Id,
    UserId,
    Name,
    IdCard,
    Phone,
    Gender,
    Birthday,
    Relation,
    IsDefault,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn created_at<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

/// 用户、订单、推荐/佣金/提现、地址与就诊人
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut id_col(Users::Id))
                    .col(ColumnDef::new(Users::UserId).string_len(24).not_null().unique_key())
                    .col(ColumnDef::new(Users::OpenId).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Users::UnionId).string_len(64).null())
                    .col(ColumnDef::new(Users::NickName).string_len(128).not_null().default(""))
                    .col(ColumnDef::new(Users::AvatarUrl).string_len(512).not_null().default(""))
                    .col(ColumnDef::new(Users::Gender).integer().not_null().default(0))
                    .col(ColumnDef::new(Users::Phone).string_len(20).null())
                    .col(ColumnDef::new(Users::Country).string_len(64).not_null().default(""))
                    .col(ColumnDef::new(Users::Province).string_len(64).not_null().default(""))
                    .col(ColumnDef::new(Users::City).string_len(64).not_null().default(""))
                    .col(ColumnDef::new(Users::Language).string_len(32).not_null().default(""))
                    .col(ColumnDef::new(Users::SessionKey).string_len(128).null())
                    .col(ColumnDef::new(Users::IsAdmin).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::AdminLevel).integer().not_null().default(0))
                    .col(ColumnDef::new(Users::ParentAdminId).string_len(24).null())
                    .col(ColumnDef::new(Users::AdminUsername).string_len(64).null().unique_key())
                    .col(ColumnDef::new(Users::AdminPassword).string_len(128).null())
                    .col(ColumnDef::new(Users::AdminCreatedAt).timestamp().null())
                    .col(ColumnDef::new(Users::LastLoginAt).timestamp().null())
                    .col(&mut created_at(Users::CreatedAt))
                    .col(&mut created_at(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ServiceItems::Table)
                    .if_not_exists()
                    .col(&mut id_col(ServiceItems::Id))
                    .col(ColumnDef::new(ServiceItems::Name).string_len(128).not_null())
                    .col(ColumnDef::new(ServiceItems::Description).text().null())
                    .col(ColumnDef::new(ServiceItems::Category).string_len(64).not_null())
                    .col(ColumnDef::new(ServiceItems::Price).double().not_null())
                    .col(ColumnDef::new(ServiceItems::OriginalPrice).double().not_null().default(0.0))
                    .col(ColumnDef::new(ServiceItems::ImageUrl).string_len(512).null())
                    .col(ColumnDef::new(ServiceItems::DetailImages).text().null())
                    .col(ColumnDef::new(ServiceItems::FormConfig).text().null())
                    .col(ColumnDef::new(ServiceItems::Status).integer().not_null().default(1))
                    .col(ColumnDef::new(ServiceItems::Sort).integer().not_null().default(0))
                    .col(&mut created_at(ServiceItems::CreatedAt))
                    .col(&mut created_at(ServiceItems::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(&mut id_col(Orders::Id))
                    .col(ColumnDef::new(Orders::OrderNo).string_len(32).not_null().unique_key())
                    .col(ColumnDef::new(Orders::UserId).string_len(24).not_null())
                    .col(ColumnDef::new(Orders::ServiceId).big_integer().not_null())
                    .col(ColumnDef::new(Orders::PatientId).big_integer().not_null())
                    .col(ColumnDef::new(Orders::AddressId).big_integer().not_null())
                    .col(ColumnDef::new(Orders::AppointmentDate).string_len(10).not_null())
                    .col(ColumnDef::new(Orders::AppointmentTime).string_len(5).not_null())
                    .col(ColumnDef::new(Orders::DiseaseInfo).string_len(1024).null())
                    .col(ColumnDef::new(Orders::NeedToiletAssist).integer().not_null().default(0))
                    .col(ColumnDef::new(Orders::ServiceName).string_len(128).not_null())
                    .col(ColumnDef::new(Orders::Price).double().not_null())
                    .col(ColumnDef::new(Orders::Quantity).integer().not_null().default(1))
                    .col(ColumnDef::new(Orders::TotalAmount).double().not_null())
                    .col(ColumnDef::new(Orders::FormData).text().null())
                    .col(ColumnDef::new(Orders::Status).integer().not_null().default(0))
                    .col(ColumnDef::new(Orders::PayStatus).integer().not_null().default(0))
                    .col(ColumnDef::new(Orders::PayDeadline).timestamp().null())
                    .col(ColumnDef::new(Orders::PayTime).timestamp().null())
                    .col(ColumnDef::new(Orders::PayMethod).string_len(16).null())
                    .col(ColumnDef::new(Orders::TransactionId).string_len(64).null())
                    .col(ColumnDef::new(Orders::RefundStatus).integer().not_null().default(0))
                    .col(ColumnDef::new(Orders::RefundTime).timestamp().null())
                    .col(ColumnDef::new(Orders::RefundAmount).double().not_null().default(0.0))
                    .col(ColumnDef::new(Orders::RefundReason).string_len(512).null())
                    .col(ColumnDef::new(Orders::Remark).string_len(512).null())
                    .col(ColumnDef::new(Orders::ReferrerId).string_len(24).null())
                    .col(ColumnDef::new(Orders::Commission).double().not_null().default(0.0))
                    .col(&mut created_at(Orders::CreatedAt))
                    .col(&mut created_at(Orders::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_user")
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .to_owned(),
            )
            .await?;

        // 超时取消扫描索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_pending_deadline")
                    .table(Orders::Table)
                    .col(Orders::Status)
                    .col(Orders::PayStatus)
                    .col(Orders::PayDeadline)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Referrals::Table)
                    .if_not_exists()
                    .col(&mut id_col(Referrals::Id))
                    .col(ColumnDef::new(Referrals::UserId).string_len(24).not_null().unique_key())
                    .col(ColumnDef::new(Referrals::ReferrerId).string_len(24).null())
                    .col(ColumnDef::new(Referrals::PromoterCode).string_len(8).null().unique_key())
                    .col(ColumnDef::new(Referrals::QrCodeUrl).string_len(512).null())
                    .col(ColumnDef::new(Referrals::Status).integer().not_null().default(1))
                    .col(&mut created_at(Referrals::CreatedAt))
                    .col(&mut created_at(Referrals::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_referrals_referrer")
                    .table(Referrals::Table)
                    .col(Referrals::ReferrerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Commissions::Table)
                    .if_not_exists()
                    .col(&mut id_col(Commissions::Id))
                    .col(ColumnDef::new(Commissions::UserId).string_len(24).not_null())
                    .col(ColumnDef::new(Commissions::OrderId).big_integer().not_null().unique_key())
                    .col(ColumnDef::new(Commissions::OrderNo).string_len(32).not_null())
                    .col(ColumnDef::new(Commissions::Amount).double().not_null())
                    .col(ColumnDef::new(Commissions::Rate).double().not_null())
                    .col(ColumnDef::new(Commissions::Status).integer().not_null().default(0))
                    .col(ColumnDef::new(Commissions::CashoutTime).timestamp().null())
                    .col(&mut created_at(Commissions::CreatedAt))
                    .col(&mut created_at(Commissions::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_commissions_user_status")
                    .table(Commissions::Table)
                    .col(Commissions::UserId)
                    .col(Commissions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Cashouts::Table)
                    .if_not_exists()
                    .col(&mut id_col(Cashouts::Id))
                    .col(ColumnDef::new(Cashouts::UserId).string_len(24).not_null())
                    .col(ColumnDef::new(Cashouts::Amount).double().not_null())
                    .col(ColumnDef::new(Cashouts::Method).string_len(16).not_null())
                    .col(ColumnDef::new(Cashouts::Account).string_len(128).not_null())
                    .col(ColumnDef::new(Cashouts::Status).integer().not_null().default(0))
                    .col(ColumnDef::new(Cashouts::Remark).string_len(512).null())
                    .col(ColumnDef::new(Cashouts::ProcessTime).timestamp().null())
                    .col(&mut created_at(Cashouts::CreatedAt))
                    .col(&mut created_at(Cashouts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cashouts_user")
                    .table(Cashouts::Table)
                    .col(Cashouts::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserAddresses::Table)
                    .if_not_exists()
                    .col(&mut id_col(UserAddresses::Id))
                    .col(ColumnDef::new(UserAddresses::UserId).string_len(24).not_null())
                    .col(ColumnDef::new(UserAddresses::Name).string_len(64).not_null())
                    .col(ColumnDef::new(UserAddresses::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(UserAddresses::Province).string_len(64).not_null().default(""))
                    .col(ColumnDef::new(UserAddresses::City).string_len(64).not_null().default(""))
                    .col(ColumnDef::new(UserAddresses::District).string_len(64).not_null().default(""))
                    .col(ColumnDef::new(UserAddresses::Address).string_len(255).not_null())
                    .col(ColumnDef::new(UserAddresses::IsDefault).boolean().not_null().default(false))
                    .col(ColumnDef::new(UserAddresses::Status).integer().not_null().default(1))
                    .col(&mut created_at(UserAddresses::CreatedAt))
                    .col(&mut created_at(UserAddresses::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_addresses_user")
                    .table(UserAddresses::Table)
                    .col(UserAddresses::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Patients::Table)
                    .if_not_exists()
                    .col(&mut id_col(Patients::Id))
                    .col(ColumnDef::new(Patients::UserId).string_len(24).not_null())
                    .col(ColumnDef::new(Patients::Name).string_len(64).not_null())
                    .col(ColumnDef::new(Patients::IdCard).string_len(18).null())
                    .col(ColumnDef::new(Patients::Phone).string_len(20).null())
                    .col(ColumnDef::new(Patients::Gender).integer().not_null().default(0))
                    .col(ColumnDef::new(Patients::Birthday).string_len(10).null())
                    .col(ColumnDef::new(Patients::Relation).string_len(32).null())
                    .col(ColumnDef::new(Patients::IsDefault).boolean().not_null().default(false))
                    .col(ColumnDef::new(Patients::Status).integer().not_null().default(1))
                    .col(&mut created_at(Patients::CreatedAt))
                    .col(&mut created_at(Patients::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_patients_user")
                    .table(Patients::Table)
                    .col(Patients::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Patients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(UserAddresses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Cashouts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Commissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Referrals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(ServiceItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
