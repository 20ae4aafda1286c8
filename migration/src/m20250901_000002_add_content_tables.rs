use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Banners {
    Table,
    Id,
    Title,
    ImageUrl,
    LinkUrl,
    Sort,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Navigations {
    Table,
    Id,
    Name,
    Icon,
    LinkUrl,
    Sort,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum HomeServices {
    Table,
    Id,
    ServiceItemId,
    Name,
    Description,
    Icon,
    ImageUrl,
    LinkUrl,
    Sort,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Hospitals {
    Table,
    Id,
    Name,
    Logo,
    Address,
    Phone,
    Description,
    Level,
    HospitalType,
    Longitude,
    Latitude,
    Sort,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum KefuMessages {
    Table,
    Id,
    UserId,
    UserName,
    UserAvatar,
    MessageType,
    Content,
    Images,
    Status,
    ReplyContent,
    ReplyTime,
    ReplyUserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Faqs {
    Table,
    Id,
    Question,
    Answer,
    Category,
    Sort,
    Status,
    ViewCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Files {
    Table,
    Id,
    FileName,
    OriginalName,
    FilePath,
    FileUrl,
    FileSize,
    FileType,
    MimeType,
    Category,
    Description,
    UserId,
    IsPublic,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Configs {
    Table,
    Id,
    ConfigKey,
    ConfigValue,
    Description,
    ValueType,
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

fn ts_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

/// 首页/医院/客服/文件/平台配置等目录类数据
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Banners::Table)
                    .if_not_exists()
                    .col(&mut id_col(Banners::Id))
                    .col(ColumnDef::new(Banners::Title).string_len(128).null())
                    .col(ColumnDef::new(Banners::ImageUrl).string_len(512).not_null())
                    .col(ColumnDef::new(Banners::LinkUrl).string_len(512).null())
                    .col(ColumnDef::new(Banners::Sort).integer().not_null().default(0))
                    .col(ColumnDef::new(Banners::Status).integer().not_null().default(1))
                    .col(&mut ts_col(Banners::CreatedAt))
                    .col(&mut ts_col(Banners::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Navigations::Table)
                    .if_not_exists()
                    .col(&mut id_col(Navigations::Id))
                    .col(ColumnDef::new(Navigations::Name).string_len(64).not_null())
                    .col(ColumnDef::new(Navigations::Icon).string_len(512).not_null())
                    .col(ColumnDef::new(Navigations::LinkUrl).string_len(512).null())
                    .col(ColumnDef::new(Navigations::Sort).integer().not_null().default(0))
                    .col(ColumnDef::new(Navigations::Status).integer().not_null().default(1))
                    .col(&mut ts_col(Navigations::CreatedAt))
                    .col(&mut ts_col(Navigations::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HomeServices::Table)
                    .if_not_exists()
                    .col(&mut id_col(HomeServices::Id))
                    .col(ColumnDef::new(HomeServices::ServiceItemId).big_integer().null())
                    .col(ColumnDef::new(HomeServices::Name).string_len(64).not_null())
                    .col(ColumnDef::new(HomeServices::Description).string_len(255).null())
                    .col(ColumnDef::new(HomeServices::Icon).string_len(512).not_null())
                    .col(ColumnDef::new(HomeServices::ImageUrl).string_len(512).null())
                    .col(ColumnDef::new(HomeServices::LinkUrl).string_len(512).null())
                    .col(ColumnDef::new(HomeServices::Sort).integer().not_null().default(0))
                    .col(ColumnDef::new(HomeServices::Status).integer().not_null().default(1))
                    .col(&mut ts_col(HomeServices::CreatedAt))
                    .col(&mut ts_col(HomeServices::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Hospitals::Table)
                    .if_not_exists()
                    .col(&mut id_col(Hospitals::Id))
                    .col(ColumnDef::new(Hospitals::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Hospitals::Logo).string_len(512).null())
                    .col(ColumnDef::new(Hospitals::Address).string_len(255).null())
                    .col(ColumnDef::new(Hospitals::Phone).string_len(32).null())
                    .col(ColumnDef::new(Hospitals::Description).text().null())
                    .col(ColumnDef::new(Hospitals::Level).string_len(32).null())
                    .col(ColumnDef::new(Hospitals::HospitalType).string_len(32).null())
                    .col(ColumnDef::new(Hospitals::Longitude).double().null())
                    .col(ColumnDef::new(Hospitals::Latitude).double().null())
                    .col(ColumnDef::new(Hospitals::Sort).integer().not_null().default(0))
                    .col(ColumnDef::new(Hospitals::Status).integer().not_null().default(1))
                    .col(&mut ts_col(Hospitals::CreatedAt))
                    .col(&mut ts_col(Hospitals::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(KefuMessages::Table)
                    .if_not_exists()
                    .col(&mut id_col(KefuMessages::Id))
                    .col(ColumnDef::new(KefuMessages::UserId).string_len(24).not_null())
                    .col(ColumnDef::new(KefuMessages::UserName).string_len(128).null())
                    .col(ColumnDef::new(KefuMessages::UserAvatar).string_len(512).null())
                    .col(ColumnDef::new(KefuMessages::MessageType).integer().not_null().default(1))
                    .col(ColumnDef::new(KefuMessages::Content).text().not_null())
                    .col(ColumnDef::new(KefuMessages::Images).text().null())
                    .col(ColumnDef::new(KefuMessages::Status).integer().not_null().default(0))
                    .col(ColumnDef::new(KefuMessages::ReplyContent).text().null())
                    .col(ColumnDef::new(KefuMessages::ReplyTime).timestamp().null())
                    .col(ColumnDef::new(KefuMessages::ReplyUserId).string_len(24).null())
                    .col(&mut ts_col(KefuMessages::CreatedAt))
                    .col(&mut ts_col(KefuMessages::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Faqs::Table)
                    .if_not_exists()
                    .col(&mut id_col(Faqs::Id))
                    .col(ColumnDef::new(Faqs::Question).string_len(255).not_null())
                    .col(ColumnDef::new(Faqs::Answer).text().not_null())
                    .col(ColumnDef::new(Faqs::Category).string_len(64).not_null())
                    .col(ColumnDef::new(Faqs::Sort).integer().not_null().default(0))
                    .col(ColumnDef::new(Faqs::Status).integer().not_null().default(1))
                    .col(ColumnDef::new(Faqs::ViewCount).integer().not_null().default(0))
                    .col(&mut ts_col(Faqs::CreatedAt))
                    .col(&mut ts_col(Faqs::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(&mut id_col(Files::Id))
                    .col(ColumnDef::new(Files::FileName).string_len(255).not_null())
                    .col(ColumnDef::new(Files::OriginalName).string_len(255).not_null())
                    .col(ColumnDef::new(Files::FilePath).string_len(512).not_null())
                    .col(ColumnDef::new(Files::FileUrl).string_len(1024).not_null())
                    .col(ColumnDef::new(Files::FileSize).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Files::FileType).string_len(32).not_null())
                    .col(ColumnDef::new(Files::MimeType).string_len(128).not_null())
                    .col(ColumnDef::new(Files::Category).string_len(64).null())
                    .col(ColumnDef::new(Files::Description).string_len(255).null())
                    .col(ColumnDef::new(Files::UserId).string_len(24).not_null())
                    .col(ColumnDef::new(Files::IsPublic).boolean().not_null().default(false))
                    .col(ColumnDef::new(Files::Status).integer().not_null().default(1))
                    .col(&mut ts_col(Files::CreatedAt))
                    .col(&mut ts_col(Files::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_files_user")
                    .table(Files::Table)
                    .col(Files::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Configs::Table)
                    .if_not_exists()
                    .col(&mut id_col(Configs::Id))
                    .col(ColumnDef::new(Configs::ConfigKey).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Configs::ConfigValue).text().not_null())
                    .col(ColumnDef::new(Configs::Description).string_len(255).null())
                    .col(ColumnDef::new(Configs::ValueType).string_len(16).null())
                    .col(ColumnDef::new(Configs::Status).integer().not_null().default(1))
                    .col(&mut ts_col(Configs::CreatedAt))
                    .col(&mut ts_col(Configs::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Configs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Files::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Faqs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(KefuMessages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Hospitals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(HomeServices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Navigations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Banners::Table).to_owned())
            .await?;
        Ok(())
    }
}
