use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Consultations {
    Table,
    Id,
    UserId,
    UserName,
    UserPhone,
    Status,
    LastMessageAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ConsultationMessages {
    Table,
    Id,
    ConsultationId,
    SenderType,
    Content,
    IsRead,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ConsultationNotifications {
    Table,
    Id,
    ConsultationId,
    NotificationType,
    Title,
    Content,
    IsRead,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Consultations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Consultations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Consultations::UserId).string_len(24).not_null())
                    .col(ColumnDef::new(Consultations::UserName).string_len(128).not_null())
                    .col(ColumnDef::new(Consultations::UserPhone).string_len(20).null())
                    .col(
                        ColumnDef::new(Consultations::Status)
                            .string_len(20)
                            .not_null()
                            .default("waiting"),
                    )
                    .col(ColumnDef::new(Consultations::LastMessageAt).timestamp().null())
                    .col(
                        ColumnDef::new(Consultations::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Consultations::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_consultations_user")
                    .table(Consultations::Table)
                    .col(Consultations::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConsultationMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConsultationMessages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConsultationMessages::ConsultationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsultationMessages::SenderType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConsultationMessages::Content).text().not_null())
                    .col(
                        ColumnDef::new(ConsultationMessages::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ConsultationMessages::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_consultation_messages_consultation")
                    .table(ConsultationMessages::Table)
                    .col(ConsultationMessages::ConsultationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConsultationNotifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConsultationNotifications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConsultationNotifications::ConsultationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsultationNotifications::NotificationType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConsultationNotifications::Title)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ConsultationNotifications::Content).text().null())
                    .col(
                        ColumnDef::new(ConsultationNotifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ConsultationNotifications::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(ConsultationNotifications::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(ConsultationMessages::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Consultations::Table).to_owned())
            .await?;
        Ok(())
    }
}
