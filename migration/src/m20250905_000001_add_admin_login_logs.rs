use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum AdminLoginLogs {
    Table,
    Id,
    AdminUserId,
    Username,
    LoginIp,
    UserAgent,
    Status,
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
                    .table(AdminLoginLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminLoginLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminLoginLogs::AdminUserId).string_len(24).null())
                    .col(ColumnDef::new(AdminLoginLogs::Username).string_len(64).not_null())
                    .col(ColumnDef::new(AdminLoginLogs::LoginIp).string_len(64).null())
                    .col(ColumnDef::new(AdminLoginLogs::UserAgent).string_len(512).null())
                    .col(ColumnDef::new(AdminLoginLogs::Status).integer().not_null())
                    .col(
                        ColumnDef::new(AdminLoginLogs::CreatedAt)
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
                    .name("idx_admin_login_logs_created")
                    .table(AdminLoginLogs::Table)
                    .col(AdminLoginLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(AdminLoginLogs::Table).to_owned())
            .await?;
        Ok(())
    }
}
