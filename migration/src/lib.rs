pub use sea_orm_migration::prelude::*;

mod m20250901_000001_initial;
mod m20250901_000002_add_content_tables;
mod m20250901_000003_add_consultations;
mod m20250905_000001_add_admin_login_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_initial::Migration),
            Box::new(m20250901_000002_add_content_tables::Migration),
            Box::new(m20250901_000003_add_consultations::Migration),
            Box::new(m20250905_000001_add_admin_login_logs::Migration),
        ]
    }
}
