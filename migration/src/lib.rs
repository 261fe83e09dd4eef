pub use sea_orm_migration::prelude::*;

mod m20250101_000000_init_schema;
mod m20250101_000001_allocation;
mod m20250101_000002_trading;
mod m20250101_000003_policy_auction;
mod m20250101_000004_invite_codes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000000_init_schema::Migration),
            Box::new(m20250101_000001_allocation::Migration),
            Box::new(m20250101_000002_trading::Migration),
            Box::new(m20250101_000003_policy_auction::Migration),
            Box::new(m20250101_000004_invite_codes::Migration),
        ]
    }
}
