use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Players and admins. club_id is a plain column, clubs point back at users.
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(50).not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Nickname).string_len(50).not_null())
                    .col(ColumnDef::new(Users::IsAdmin).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::IsRegistered).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::Space).integer().not_null().default(0))
                    .col(ColumnDef::new(Users::UsedSpace).integer().not_null().default(0))
                    .col(ColumnDef::new(Users::ClubId).integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Generals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Generals::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Generals::ExternalId).integer().not_null().unique_key())
                    .col(ColumnDef::new(Generals::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Generals::Command).integer().not_null().default(0))
                    .col(ColumnDef::new(Generals::Force).integer().not_null().default(0))
                    .col(ColumnDef::new(Generals::Intelligence).integer().not_null().default(0))
                    .col(ColumnDef::new(Generals::Politics).integer().not_null().default(0))
                    .col(ColumnDef::new(Generals::Charm).integer().not_null().default(0))
                    .col(ColumnDef::new(Generals::Affinity).integer().not_null().default(0))
                    .col(ColumnDef::new(Generals::Spear).string_len(4).not_null().default(""))
                    .col(ColumnDef::new(Generals::Halberd).string_len(4).not_null().default(""))
                    .col(ColumnDef::new(Generals::Crossbow).string_len(4).not_null().default(""))
                    .col(ColumnDef::new(Generals::Cavalry).string_len(4).not_null().default(""))
                    .col(ColumnDef::new(Generals::Soldier).string_len(4).not_null().default(""))
                    .col(ColumnDef::new(Generals::Water).string_len(4).not_null().default(""))
                    .col(ColumnDef::new(Generals::Skills).string().not_null().default(""))
                    .col(ColumnDef::new(Generals::Note).string().not_null().default(""))
                    .col(ColumnDef::new(Generals::PoolType).string_len(20).not_null())
                    .col(ColumnDef::new(Generals::Tier).string_len(20).not_null().default(""))
                    .col(ColumnDef::new(Generals::Salary).integer().not_null().default(0))
                    .col(ColumnDef::new(Generals::OwnerId).uuid().null())
                    .col(ColumnDef::new(Generals::IsAvailable).boolean().not_null().default(true))
                    .col(ColumnDef::new(Generals::InjuredUntil).integer().null())
                    .col(ColumnDef::new(Generals::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Generals::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_generals_owner_id")
                            .from(Generals::Table, Generals::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_generals_pool_available")
                    .table(Generals::Table)
                    .col(Generals::PoolType)
                    .col(Generals::IsAvailable)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Treasures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Treasures::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Treasures::ExternalId).integer().not_null().unique_key())
                    .col(ColumnDef::new(Treasures::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Treasures::Kind).string_len(20).not_null().default(""))
                    .col(ColumnDef::new(Treasures::Value).integer().not_null().default(0))
                    .col(ColumnDef::new(Treasures::Effect).string().not_null().default(""))
                    .col(ColumnDef::new(Treasures::Skill).string().not_null().default(""))
                    .col(ColumnDef::new(Treasures::OwnerId).uuid().null())
                    .col(ColumnDef::new(Treasures::IsAvailable).boolean().not_null().default(true))
                    .col(ColumnDef::new(Treasures::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Treasures::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_treasures_owner_id")
                            .from(Treasures::Table, Treasures::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Clubs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clubs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clubs::ExternalId).integer().not_null().unique_key())
                    .col(ColumnDef::new(Clubs::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Clubs::Description).string().not_null().default(""))
                    .col(ColumnDef::new(Clubs::BasePrice).integer().not_null().default(0))
                    .col(ColumnDef::new(Clubs::League).string_len(50).null())
                    .col(ColumnDef::new(Clubs::Tags).json().not_null())
                    .col(ColumnDef::new(Clubs::OwnerId).uuid().null())
                    .col(ColumnDef::new(Clubs::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Clubs::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clubs_owner_id")
                            .from(Clubs::Table, Clubs::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClubPolicies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClubPolicies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClubPolicies::ClubId).integer().not_null())
                    .col(ColumnDef::new(ClubPolicies::SortOrder).integer().not_null().default(0))
                    .col(ColumnDef::new(ClubPolicies::Condition).string().not_null().default(""))
                    .col(ColumnDef::new(ClubPolicies::Effect).string().not_null().default(""))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_club_policies_club_id")
                            .from(ClubPolicies::Table, ClubPolicies::ClubId)
                            .to(Clubs::Table, Clubs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Cities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cities::ExternalId).integer().not_null().unique_key())
                    .col(ColumnDef::new(Cities::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Cities::Specialty).string().not_null().default(""))
                    .col(ColumnDef::new(Cities::MaxSoldiers).integer().not_null().default(0))
                    .col(ColumnDef::new(Cities::GoldIncome).integer().not_null().default(0))
                    .col(ColumnDef::new(Cities::FoodIncome).integer().not_null().default(0))
                    .col(ColumnDef::new(Cities::Durability).integer().not_null().default(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GameRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameRules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GameRules::Category).string_len(50).not_null())
                    .col(ColumnDef::new(GameRules::Title).string().not_null())
                    .col(ColumnDef::new(GameRules::Content).text().not_null())
                    .col(ColumnDef::new(GameRules::SortOrder).integer().not_null().default(0))
                    .to_owned(),
            )
            .await?;

        // Single-row season state, versioned on every write
        manager
            .create_table(
                Table::create()
                    .table(GamePhase::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GamePhase::Id).integer().not_null().primary_key())
                    .col(ColumnDef::new(GamePhase::CurrentPhase).string_len(20).not_null())
                    .col(ColumnDef::new(GamePhase::RoundNumber).integer().not_null().default(1))
                    .col(ColumnDef::new(GamePhase::DraftRound).integer().not_null().default(0))
                    .col(ColumnDef::new(GamePhase::DraftOrder).json().not_null())
                    .col(ColumnDef::new(GamePhase::Version).integer().not_null().default(0))
                    .col(ColumnDef::new(GamePhase::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GamePhase::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClubPolicies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clubs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Treasures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Generals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Nickname,
    IsAdmin,
    IsRegistered,
    Space,
    UsedSpace,
    ClubId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Generals {
    Table,
    Id,
    ExternalId,
    Name,
    Command,
    Force,
    Intelligence,
    Politics,
    Charm,
    Affinity,
    Spear,
    Halberd,
    Crossbow,
    Cavalry,
    Soldier,
    Water,
    Skills,
    Note,
    PoolType,
    Tier,
    Salary,
    OwnerId,
    IsAvailable,
    InjuredUntil,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Treasures {
    Table,
    Id,
    ExternalId,
    Name,
    Kind,
    Value,
    Effect,
    Skill,
    OwnerId,
    IsAvailable,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Clubs {
    Table,
    Id,
    ExternalId,
    Name,
    Description,
    BasePrice,
    League,
    Tags,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ClubPolicies {
    Table,
    Id,
    ClubId,
    SortOrder,
    Condition,
    Effect,
}

#[derive(DeriveIden)]
enum Cities {
    Table,
    Id,
    ExternalId,
    Name,
    Specialty,
    MaxSoldiers,
    GoldIncome,
    FoodIncome,
    Durability,
}

#[derive(DeriveIden)]
enum GameRules {
    Table,
    Id,
    Category,
    Title,
    Content,
    SortOrder,
}

#[derive(DeriveIden)]
enum GamePhase {
    Table,
    Id,
    CurrentPhase,
    RoundNumber,
    DraftRound,
    DraftOrder,
    Version,
    UpdatedAt,
}
