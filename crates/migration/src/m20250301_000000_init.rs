//! Initial schema for the credit ledger.
//!
//! - `teams`: participants and their credit balance
//! - `resources`: the catalog, with remaining stock and per-team quota
//! - `purchases`: requests linking a team to a resource
//! - `polls` / `votes`: credit-staked voting, one vote per team and poll
//! - `team_compositions`: per-department seat counters

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Teams {
    Table,
    Id,
    Name,
    Email,
    Credit,
    LastActivity,
    CreatedAt,
}

#[derive(Iden)]
enum Resources {
    Table,
    Id,
    Name,
    Description,
    Cost,
    Quantity,
    MaxPerTeam,
    Kind,
    ImageUrl,
    IsActive,
    IsNonReturnable,
}

#[derive(Iden)]
enum Purchases {
    Table,
    Id,
    BatchId,
    TeamId,
    ResourceId,
    Quantity,
    RequestedQuantity,
    Comment,
    PurchaseDate,
    Status,
    IsReturned,
    NeedsReturn,
}

#[derive(Iden)]
enum Polls {
    Table,
    Id,
    Question,
    Options,
    StartDate,
    EndDate,
    Status,
}

#[derive(Iden)]
enum Votes {
    Table,
    Id,
    TeamId,
    PollId,
    ChosenOption,
    CreditStaked,
    VoteDate,
}

#[derive(Iden)]
enum TeamCompositions {
    Table,
    Id,
    Name,
    DevTotal,
    InfraTotal,
    DataTotal,
    IotTotal,
    SysembTotal,
    DevFilled,
    InfraFilled,
    DataFilled,
    IotFilled,
    SysembFilled,
}

fn id_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn counter<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name).integer().not_null().default(0).to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Teams
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(&mut id_column(Teams::Id))
                    .col(ColumnDef::new(Teams::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Teams::Email).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Teams::Credit)
                            .big_integer()
                            .not_null()
                            .default(1000),
                    )
                    .col(
                        ColumnDef::new(Teams::LastActivity)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Teams::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Resources
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Resources::Table)
                    .if_not_exists()
                    .col(&mut id_column(Resources::Id))
                    .col(ColumnDef::new(Resources::Name).string().not_null())
                    .col(
                        ColumnDef::new(Resources::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Resources::Cost).big_integer().not_null())
                    .col(ColumnDef::new(Resources::Quantity).big_integer().not_null())
                    .col(ColumnDef::new(Resources::MaxPerTeam).big_integer().not_null())
                    .col(ColumnDef::new(Resources::Kind).string().not_null())
                    .col(ColumnDef::new(Resources::ImageUrl).string())
                    .col(
                        ColumnDef::new(Resources::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Resources::IsNonReturnable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-resources-kind")
                    .table(Resources::Table)
                    .col(Resources::Kind)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Purchases
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(&mut id_column(Purchases::Id))
                    .col(ColumnDef::new(Purchases::BatchId).string())
                    .col(ColumnDef::new(Purchases::TeamId).big_integer().not_null())
                    .col(ColumnDef::new(Purchases::ResourceId).big_integer().not_null())
                    .col(ColumnDef::new(Purchases::Quantity).big_integer().not_null())
                    .col(
                        ColumnDef::new(Purchases::RequestedQuantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Purchases::Comment)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Purchases::PurchaseDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Purchases::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Purchases::IsReturned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Purchases::NeedsReturn)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchases-team_id")
                            .from(Purchases::Table, Purchases::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchases-resource_id")
                            .from(Purchases::Table, Purchases::ResourceId)
                            .to(Resources::Table, Resources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Quota lookups: confirmed purchases of one resource by one team.
        manager
            .create_index(
                Index::create()
                    .name("idx-purchases-team_id-resource_id-status")
                    .table(Purchases::Table)
                    .col(Purchases::TeamId)
                    .col(Purchases::ResourceId)
                    .col(Purchases::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchases-status")
                    .table(Purchases::Table)
                    .col(Purchases::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchases-batch_id")
                    .table(Purchases::Table)
                    .col(Purchases::BatchId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Polls
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Polls::Table)
                    .if_not_exists()
                    .col(&mut id_column(Polls::Id))
                    .col(ColumnDef::new(Polls::Question).text().not_null())
                    .col(ColumnDef::new(Polls::Options).text().not_null())
                    .col(
                        ColumnDef::new(Polls::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Polls::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Polls::Status)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Votes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Votes::Table)
                    .if_not_exists()
                    .col(&mut id_column(Votes::Id))
                    .col(ColumnDef::new(Votes::TeamId).big_integer().not_null())
                    .col(ColumnDef::new(Votes::PollId).big_integer().not_null())
                    .col(ColumnDef::new(Votes::ChosenOption).string().not_null())
                    .col(ColumnDef::new(Votes::CreditStaked).big_integer().not_null())
                    .col(
                        ColumnDef::new(Votes::VoteDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-votes-team_id")
                            .from(Votes::Table, Votes::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-votes-poll_id")
                            .from(Votes::Table, Votes::PollId)
                            .to(Polls::Table, Polls::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-votes-team_id-poll_id-unique")
                    .table(Votes::Table)
                    .col(Votes::TeamId)
                    .col(Votes::PollId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Team compositions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TeamCompositions::Table)
                    .if_not_exists()
                    .col(&mut id_column(TeamCompositions::Id))
                    .col(
                        ColumnDef::new(TeamCompositions::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(&mut counter(TeamCompositions::DevTotal))
                    .col(&mut counter(TeamCompositions::InfraTotal))
                    .col(&mut counter(TeamCompositions::DataTotal))
                    .col(&mut counter(TeamCompositions::IotTotal))
                    .col(&mut counter(TeamCompositions::SysembTotal))
                    .col(&mut counter(TeamCompositions::DevFilled))
                    .col(&mut counter(TeamCompositions::InfraFilled))
                    .col(&mut counter(TeamCompositions::DataFilled))
                    .col(&mut counter(TeamCompositions::IotFilled))
                    .col(&mut counter(TeamCompositions::SysembFilled))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeamCompositions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Votes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Polls::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Purchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Resources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        Ok(())
    }
}
