use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username))
                    .col(string(Users::DisplayId))
                    .col(string_uniq(Users::Email))
                    .col(string(Users::PasswordHash).default(""))
                    .col(string_len(Users::Role, 20).default("executive"))
                    .col(boolean(Users::IsActive).default(false))
                    .col(string_null(Users::PasswordSetToken))
                    .col(timestamp_with_time_zone_null(Users::TokenExpiry))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create categories table
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(string_uniq(Categories::Name))
                    .col(boolean(Categories::IsActive).default(true))
                    .col(timestamp_with_time_zone(Categories::CreatedAt))
                    .col(timestamp_with_time_zone(Categories::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create budgets table
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(pk_auto(Budgets::Id))
                    .col(integer(Budgets::CategoryId))
                    .col(decimal_len(Budgets::Amount, 16, 4))
                    .col(integer(Budgets::Year))
                    .col(boolean(Budgets::IsLocked).default(false))
                    .col(timestamp_with_time_zone(Budgets::CreatedAt))
                    .col(timestamp_with_time_zone(Budgets::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_category")
                            .from(Budgets::Table, Budgets::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_budgets_category_year")
                    .table(Budgets::Table)
                    .col(Budgets::CategoryId)
                    .col(Budgets::Year)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Create expenses table
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(pk_auto(Expenses::Id))
                    .col(integer(Expenses::CategoryId))
                    .col(integer_null(Expenses::UserId))
                    .col(decimal_len(Expenses::Amount, 16, 4))
                    .col(date(Expenses::ExpenseDate))
                    .col(string(Expenses::Remarks).default(""))
                    .col(timestamp_with_time_zone(Expenses::CreatedAt))
                    .col(timestamp_with_time_zone(Expenses::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_category")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_user")
                            .from(Expenses::Table, Expenses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_expenses_category_date")
                    .table(Expenses::Table)
                    .col(Expenses::CategoryId)
                    .col(Expenses::ExpenseDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    DisplayId,
    Email,
    PasswordHash,
    Role,
    IsActive,
    PasswordSetToken,
    TokenExpiry,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Budgets {
    Table,
    Id,
    CategoryId,
    Amount,
    Year,
    IsLocked,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Expenses {
    Table,
    Id,
    CategoryId,
    UserId,
    Amount,
    ExpenseDate,
    Remarks,
    CreatedAt,
    UpdatedAt,
}
