use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// Annual allocation for one category. At most one row per (category, year).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub category_id: i32,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    pub year: i32,
    /// Manual circuit breaker. While set, no expenses may be recorded
    /// against this category for this year.
    #[sea_orm(default_value = "false")]
    pub is_locked: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
    /// Selects the budget row for a (category, year) pair.
    pub fn find_for(category_id: i32, year: i32) -> Select<Entity> {
        Self::find()
            .filter(Column::CategoryId.eq(category_id))
            .filter(Column::Year.eq(year))
    }
}
