//! Mapping from stored rows to transport types.

use common::{BudgetDto, CategoryDto, ExpenseDto, Role, UserDto};
use model::entities::{budget, category, expense, user::{self, UserRole}};

pub fn role_from_model(role: UserRole) -> Role {
    match role {
        UserRole::Admin => Role::Admin,
        UserRole::Management => Role::Management,
        UserRole::Executive => Role::Executive,
    }
}

pub fn role_to_model(role: Role) -> UserRole {
    match role {
        Role::Admin => UserRole::Admin,
        Role::Management => UserRole::Management,
        Role::Executive => UserRole::Executive,
    }
}

pub fn category_dto(model: category::Model) -> CategoryDto {
    CategoryDto {
        id: model.id,
        name: model.name,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn budget_dto(model: budget::Model, category_name: Option<String>) -> BudgetDto {
    BudgetDto {
        id: model.id,
        category_id: model.category_id,
        category_name,
        amount: model.amount,
        year: model.year,
        is_locked: model.is_locked,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn expense_dto(model: expense::Model, category_name: Option<String>) -> ExpenseDto {
    ExpenseDto {
        id: model.id,
        category_id: model.category_id,
        category_name,
        user_id: model.user_id,
        amount: model.amount,
        expense_date: model.expense_date,
        remarks: model.remarks,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn user_dto(model: user::Model) -> UserDto {
    UserDto {
        id: model.id,
        username: model.username,
        display_id: model.display_id,
        email: model.email,
        role: role_from_model(model.role),
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
