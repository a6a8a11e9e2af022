//! SeaORM entities for the expense tracker.
//!
//! Budgets and expenses hang off categories; expenses optionally point at
//! the user who recorded them.

pub mod budget;
pub mod category;
pub mod expense;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::budget::Entity as Budget;
    pub use super::category::Entity as Category;
    pub use super::expense::Entity as Expense;
    pub use super::user::Entity as User;
}
