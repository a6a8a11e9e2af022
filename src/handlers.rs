pub mod auth;
pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod health;
pub mod pages;
pub mod users;
