pub mod create_admin;
pub mod initdb;
pub mod serve;

pub use create_admin::{create_admin, NewAdmin};
pub use initdb::init_database;
pub use serve::serve;
