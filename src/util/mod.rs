pub mod human;
pub mod password_store;
pub mod section;
