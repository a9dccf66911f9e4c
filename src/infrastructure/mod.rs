pub mod auth;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod store;
