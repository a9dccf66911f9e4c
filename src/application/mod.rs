pub mod restaurant_service;
pub mod user_service;
