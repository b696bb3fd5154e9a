pub mod auth;
pub mod face;
pub mod form;
