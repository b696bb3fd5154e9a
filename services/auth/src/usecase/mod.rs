pub mod face;
pub mod login;
pub mod password;
pub mod register;
pub mod token;
