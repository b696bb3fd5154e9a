pub mod db;
pub mod face;
pub mod table;
pub mod uploads;
