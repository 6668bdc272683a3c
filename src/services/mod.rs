pub mod accounts;
pub mod customers;
pub mod export;
pub mod jwt;
pub mod uploads;
