pub mod accounts;
pub mod customers;
