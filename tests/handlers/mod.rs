mod auth;
mod health;
mod uploads;
