pub mod auth;
pub mod dashboard;
pub mod init;
pub mod mirror;
pub mod uploads;
