pub mod auth;
pub mod insights;
pub mod models;
pub mod routes;
pub mod scraping;
