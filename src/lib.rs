pub mod api; // Laboratory REST API
pub mod client; // Typed HTTP client
pub mod config;
pub mod db;
pub mod lab; // Domain rules: lifecycle, reference ranges, search, SQL guard
pub mod models;
pub mod report; // Printable order reports
