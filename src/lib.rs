pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod docs;
pub mod model;
pub mod notify;
pub mod routes;
pub mod scheduler;
pub mod services;
