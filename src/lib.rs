pub mod client;
pub mod config;
pub mod controllers;
pub mod fanout;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod types;
