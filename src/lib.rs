pub mod api;
pub mod backend;
pub mod config;
pub mod countdown;
pub mod dashboard;
pub mod domain;
pub mod finance;
pub mod forms;
pub mod server;
