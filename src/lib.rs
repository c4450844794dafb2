pub mod audit;
pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod filename;
pub mod regions;
pub mod render;
pub mod selection;
pub mod server;
pub mod surface;
pub mod topology;
pub mod types;
pub mod view;
