pub mod backend;
pub mod catalog;
pub mod config;
pub mod context;
pub mod errors;
pub mod expression;
pub mod legend;
pub mod pages;
pub mod palette;
pub mod render;
pub mod roi;
pub mod server;
pub mod wms;
