pub mod config;
pub mod logging;

pub mod bitmap;
pub mod cache;
pub mod decoder;
pub mod digest;
pub mod fetch;
pub mod locator;
pub mod resolver;
