pub mod catalog;
pub mod client_config;
pub mod config;
pub mod domain;
pub mod identity;
pub mod settings;
pub mod subscription;
pub mod version;
