//! Command implementations

pub mod check_config;
pub mod detect_distro;
pub mod metadata;
pub mod run;
pub mod version;
