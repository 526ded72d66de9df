pub mod config;
pub mod logging;

pub mod exec;
pub mod metapackage;
pub mod repo;
pub mod retry;
pub mod versions;
