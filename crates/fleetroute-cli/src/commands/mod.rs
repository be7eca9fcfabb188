pub mod cluster;
pub mod config;
pub mod draw;
pub mod jobs;
pub mod route;
pub mod sync;
