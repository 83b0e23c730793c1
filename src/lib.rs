pub mod ai;
pub mod api;
pub mod entities;
pub mod metrics;
pub mod migrator;
pub mod notifications;
pub mod scoring;
pub mod telemetry;

pub use sea_orm;
