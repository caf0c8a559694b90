pub mod app;
pub mod batch;
pub mod dispatch;
pub mod services;
pub mod telemetry;
