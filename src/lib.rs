pub mod app;
pub mod dto;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod telemetry;
pub mod usecases;
