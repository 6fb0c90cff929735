pub mod bin_handlers;
pub mod health_handlers;
