pub mod bin_service;
