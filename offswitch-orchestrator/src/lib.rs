// Library entry point for tests and external usage

pub mod cluster_endpoints;
pub mod compute_services;
pub mod databases;
pub mod toggle;
pub mod virtual_machines;

pub use toggle::ResourceToggler;
