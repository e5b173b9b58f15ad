// Internal shared infrastructure

pub mod error;
