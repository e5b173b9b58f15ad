// Decode module for the Fulgur wire representations

pub mod delimited;
pub mod json;
