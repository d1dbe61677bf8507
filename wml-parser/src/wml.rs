//! Main module for WML preprocessing functionality

pub mod lexing;
pub mod location;
pub mod macros;
pub mod paths;
pub mod preprocessing;
pub mod records;
pub mod sanitize;
pub mod testing;
pub mod token;
