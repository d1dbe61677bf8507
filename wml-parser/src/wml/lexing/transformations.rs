//! Token transformations applied after base tokenization.

pub mod concatenation;
pub mod unescaping;
