//! Utility modules for the documentation builder.

pub mod paths;
