// Internal shared components

pub mod error;
