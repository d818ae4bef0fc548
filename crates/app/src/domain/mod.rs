//! Vitrine Domain Concerns

pub mod admin;
pub mod cart;
pub mod catalog;
