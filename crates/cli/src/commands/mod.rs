//! CLI Commands

pub mod category_key;
