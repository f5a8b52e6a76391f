pub mod error;
pub mod logging;
pub mod normalization;
pub mod string_utils;

pub use error::*;
pub use string_utils::{escape_html, is_truthy, truncate_with_suffix, value_to_text};
