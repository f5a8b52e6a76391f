pub mod webhook_payload;

pub use webhook_payload::*;
