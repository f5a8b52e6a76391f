pub mod health;
pub mod status;
pub mod webhook;

pub use health::*;
pub use status::*;
pub use webhook::*;
