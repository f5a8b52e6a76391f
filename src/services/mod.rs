pub mod classifier;
pub mod dispatcher;
pub mod formatter;
pub mod status_store;

pub use classifier::{EventKind, SuccessfulStatuses};
pub use dispatcher::{DispatchSummary, WebhookDispatcher};
pub use formatter::MessageFormatter;
pub use status_store::{StatusMap, StatusRecord, StatusStore};
