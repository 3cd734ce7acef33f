pub mod list_ops;
pub mod store;

pub use store::{DocumentStore, SubscriptionId};
