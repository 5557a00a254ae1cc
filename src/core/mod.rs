pub mod chat;
pub mod dashboard;
pub mod event;
pub mod id;
pub mod serde_util;
pub mod task;
pub mod user;
