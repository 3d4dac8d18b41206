pub mod chat;
pub mod crop;
pub mod dashboard;
pub mod setup;
