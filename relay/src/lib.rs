//! Chat relay application: feed subscription, event dispatch, batched
//! translation flushing, and webhook delivery.

pub mod app;
pub mod config;
pub mod destination;
pub mod feed;
pub mod flush;
pub mod reader;
pub mod suggestion;
