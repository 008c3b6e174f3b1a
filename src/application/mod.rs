//! Editor state machine: attribute store, branch managers, remote fetcher.

pub mod categories;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod mode;
pub mod repos;
pub mod script;
pub mod session;
pub mod static_list;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
