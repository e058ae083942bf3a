// ── Reactive data storage ──

mod collection;
mod data_store;
mod refresh;
mod sequence;

pub use data_store::DataStore;
pub use refresh::Resource;
pub(crate) use sequence::Ticket;
