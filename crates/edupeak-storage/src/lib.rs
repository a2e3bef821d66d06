mod database;
mod file;
mod kv;
mod store;


pub use database::Database;
pub use file::FileKvStore;
pub use kv::{open_backend, KeyValueStore, MemoryKvStore};
pub use store::{decode_sessions, encode_sessions, ChatSessionStore, StorageKeys, StoreEvent};
