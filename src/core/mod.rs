// src/core/mod.rs
//! Core infrastructure shared by every store: configuration, storage, file helpers

pub mod config_manager;
pub mod fs_ops;
pub mod storage;

pub use config_manager::ConfigManager;
pub use fs_ops::FsOps;
pub use storage::{
    open_or_memory, FileStorage, KeyValueStore, MemoryStorage, SharedStorage, UnavailableStorage,
};
