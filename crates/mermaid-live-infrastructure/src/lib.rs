//! Infrastructure layer for mermaid-live: persistence and configuration.

pub mod config_service;
pub mod dto;
pub mod history_repository;
pub mod last_rendered_repository;
pub mod paths;
pub mod storage;

pub use crate::history_repository::KvHistoryRepository;
pub use crate::last_rendered_repository::KvLastRenderedRepository;
pub use crate::paths::MermaidLivePaths;
pub use crate::storage::{JsonFileKeyValueStore, MemoryKeyValueStore};
