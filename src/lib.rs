pub mod indexer;
pub mod models;
pub mod storage;
pub mod utils;
