pub mod config;
pub mod convert;
pub mod path;
pub mod storage;
