pub mod file;
pub mod format;
pub mod information;
pub mod owner;
