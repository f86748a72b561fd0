pub mod format;
pub mod owner;
pub mod stored_file;
