//! Filesystem operations served to the UI. Each one is a stateless wrapper
//! over `tokio::fs`; nothing is cached and paths are taken as given.

pub mod dir_ops;
pub mod file_ops;

pub use dir_ops::{handle_create_directory, handle_list_directory, try_list_directory};
pub use file_ops::{
    PLACEHOLDER_PREFIX, handle_create_file, handle_read_file, handle_write_file, try_read_file,
};
