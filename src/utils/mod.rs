//! Cross-cutting utilities: file system helpers and progress display.

pub mod fs;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, link_or_copy, remove_dir_all_if_exists, safe_write};
pub use progress::ProgressBar;
