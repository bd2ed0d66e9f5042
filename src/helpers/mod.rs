//! Transport and interaction helpers
//!
//! ## Categories
//!
//! - **download**: streaming HTTP download with mirror fallback
//! - **extract**: zip / tar.gz unpacking with skip-if-exists
//! - **progress**: transfer accounting and progress line
//! - **consent**: yes/no gate in front of network fetches
//! - **process**: external process runner

pub mod consent;
pub mod download;
pub mod extract;
pub mod process;
pub mod progress;
