//! Telegram Bot API plumbing.
//!
//! URL templating for the method and file-download endpoints, plus the two
//! calls the bridge makes on its own behalf.

pub mod api;

pub use api::{DownloadedFile, TelegramApi};
