//! ArchiveFiles - Core Library
//!
//! Input resolution, file-set selection, tar-name inference and the
//! archiver dispatch that turns a folder into an archive by driving
//! external archivers (7-Zip, tar, zip).

pub mod archiver;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod exec;
pub mod files;
pub mod tar_name;
pub mod tools;
pub mod types;
pub mod utils;

pub use archiver::*;
pub use config::*;
pub use dispatcher::*;
pub use error::*;
pub use exec::*;
pub use files::*;
pub use tar_name::*;
pub use tools::*;
pub use types::*;
