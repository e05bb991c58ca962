pub mod error;
mod local;
mod models;
mod path;

pub use crate::local::LocalBackend;
pub use crate::models::FileInfo;
pub use crate::path::validate as validate_path;
