mod raw;
mod loader;
pub mod error;

pub use loader::{load_document, load_documents, IdentityDocument};
pub use error::ConfigError;
