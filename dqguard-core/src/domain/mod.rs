pub mod dataset;
pub mod error;
pub mod policy;
pub mod quality;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use error::DomainError;
