pub mod error;

pub use error::AdapterError;
