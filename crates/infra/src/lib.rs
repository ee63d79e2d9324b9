//! Infrastructure layer: product catalog, print-job storage, batch sequences,
//! rendered artifacts, selection sessions, and the print pipeline that ties
//! them together.

pub mod artifacts;
pub mod batch;
pub mod catalog;
pub mod error;
pub mod print_jobs;
pub mod printer;
pub mod selections;

pub use error::StoreError;
