pub mod envelope;
pub mod extractor;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use envelope::{extract_object, extract_records, extract_typed};
pub use extractor::{auth_middleware, BearerToken};
