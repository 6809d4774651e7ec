pub mod subdomain;
pub mod types;

pub use subdomain::{MAX_SUBDOMAIN_LEN, SubdomainError, validate_subdomain};
pub use types::*;
