//! Request path helpers

pub mod url;

pub use self::url::{build_query_string, build_url};
