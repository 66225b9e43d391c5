pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{encode_href, has_scheme, normalize_href};
