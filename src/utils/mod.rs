pub mod formatter;
pub mod printer;
pub mod url;

pub use formatter::{ResponseFormat, ResponseFormatter, format_bytes};
pub use self::url::{derive_tab_name, normalize_url, validate_url};
