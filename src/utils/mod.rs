pub mod download;
pub mod logging;
pub mod sanitize;

pub use download::{archived_download_name, fresh_download_name};
pub use sanitize::sanitize;
