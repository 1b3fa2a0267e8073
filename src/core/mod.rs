/*!
# Core Module

Error types and file system helpers shared by the extractor, the diagnostic
log and the collaborators around them.
*/

pub mod errors;
pub mod fs_utils;

pub use errors::{BrowserError, IdeConfigError, ParseFailure, StoreError};
pub use fs_utils::{read_text_file, write_atomic};
