//! # API Route Handlers
//!
//! `general` serves the banner and health check, `extract` proxies text to the
//! keyword extractor and `upload` hands PDFs to the background pipeline.

pub mod extract;
pub mod general;
pub mod upload;

pub use extract::*;
pub use general::*;
pub use upload::*;

// Shared items used by multiple handler modules.
use super::{errors::AppError, state::AppState};
