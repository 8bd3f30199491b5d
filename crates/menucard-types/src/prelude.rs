pub use crate::error::{ClResult, Error};
pub use crate::types::{ProfileRef, Timestamp};

pub use tracing::{debug, debug_span, error, info, info_span, warn};

// vim: ts=4
