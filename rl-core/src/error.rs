//! Error types, re-exported from `rl-error`

pub use rl_error::{ReadingError, RenolinkError, Result};
