//! Convenience re-exports for common optparam types.
//!
//! Import everything with `use optparam::prelude::*;`.

/// Parameter declaration and resolution.
pub use crate::param::{AnyParam, Arg, IntParam, Param, ParamOption, UintParam};

/// Construction options.
pub use crate::param::{flag, flag_in, with_default};

/// The flag registry backing flag-bound defaults.
pub use crate::flag::{FlagCell, FlagSet};

/// Dynamic values resolved by `AnyParam`.
pub use crate::value::Value;

pub use crate::error::Result;
