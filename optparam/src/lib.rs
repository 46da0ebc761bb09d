//! Optional, typed call-time parameters with configured defaults.
//!
//! A function that takes optional arguments declares one [`Param`] per
//! argument and accepts a slice of [`Arg`] tokens. Each parameter picks its
//! own token out of the slice, or falls back to its default: a literal, the
//! live value of a command-line flag, or the type's zero value.
//!
//! ```rust
//! use optparam::prelude::*;
//!
//! # fn main() -> optparam::Result<()> {
//! let flags = FlagSet::new("server");
//! let port = IntParam::with([flag_in(&flags, "port", 8080, "listen port")?]);
//! let name = AnyParam::new();
//!
//! assert_eq!(port.get(&[]), 8080);
//! assert_eq!(port.get(&[port.arg(9090)]), 9090);
//! assert!(name.get(&[port.arg(9090)]).is_nil());
//!
//! flags.parse_from(["server", "--port", "7070"])?;
//! assert_eq!(port.get(&[]), 7070);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod flag;
pub mod param;
pub mod prelude;
pub mod value;

pub use error::{Error, Result};
pub use flag::{FlagCell, FlagSet, FlagValue};
pub use param::{
    AnyParam, Arg, DefaultSource, IntParam, Param, ParamId, ParamOption, SourceKind, UintParam,
    flag, flag_in, with_default,
};
pub use value::{Value, ValueKind};
