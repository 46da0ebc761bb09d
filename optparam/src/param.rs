//! Optional call-time parameters with configured defaults.
//!
//! A [`Param<T>`] is declared once, usually as a `static` or a field, and
//! consulted by the function that accepts it. Callers pass overrides as a
//! slice of [`Arg`] tokens built with [`Param::arg`]; the function resolves
//! each of its parameters with [`Param::get`]. Tokens for different
//! parameters can be mixed in one slice, which gives named optional
//! arguments:
//!
//! ```rust
//! use optparam::{IntParam, Arg, with_default};
//!
//! fn connect(args: &[Arg], port: &IntParam, retries: &IntParam) -> (i64, i64) {
//!     (port.get(args), retries.get(args))
//! }
//!
//! let port = IntParam::with([with_default(8080)]);
//! let retries = IntParam::with([with_default(3)]);
//!
//! assert_eq!(connect(&[], &port, &retries), (8080, 3));
//! assert_eq!(connect(&[retries.arg(5)], &port, &retries), (8080, 5));
//! ```
//!
//! # Resolution
//!
//! 1. The first token in the slice built by this parameter wins.
//! 2. Otherwise the default source is used: the literal, the current value
//!    of the bound flag, or `T::default()` when nothing was configured.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::flag::{FlagCell, FlagSet, FlagValue};
use crate::value::Value;

/// Parameter resolving to a dynamically typed [`Value`]; unconfigured it
/// resolves to [`Value::Nil`].
pub type AnyParam = Param<Value>;

/// Signed integer parameter; unconfigured it resolves to `0`.
pub type IntParam = Param<i64>;

/// Unsigned integer parameter; unconfigured it resolves to `0`.
pub type UintParam = Param<u64>;

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Param`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(u64);

impl ParamId {
    fn next() -> Self {
        Self(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "param#{}", self.0)
    }
}

/// A value supplied for one parameter at a call site.
#[derive(Clone)]
pub struct Arg {
    id: ParamId,
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Arg {
    pub fn id(&self) -> ParamId {
        self.id
    }

    /// Whether this token was built by `param`.
    pub fn is_for<T>(&self, param: &Param<T>) -> bool {
        self.id == param.id
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg")
            .field("id", &self.id)
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Where a parameter's value comes from when no override is supplied.
#[derive(Debug, Clone, Default)]
pub enum DefaultSource<T> {
    #[default]
    None,
    Literal(T),
    Flag(FlagCell<T>),
}

/// Discriminant of [`DefaultSource`], used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum SourceKind {
    None,
    Literal,
    Flag,
}

impl<T> DefaultSource<T> {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::None => SourceKind::None,
            Self::Literal(_) => SourceKind::Literal,
            Self::Flag(_) => SourceKind::Flag,
        }
    }
}

/// A construction option for [`Param::with`].
#[derive(Debug, Clone)]
pub enum ParamOption<T> {
    /// Fixed default value.
    Default(T),
    /// Default read from a registered flag on every resolution.
    Flag(FlagCell<T>),
}

/// Literal default.
pub fn with_default<T>(value: impl Into<T>) -> ParamOption<T> {
    ParamOption::Default(value.into())
}

/// Register `name` in [`FlagSet::global`] and bind the default to it.
pub fn flag<T: FlagValue>(
    name: &str,
    default: impl Into<T>,
    usage: &str,
) -> Result<ParamOption<T>> {
    flag_in(FlagSet::global(), name, default, usage)
}

/// Register `name` in `flags` and bind the default to it.
pub fn flag_in<T: FlagValue>(
    flags: &FlagSet,
    name: &str,
    default: impl Into<T>,
    usage: &str,
) -> Result<ParamOption<T>> {
    let cell = flags.register(name, default.into(), usage)?;
    Ok(ParamOption::Flag(cell))
}

/// An optional parameter with a configured default.
///
/// Clones are the same parameter: tokens built by one satisfy the other.
/// Two separately constructed parameters never match each other's tokens,
/// even when configured identically.
#[derive(Debug, Clone)]
pub struct Param<T> {
    id: ParamId,
    source: DefaultSource<T>,
}

impl<T> Param<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    /// A parameter without a default.
    pub fn new() -> Self {
        Self {
            id: ParamId::next(),
            source: DefaultSource::None,
        }
    }

    /// A parameter configured by `options`; when several set a default,
    /// the last one wins.
    pub fn with(options: impl IntoIterator<Item = ParamOption<T>>) -> Self {
        let source = match options.into_iter().last() {
            Some(ParamOption::Default(v)) => DefaultSource::Literal(v),
            Some(ParamOption::Flag(cell)) => DefaultSource::Flag(cell),
            None => DefaultSource::None,
        };
        Self {
            id: ParamId::next(),
            source,
        }
    }

    pub fn id(&self) -> ParamId {
        self.id
    }

    pub fn source(&self) -> &DefaultSource<T> {
        &self.source
    }

    /// Build an override token for this parameter.
    pub fn arg(&self, value: impl Into<T>) -> Arg {
        Arg {
            id: self.id,
            value: Arc::new(value.into()),
            type_name: type_name::<T>(),
        }
    }

    /// The first override in `args` built by this parameter, if any.
    pub fn supplied(&self, args: &[Arg]) -> Option<T> {
        args.iter()
            .filter(|arg| arg.id == self.id)
            .find_map(|arg| arg.value.downcast_ref::<T>())
            .cloned()
    }

    /// The value used when no override is supplied.
    pub fn default_value(&self) -> T {
        match &self.source {
            DefaultSource::None => T::default(),
            DefaultSource::Literal(v) => v.clone(),
            DefaultSource::Flag(cell) => cell.get(),
        }
    }

    /// Resolve the parameter against the overrides supplied by a caller.
    pub fn get(&self, args: &[Arg]) -> T {
        if let Some(v) = self.supplied(args) {
            tracing::trace!(param = %self.id, source = "override", "resolved");
            return v;
        }
        tracing::trace!(param = %self.id, source = %self.source.kind(), "resolved");
        self.default_value()
    }
}

impl<T> Default for Param<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
