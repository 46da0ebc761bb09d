//! Command-line flag registry.
//!
//! A [`FlagSet`] owns named flags and their current values. Registering a
//! flag hands back a [`FlagCell`], a live handle that always reads the
//! value currently stored in the set, so values parsed from argv after
//! registration are visible through every handle.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ FlagSet (Arc)                                │
//! │  └── flags: RwLock<BTreeMap<name, slot>>     │
//! │        └── slot ── FlagCell<T>               │
//! │                     └── Arc<RwLock<T>> ◄──── Param<T> (read-through)
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Argument parsing is delegated to `clap`: [`FlagSet::command`] builds a
//! `clap::Command` from the registered flags at parse time.
//!
//! # Syntax
//!
//! Only long flags are recognised: `--port 7`, `--port=7`, `--port -7`.
//! The single-dash form `-port 7` is rejected as an unexpected argument.
//! `bool` flags are switches: a bare `--verbose` sets `true`, any other
//! value must be attached with `=` (`--verbose=false`). Booleans are
//! spelled `true`/`True`/`TRUE` or `false`/`False`/`FALSE`, the same words
//! [`Value::infer`] recognises.

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use clap::{Arg, ArgAction, Command, builder::ValueParser};
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::value::Value;

/// Argument id collecting positional arguments. Contains whitespace so it
/// can never clash with a valid flag name.
const POSITIONAL_ID: &str = "trailing args";

/// Flag names clap reserves for itself.
const RESERVED_NAMES: &[&str] = &["help"];

/// A type that can back a command-line flag.
pub trait FlagValue: Clone + Send + Sync + 'static {
    /// Placeholder shown in help output, e.g. `--port <int>`.
    const VALUE_NAME: &'static str;

    /// Whether the flag may appear without a value (`--verbose`).
    const IS_SWITCH: bool = false;

    fn parse_flag(raw: &str) -> std::result::Result<Self, String>;

    fn render_flag(&self) -> String;
}

macro_rules! impl_flag_value_from_str {
    ($value_name:literal: $($t:ty),+) => {
        $(
            impl FlagValue for $t {
                const VALUE_NAME: &'static str = $value_name;

                fn parse_flag(raw: &str) -> std::result::Result<Self, String> {
                    raw.parse::<$t>().map_err(|e| e.to_string())
                }

                fn render_flag(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

impl_flag_value_from_str!("int": i8, i16, i32, i64, isize);
impl_flag_value_from_str!("uint": u8, u16, u32, u64, usize);
impl_flag_value_from_str!("float": f32, f64);
impl_flag_value_from_str!("string": String);

impl FlagValue for bool {
    const VALUE_NAME: &'static str = "bool";
    const IS_SWITCH: bool = true;

    fn parse_flag(raw: &str) -> std::result::Result<Self, String> {
        crate::value::parse_bool(raw).ok_or_else(|| "expected a boolean".to_string())
    }

    fn render_flag(&self) -> String {
        self.to_string()
    }
}

impl FlagValue for Value {
    const VALUE_NAME: &'static str = "value";

    fn parse_flag(raw: &str) -> std::result::Result<Self, String> {
        Ok(Value::infer(raw))
    }

    fn render_flag(&self) -> String {
        self.to_string()
    }
}

/// Live handle to the current value of one registered flag.
///
/// Clones share the same storage.
pub struct FlagCell<T> {
    name: Arc<str>,
    value: Arc<RwLock<T>>,
}

impl<T> Clone for FlagCell<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            value: self.value.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for FlagCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagCell")
            .field("name", &self.name)
            .field("value", &*self.value.read())
            .finish()
    }
}

impl<T: Clone> FlagCell<T> {
    fn new(name: &str, value: T) -> Self {
        Self {
            name: name.into(),
            value: Arc::new(RwLock::new(value)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value of the flag.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Replace the current value of the flag.
    pub fn set(&self, value: T) {
        *self.value.write() = value;
    }
}

/// Type-erased view of a registered flag.
trait FlagSlot: Send + Sync {
    fn usage(&self) -> &str;
    fn value_name(&self) -> &'static str;
    fn is_switch(&self) -> bool;
    fn default_text(&self) -> &str;
    fn type_name(&self) -> &'static str;
    fn set_raw(&self, raw: &str) -> std::result::Result<(), String>;
    fn as_any(&self) -> &dyn Any;
}

struct Slot<T> {
    cell: FlagCell<T>,
    usage: String,
    default_text: String,
}

impl<T: FlagValue> FlagSlot for Slot<T> {
    fn usage(&self) -> &str {
        &self.usage
    }

    fn value_name(&self) -> &'static str {
        T::VALUE_NAME
    }

    fn is_switch(&self) -> bool {
        T::IS_SWITCH
    }

    fn default_text(&self) -> &str {
        &self.default_text
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn set_raw(&self, raw: &str) -> std::result::Result<(), String> {
        self.cell.set(T::parse_flag(raw)?);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct FlagSetInner {
    name: String,
    flags: RwLock<BTreeMap<String, Arc<dyn FlagSlot>>>,
}

/// A registry of named command-line flags.
///
/// Cloning a `FlagSet` yields another handle to the same registry.
#[derive(Clone)]
pub struct FlagSet {
    inner: Arc<FlagSetInner>,
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSet")
            .field("name", &self.inner.name)
            .field("flags", &self.names())
            .finish()
    }
}

impl FlagSet {
    /// Create an empty registry. `name` is used as the program name in
    /// help and error output.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(FlagSetInner {
                name: name.into(),
                flags: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    /// The process-wide registry, named after the running binary.
    pub fn global() -> &'static FlagSet {
        static GLOBAL: OnceLock<FlagSet> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let name = std::env::args_os()
                .next()
                .as_deref()
                .map(Path::new)
                .and_then(Path::file_name)
                .and_then(|n| n.to_str())
                .unwrap_or("app")
                .to_string();
            FlagSet::new(name)
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Register a flag with its default value and help text.
    ///
    /// Fails with [`Error::DuplicateFlag`] if `name` is already registered
    /// in this set.
    pub fn register<T: FlagValue>(
        &self,
        name: &str,
        default: T,
        usage: &str,
    ) -> Result<FlagCell<T>> {
        validate_name(name)?;

        let mut flags = self.inner.flags.write();
        if flags.contains_key(name) {
            return Err(Error::DuplicateFlag(name.to_string()));
        }

        let slot = Slot {
            default_text: default.render_flag(),
            cell: FlagCell::new(name, default),
            usage: usage.to_string(),
        };
        let cell = slot.cell.clone();
        tracing::debug!(
            set = %self.inner.name,
            flag = name,
            default = %slot.default_text,
            "registered flag"
        );
        flags.insert(name.to_string(), Arc::new(slot));
        Ok(cell)
    }

    /// Bind to a flag that was registered earlier, with the same type.
    pub fn lookup<T: FlagValue>(&self, name: &str) -> Result<FlagCell<T>> {
        let flags = self.inner.flags.read();
        let slot = flags
            .get(name)
            .ok_or_else(|| Error::UnknownFlag(name.to_string()))?;
        slot.as_any()
            .downcast_ref::<Slot<T>>()
            .map(|s| s.cell.clone())
            .ok_or_else(|| Error::FlagTypeMismatch {
                name: name.to_string(),
                requested: type_name::<T>(),
                registered: slot.type_name(),
            })
    }

    /// Parse `raw` as the flag's type and store it.
    pub fn set(&self, name: &str, raw: &str) -> Result<()> {
        let slot = self
            .inner
            .flags
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownFlag(name.to_string()))?;
        slot.set_raw(raw).map_err(|reason| Error::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            reason,
        })?;
        tracing::debug!(set = %self.inner.name, flag = name, value = raw, "flag set");
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.flags.read().contains_key(name)
    }

    /// Registered flag names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.inner.flags.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.flags.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.flags.read().is_empty()
    }

    /// Build a `clap::Command` accepting every registered flag plus any
    /// number of trailing positional arguments.
    pub fn command(&self) -> Command {
        let flags = self.inner.flags.read();
        let mut cmd = Command::new(self.inner.name.clone())
            .disable_version_flag(true)
            .args_override_self(true);

        for (name, slot) in flags.iter() {
            let help = match slot.default_text() {
                "" => slot.usage().to_string(),
                default => format!("{} [default: {}]", slot.usage(), default),
            };
            let mut arg = Arg::new(name.clone())
                .long(name.clone())
                .help(help)
                .value_name(slot.value_name())
                .value_parser(ValueParser::string())
                .action(ArgAction::Set);
            if slot.is_switch() {
                arg = arg
                    .num_args(0..=1)
                    .require_equals(true)
                    .default_missing_value("true");
            } else {
                arg = arg.allow_negative_numbers(true);
            }
            cmd = cmd.arg(arg);
        }

        cmd.arg(
            Arg::new(POSITIONAL_ID)
                .value_name("ARGS")
                .value_parser(ValueParser::string())
                .action(ArgAction::Append)
                .num_args(1..)
                .trailing_var_arg(true),
        )
    }

    /// Parse a full argument vector (the first item is the program name)
    /// and store every flag value found.
    ///
    /// Returns the positional arguments that followed the flags.
    pub fn parse_from<I, S>(&self, args: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let cmd = self.command();
        let names: Vec<String> = cmd
            .get_arguments()
            .map(|arg| arg.get_id().as_str())
            .filter(|id| *id != POSITIONAL_ID)
            .map(str::to_string)
            .collect();
        let matches = cmd.try_get_matches_from(args)?;

        for name in &names {
            if let Some(raw) = matches.get_one::<String>(name) {
                self.set(name, raw)?;
            }
        }

        let rest: Vec<String> = matches
            .get_many::<String>(POSITIONAL_ID)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default();
        tracing::debug!(set = %self.inner.name, positional = rest.len(), "parsed arguments");
        Ok(rest)
    }

    /// Help text listing every registered flag.
    pub fn render_help(&self) -> String {
        self.command().render_help().to_string()
    }
}

fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.starts_with('-') {
        Some("name starts with '-'")
    } else if name.contains('=') {
        Some("name contains '='")
    } else if name.chars().any(char::is_whitespace) {
        Some("name contains whitespace")
    } else if RESERVED_NAMES.contains(&name) {
        Some("name is reserved")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidFlagName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
