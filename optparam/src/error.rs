//! Error types for flag registration and parsing.
//!
//! Resolving a [`Param`](crate::Param) never fails; every error in this
//! crate comes from the flag registry.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("flag redefined: {0}")]
    DuplicateFlag(String),

    #[error("invalid flag name {name:?}: {reason}")]
    InvalidFlagName { name: String, reason: &'static str },

    #[error("no such flag: {0}")]
    UnknownFlag(String),

    #[error("flag {name} was registered as {registered}, not {requested}")]
    FlagTypeMismatch {
        name: String,
        requested: &'static str,
        registered: &'static str,
    },

    #[error("invalid value {value:?} for flag --{name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Parse(#[from] clap::Error),
}
