//! Hand-rolled command-line flag parser, the Rust
//! counterpart of the original's `CommandLineArgumentParser`: a
//! `"-flag" "value"` lookup over `Vec<String>`, `Result`-returning instead
//! of throwing, with no argument-parsing crate in the dependency graph (none
//! of the reference pack's repos reach for one here either).

use std::str::FromStr;

use crate::error::{PdeError, PdeResult};

pub struct ArgParser {
    args: Vec<String>,
}

impl ArgParser {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    fn position(&self, flag: &str) -> Option<usize> {
        self.args.iter().position(|a| a == flag)
    }

    /// Returns the raw string value following `flag`. `MissingArgument` if
    /// the flag is absent; `IllegalArgument` if it is the last token (no
    /// value follows it).
    pub fn value(&self, flag: &'static str) -> PdeResult<&str> {
        let idx = self.position(flag).ok_or(PdeError::MissingArgument { flag })?;
        self.args.get(idx + 1).map(String::as_str).ok_or(PdeError::IllegalArgument { flag, value: String::new() })
    }

    /// Like [`Self::value`], but returns `default` when the flag is absent.
    /// A present-but-valueless flag is still an error.
    pub fn value_or<'a>(&'a self, flag: &'static str, default: &'a str) -> PdeResult<&'a str> {
        match self.value(flag) {
            Ok(v) => Ok(v),
            Err(PdeError::MissingArgument { .. }) => Ok(default),
            Err(e) => Err(e),
        }
    }

    /// `true` iff `flag` appears anywhere in the argument list (a bare
    /// switch, no value).
    pub fn has_flag(&self, flag: &str) -> bool {
        self.position(flag).is_some()
    }

    pub fn parse<T>(&self, flag: &'static str) -> PdeResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.value(flag)?;
        raw.parse::<T>().map_err(|e| PdeError::IllegalArgument { flag, value: format!("{raw} ({e})") })
    }

    pub fn parse_or<T>(&self, flag: &'static str, default: T) -> PdeResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.parse::<T>(flag) {
            Ok(v) => Ok(v),
            Err(PdeError::MissingArgument { .. }) => Ok(default),
            Err(e) => Err(e),
        }
    }
}
