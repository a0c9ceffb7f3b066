use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::codec::CodecError;
use crate::registry::RegistryError;
use crate::value::ValueMismatch;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No colon character on line {line} in config file {}", .path.display())]
    MalformedLine { line: usize, path: PathBuf },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("Cannot parse value '{raw}' for field {field}: {source}")]
    Parse { field: String, raw: String, source: CodecError },
    #[error("Cannot write field {field}: {source}")]
    Write { field: String, source: CodecError },
    #[error("Config type {0} doesn't have a zero argument constructor")]
    NotDefaultConstructible(&'static str),
    #[error("Cannot access field {field}: {source}")]
    FieldAccess { field: String, source: ValueMismatch },
    #[error("Field {0} is declared more than once")]
    DuplicateField(&'static str),
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ConfigError {
    /// Shorthand for validation hooks.
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid(message.into())
    }
}
