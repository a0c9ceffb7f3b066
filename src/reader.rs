//! Document engine: the read → parse → upgrade → validate → write → finish
//! cycle for one record type against one file.
//!
//! # Lifecycle of [`ConfigReader::read`]
//! - No file: start from `R::new_default()`.
//! - File present: parse it over a default instance, collecting keys that
//!   match no field, then run `upgrade(unknown_keys)` and `validate()`.
//! - Always rewrite the file from the instance, so formatting is normalised
//!   and newly added fields and comments appear.
//! - Run `finish()` and hand the instance back.
//!
//! Any failure aborts before the rewrite; a file rejected by `validate()` is
//! left exactly as the user wrote it.
//!
//! # File format
//! ```text
//! ###########
//! ## Title ##
//! ###########
//!
//! # A comment
//! # Example: some value
//! # Note: first line
//! #       second line
//! # At least: 1
//! # Default: 10
//! key: value
//! ```
//! Blank lines and `#` comments are ignored when reading.  The first `:`
//! separates key from value; both are trimmed.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::codec::Codec;
use crate::config::Config;
use crate::error::ConfigError;
use crate::field::{DefaultComment, Field};
use crate::registry::CodecRegistry;

/// Keys from a parsed file that matched no field, mapped to their raw values.
pub type UnknownKeys = HashMap<String, String>;

// ── Schema ───────────────────────────────────────────────────────────────────

/// Every non-skipped field of `R` paired with its resolved codec.  Built
/// before any parsing or writing, so a field without a codec fails the whole
/// operation up front.
struct Schema<R> {
    entries: Vec<Entry<R>>,
    by_name: HashMap<&'static str, usize>,
}

struct Entry<R> {
    field: Field<R>,
    codec: Arc<dyn Codec>,
}

impl<R: Config> Schema<R> {
    fn resolve(registry: &CodecRegistry) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut by_name = HashMap::new();

        for field in R::fields() {
            if !seen.insert(field.name()) {
                return Err(ConfigError::DuplicateField(field.name()));
            }
            if field.is_skipped() {
                continue;
            }
            let codec = registry.find(field.meta(), field.type_desc())?;
            by_name.insert(field.name(), entries.len());
            entries.push(Entry { field, codec });
        }
        Ok(Self { entries, by_name })
    }

    fn lookup(&self, key: &str) -> Option<&Entry<R>> {
        self.by_name.get(key).map(|&i| &self.entries[i])
    }
}

impl<R> Entry<R> {
    fn write(&self, record: &R) -> Result<String, ConfigError> {
        self.codec
            .write(self.field.meta(), &self.field.get(record))
            .map_err(|source| ConfigError::Write { field: self.field.name().to_owned(), source })
    }
}

fn default_instance<R: Config>() -> Result<R, ConfigError> {
    R::new_default().ok_or(ConfigError::NotDefaultConstructible(std::any::type_name::<R>()))
}

// ── ConfigReader ─────────────────────────────────────────────────────────────

/// Reads, writes and renders config records using a borrowed registry.
#[derive(Clone, Copy)]
pub struct ConfigReader<'r> {
    registry: &'r CodecRegistry,
}

impl<'r> ConfigReader<'r> {
    pub fn new(registry: &'r CodecRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r CodecRegistry { self.registry }

    /// Load `path` into an `R`, creating or rewriting the file on the way.
    pub fn read<R: Config>(&self, path: impl AsRef<Path>) -> Result<R, ConfigError> {
        let path = path.as_ref();
        let schema = Schema::<R>::resolve(self.registry)?;

        let mut config = if path.exists() {
            let text = fs::read_to_string(path)?;
            let (mut config, unknown_keys) = parse_with(&schema, &text, path)?;
            if let Some(hooks) = config.hooks() {
                hooks.upgrade(&unknown_keys);
                if let Err(err) = hooks.validate() {
                    warn!(path = %path.display(), error = %err, "config rejected, leaving file untouched");
                    return Err(err);
                }
            }
            config
        } else {
            debug!(path = %path.display(), "config file missing, writing defaults");
            default_instance::<R>()?
        };

        let lines = stringify_with(&schema, &config)?;
        write_lines(path, &lines)?;
        debug!(path = %path.display(), lines = lines.len(), "config file written");

        if let Some(hooks) = config.hooks() {
            hooks.finish();
        }
        Ok(config)
    }

    /// Parse `text` over a default `R` without running hooks or touching the
    /// file system.  `origin` is only used in error messages.
    pub fn parse_str<R: Config>(&self, text: &str, origin: impl AsRef<Path>) -> Result<(R, UnknownKeys), ConfigError> {
        let schema = Schema::<R>::resolve(self.registry)?;
        parse_with(&schema, text, origin.as_ref())
    }

    /// Render `config` as the lines of a config file.
    pub fn stringify<R: Config>(&self, config: &R) -> Result<Vec<String>, ConfigError> {
        let schema = Schema::<R>::resolve(self.registry)?;
        stringify_with(&schema, config)
    }

    /// Write `config` to `path`, replacing whatever is there.
    pub fn save<R: Config>(&self, config: &R, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let lines = self.stringify(config)?;
        write_lines(path.as_ref(), &lines)
    }
}

// ── Parse ────────────────────────────────────────────────────────────────────

fn parse_with<R: Config>(schema: &Schema<R>, text: &str, origin: &Path) -> Result<(R, UnknownKeys), ConfigError> {
    let mut config = default_instance::<R>()?;
    let mut unknown_keys = UnknownKeys::new();
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            return Err(ConfigError::MalformedLine { line: line_no, path: origin.to_owned() });
        };
        let (key, value) = (key.trim(), value.trim());

        let Some(entry) = schema.lookup(key) else {
            debug!(key, value, "unknown config key");
            unknown_keys.insert(key.to_owned(), value.to_owned());
            continue;
        };

        let parsed = entry.codec.parse(entry.field.meta(), value).map_err(|source| ConfigError::Parse {
            field: key.to_owned(),
            raw:   value.to_owned(),
            source,
        })?;
        entry
            .field
            .set(&mut config, parsed)
            .map_err(|source| ConfigError::FieldAccess { field: key.to_owned(), source })?;
    }

    Ok((config, unknown_keys))
}

// ── Stringify ────────────────────────────────────────────────────────────────

fn stringify_with<R: Config>(schema: &Schema<R>, config: &R) -> Result<Vec<String>, ConfigError> {
    let defaults = default_instance::<R>()?;
    let mut out = Lines::default();

    for entry in &schema.entries {
        let meta = entry.field.meta();

        for _ in 0..meta.blank_lines {
            out.push("");
        }

        if let Some(title) = &meta.section {
            let bar = "#".repeat(title.chars().count() + 6);
            out.push(&bar);                      // ###########
            out.push(format!("## {title} ##"));  // ## Title ##
            out.push(&bar);                      // ###########
            out.push("");
        }

        for line in &meta.comment {
            out.push(format!("# {line}"));
        }
        for line in &meta.example {
            out.push(format!("# Example: {line}"));
        }
        for (i, line) in meta.note.iter().enumerate() {
            let prefix = if i == 0 { "# Note: " } else { "#       " };
            out.push(format!("{prefix}{line}"));
        }

        if let Some(min) = meta.at_least {
            out.push(format!("# At least: {min}"));
        }
        if let Some(max) = meta.at_most {
            out.push(format!("# At most: {max}"));
        }

        match &meta.default {
            DefaultComment::Written => {
                let default = entry.write(&defaults)?;
                let shown = if default.is_empty() { "<empty>" } else { default.as_str() };
                out.push(format!("# Default: {shown}"));
            }
            DefaultComment::Replaced(text) => out.push(format!("# Default: {text}")),
            DefaultComment::Omitted => {}
        }

        out.push(format!("{}: {}", entry.field.name(), entry.write(config)?));
        out.push("");
    }

    Ok(out.0)
}

/// Output buffer that strips trailing whitespace from every line.
#[derive(Default)]
struct Lines(Vec<String>);

impl Lines {
    fn push(&mut self, line: impl AsRef<str>) {
        self.0.push(line.as_ref().trim_end().to_owned());
    }
}

fn write_lines(path: &Path, lines: &[String]) -> Result<(), ConfigError> {
    let mut text = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    fs::write(path, text)?;
    Ok(())
}
