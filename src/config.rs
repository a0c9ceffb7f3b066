//! Record types and their optional lifecycle hooks.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::field::Field;

/// A struct that can be read from and written to a config file.
///
/// ```
/// use cfgkit::config::Config;
/// use cfgkit::field::Field;
///
/// #[derive(Default)]
/// struct Server { port: i32, motd: String }
///
/// impl Config for Server {
///     fn fields() -> Vec<Field<Self>> {
///         vec![
///             Field::new("port", |c: &Self| &c.port, |c: &mut Self| &mut c.port)
///                 .comment("TCP port to listen on")
///                 .at_least(1)
///                 .at_most(65535),
///             Field::new("motd", |c: &Self| &c.motd, |c: &mut Self| &mut c.motd),
///         ]
///     }
///
///     fn new_default() -> Option<Self> { Some(Self { port: 25565, ..Self::default() }) }
/// }
/// ```
pub trait Config: Sized + 'static {
    /// Every persisted field, in the order it is written to disk.
    fn fields() -> Vec<Field<Self>>;

    /// The zero-argument instance used for missing files, as the starting
    /// point of a parse, and for `# Default:` comments.  `None` means the
    /// type cannot be default-constructed.
    fn new_default() -> Option<Self>;

    /// Opt in to [`ConfigHooks`] by returning `Some(self)`.
    fn hooks(&mut self) -> Option<&mut dyn ConfigHooks> { None }
}

/// Lifecycle hooks a record may implement.  Every method defaults to a no-op.
pub trait ConfigHooks {
    /// Called after a file is parsed, with every key that matched no field.
    /// Migrate obsolete keys into current fields here.
    fn upgrade(&mut self, unknown_keys: &HashMap<String, String>) {
        let _ = unknown_keys;
    }

    /// Reject values that are individually valid but wrong together.  An
    /// error aborts the read and leaves the file untouched.
    fn validate(&self) -> Result<(), ConfigError> { Ok(()) }

    /// Called last, after the file has been rewritten.  Compute derived
    /// values here.
    fn finish(&mut self) {}
}
