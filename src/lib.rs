pub mod identifier;
pub mod value;
pub mod catalogue;
pub mod field;
pub mod codec;
pub mod registry;
pub mod config;
pub mod error;
pub mod reader;

pub use identifier::Identifier;
pub use value::{ConfigValue, ScalarKind, TypeDesc, Value};
pub use catalogue::{Catalogue, StaticCatalogue};
pub use field::{Bound, Field, FieldMeta};
pub use codec::{Codec, CodecError};
pub use registry::{CodecRegistry, RegistryError};
pub use config::{Config, ConfigHooks};
pub use error::ConfigError;
pub use reader::{ConfigReader, UnknownKeys};
