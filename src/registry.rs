//! Codec registry: picks the codec for a field.
//!
//! # Resolution order
//! 1. A field with `codec = "name"` uses the named codec, or fails with
//!    [`RegistryError::UnknownNamedCodec`].
//! 2. A scalar type uses the codec registered for its [`ScalarKind`].
//! 3. A wrapper type resolves its inner type recursively and wraps the result
//!    in the matching combinator.
//! 4. Anything else fails with [`RegistryError::NoCodecForType`].
//!
//! The registry is built once, populated before use, and then shared by
//! reference; it holds no interior mutability.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::catalogue::Catalogue;
use crate::codec::{
    BoolCodec, CatalogueCodec, Codec, IdentifierCodec, NumberCodec, OptionalCodec, SequenceCodec,
    SetCodec, StringCodec,
};
use crate::field::FieldMeta;
use crate::reader::ConfigReader;
use crate::value::{ScalarKind, TypeDesc};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No codec named {0}")]
    UnknownNamedCodec(String),
    #[error("Cannot find codec for type {0}")]
    NoCodecForType(TypeDesc),
}

pub struct CodecRegistry {
    scalars: HashMap<ScalarKind, Arc<dyn Codec>>,
    named:   HashMap<String, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// A registry seeded with codecs for strings, all integer and float
    /// widths, booleans and identifiers.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_scalar(ScalarKind::Str,        StringCodec);
        registry.register_scalar(ScalarKind::I8,         NumberCodec::<i8>::new());
        registry.register_scalar(ScalarKind::I16,        NumberCodec::<i16>::new());
        registry.register_scalar(ScalarKind::I32,        NumberCodec::<i32>::new());
        registry.register_scalar(ScalarKind::I64,        NumberCodec::<i64>::new());
        registry.register_scalar(ScalarKind::F32,        NumberCodec::<f32>::new());
        registry.register_scalar(ScalarKind::F64,        NumberCodec::<f64>::new());
        registry.register_scalar(ScalarKind::Bool,       BoolCodec);
        registry.register_scalar(ScalarKind::Identifier, IdentifierCodec);
        registry
    }

    /// A registry with no codecs at all.
    pub fn empty() -> Self {
        Self { scalars: HashMap::new(), named: HashMap::new() }
    }

    // ── Registration ─────────────────────────────────────────────────────

    /// Use `codec` for every field of scalar type `kind`, replacing any codec
    /// already registered for it.
    pub fn register_scalar(&mut self, kind: ScalarKind, codec: impl Codec + 'static) -> &mut Self {
        self.scalars.insert(kind, Arc::new(codec));
        self
    }

    /// Make `codec` available to fields that ask for it by `name`.
    pub fn register_named(&mut self, name: impl Into<String>, codec: impl Codec + 'static) -> &mut Self {
        self.named.insert(name.into(), Arc::new(codec));
        self
    }

    /// Serialize members of `catalogue` by name.  Fields declare them with
    /// `TypeDesc::member(catalogue.id())`.
    pub fn register_catalogue<C: Catalogue>(&mut self, catalogue: C) -> &mut Self {
        let kind = ScalarKind::Member(catalogue.id());
        self.register_scalar(kind, CatalogueCodec::new(Arc::new(catalogue)))
    }

    // ── Lookup ───────────────────────────────────────────────────────────

    /// The codec for a field, honouring a `codec = "name"` override.
    pub fn find(&self, meta: &FieldMeta, ty: &TypeDesc) -> Result<Arc<dyn Codec>, RegistryError> {
        match &meta.codec {
            Some(name) => self
                .named
                .get(name)
                .cloned()
                .ok_or_else(|| RegistryError::UnknownNamedCodec(name.clone())),
            None => self.find_type(ty),
        }
    }

    /// The codec for a bare type, wrapping inner codecs as needed.
    pub fn find_type(&self, ty: &TypeDesc) -> Result<Arc<dyn Codec>, RegistryError> {
        match ty {
            TypeDesc::Scalar(kind) => self
                .scalars
                .get(kind)
                .cloned()
                .ok_or_else(|| RegistryError::NoCodecForType(ty.clone())),
            TypeDesc::SequenceOf(inner) => Ok(Arc::new(SequenceCodec::new(self.find_inner(ty, inner)?))),
            TypeDesc::SetOf(inner)      => Ok(Arc::new(SetCodec::new(self.find_inner(ty, inner)?))),
            TypeDesc::OptionalOf(inner) => Ok(Arc::new(OptionalCodec::new(self.find_inner(ty, inner)?))),
        }
    }

    // Report the whole type, not just the innermost scalar, when a wrapper's
    // element has no codec.
    fn find_inner(&self, outer: &TypeDesc, inner: &TypeDesc) -> Result<Arc<dyn Codec>, RegistryError> {
        self.find_type(inner).map_err(|err| match err {
            RegistryError::NoCodecForType(_) => RegistryError::NoCodecForType(outer.clone()),
            other => other,
        })
    }

    pub fn has_named(&self, name: &str) -> bool { self.named.contains_key(name) }

    /// A document engine borrowing this registry.
    pub fn reader(&self) -> ConfigReader<'_> {
        ConfigReader::new(self)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self { Self::new() }
}
