//! Dynamic values and the type descriptors that select a codec for them.
//!
//! A record field exposes its contents as a [`Value`] and declares its shape
//! with a [`TypeDesc`].  The registry walks the descriptor to pick a codec;
//! the codec only ever sees `Value`s.  [`ConfigValue`] bridges ordinary Rust
//! types to both.

use std::any::Any;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use thiserror::Error;

use crate::identifier::Identifier;

// ── Type descriptors ─────────────────────────────────────────────────────────

/// Leaf types the registry can hold a codec for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Str,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    Identifier,
    /// Member of the catalogue with this id.
    Member(&'static str),
    /// User-defined scalar, registered by name.
    Custom(&'static str),
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Str        => f.write_str("string"),
            ScalarKind::I8         => f.write_str("i8"),
            ScalarKind::I16        => f.write_str("i16"),
            ScalarKind::I32        => f.write_str("i32"),
            ScalarKind::I64        => f.write_str("i64"),
            ScalarKind::F32        => f.write_str("f32"),
            ScalarKind::F64        => f.write_str("f64"),
            ScalarKind::Bool       => f.write_str("bool"),
            ScalarKind::Identifier => f.write_str("identifier"),
            ScalarKind::Member(id) => write!(f, "member of {id}"),
            ScalarKind::Custom(n)  => f.write_str(n),
        }
    }
}

/// Declared type of a field: a scalar, or a wrapper around another type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    Scalar(ScalarKind),
    SequenceOf(Box<TypeDesc>),
    SetOf(Box<TypeDesc>),
    OptionalOf(Box<TypeDesc>),
}

impl TypeDesc {
    pub fn member(catalogue: &'static str) -> Self {
        TypeDesc::Scalar(ScalarKind::Member(catalogue))
    }

    pub fn custom(name: &'static str) -> Self {
        TypeDesc::Scalar(ScalarKind::Custom(name))
    }

    pub fn sequence_of(inner: TypeDesc) -> Self { TypeDesc::SequenceOf(Box::new(inner)) }
    pub fn set_of(inner: TypeDesc) -> Self { TypeDesc::SetOf(Box::new(inner)) }
    pub fn optional_of(inner: TypeDesc) -> Self { TypeDesc::OptionalOf(Box::new(inner)) }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Scalar(kind)      => write!(f, "{kind}"),
            TypeDesc::SequenceOf(inner) => write!(f, "sequence<{inner}>"),
            TypeDesc::SetOf(inner)      => write!(f, "set<{inner}>"),
            TypeDesc::OptionalOf(inner) => write!(f, "optional<{inner}>"),
        }
    }
}

// ── Catalogue members ────────────────────────────────────────────────────────

/// A type-erased catalogue member.  Equality is identity of the shared
/// allocation, so two members compare equal only if one was cloned from the
/// other.
#[derive(Clone)]
pub struct Member(Arc<dyn Any + Send + Sync>);

impl Member {
    pub fn new<T: Any + Send + Sync>(member: T) -> Self {
        Member(Arc::new(member))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Member(..)")
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

// ── Values ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Ident(Identifier),
    Member(Member),
    Seq(Vec<Value>),
    /// Set elements in the order they were written or parsed.
    Set(Vec<Value>),
    Opt(Option<Box<Value>>),
}

impl Value {
    pub fn member<T: Any + Send + Sync>(member: T) -> Self {
        Value::Member(Member::new(member))
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Str(_)    => "string",
            Value::I8(_)     => "i8",
            Value::I16(_)    => "i16",
            Value::I32(_)    => "i32",
            Value::I64(_)    => "i64",
            Value::F32(_)    => "f32",
            Value::F64(_)    => "f64",
            Value::Bool(_)   => "bool",
            Value::Ident(_)  => "identifier",
            Value::Member(_) => "member",
            Value::Seq(_)    => "sequence",
            Value::Set(_)    => "set",
            Value::Opt(_)    => "optional",
        }
    }

    /// Recover a catalogue member of type `T`.
    pub fn into_member<T: Any + Clone>(self) -> Result<T, ValueMismatch> {
        match self {
            Value::Member(m) => m.downcast_ref::<T>().cloned().ok_or(ValueMismatch {
                expected: std::any::type_name::<T>(),
                found:    "member of another type",
            }),
            other => Err(ValueMismatch::new(std::any::type_name::<T>(), &other)),
        }
    }
}

/// A value of the wrong shape was handed to a field setter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected}, found {found}")]
pub struct ValueMismatch {
    pub expected: &'static str,
    pub found:    &'static str,
}

impl ValueMismatch {
    pub fn new(expected: &'static str, found: &Value) -> Self {
        Self { expected, found: found.kind() }
    }
}

// ── ConfigValue ──────────────────────────────────────────────────────────────

/// A Rust type that can live in a config field.
pub trait ConfigValue: Sized {
    fn type_desc() -> TypeDesc;
    fn to_value(&self) -> Value;
    fn from_value(value: Value) -> Result<Self, ValueMismatch>;
}

macro_rules! scalar_value {
    ($ty:ty, $kind:ident, $variant:ident) => {
        impl ConfigValue for $ty {
            fn type_desc() -> TypeDesc { TypeDesc::Scalar(ScalarKind::$kind) }
            fn to_value(&self) -> Value { Value::$variant(self.clone()) }
            fn from_value(value: Value) -> Result<Self, ValueMismatch> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(ValueMismatch::new(stringify!($ty), &other)),
                }
            }
        }
    };
}

scalar_value!(String,     Str,        Str);
scalar_value!(i8,         I8,         I8);
scalar_value!(i16,        I16,        I16);
scalar_value!(i32,        I32,        I32);
scalar_value!(i64,        I64,        I64);
scalar_value!(f32,        F32,        F32);
scalar_value!(f64,        F64,        F64);
scalar_value!(bool,       Bool,       Bool);
scalar_value!(Identifier, Identifier, Ident);

impl<T: ConfigValue> ConfigValue for Vec<T> {
    fn type_desc() -> TypeDesc { TypeDesc::sequence_of(T::type_desc()) }
    fn to_value(&self) -> Value { Value::Seq(self.iter().map(T::to_value).collect()) }
    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ValueMismatch::new("sequence", &other)),
        }
    }
}

// Written in sorted order; iteration order of a HashSet differs between
// instances and would make rewrites unstable.
impl<T: ConfigValue + Eq + Hash + Ord> ConfigValue for HashSet<T> {
    fn type_desc() -> TypeDesc { TypeDesc::set_of(T::type_desc()) }
    fn to_value(&self) -> Value {
        let mut items: Vec<&T> = self.iter().collect();
        items.sort();
        Value::Set(items.into_iter().map(T::to_value).collect())
    }
    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::Set(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ValueMismatch::new("set", &other)),
        }
    }
}

impl<T: ConfigValue + Ord> ConfigValue for BTreeSet<T> {
    fn type_desc() -> TypeDesc { TypeDesc::set_of(T::type_desc()) }
    fn to_value(&self) -> Value { Value::Set(self.iter().map(T::to_value).collect()) }
    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::Set(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ValueMismatch::new("set", &other)),
        }
    }
}

impl<T: ConfigValue> ConfigValue for Option<T> {
    fn type_desc() -> TypeDesc { TypeDesc::optional_of(T::type_desc()) }
    fn to_value(&self) -> Value {
        Value::Opt(self.as_ref().map(|v| Box::new(v.to_value())))
    }
    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::Opt(None)        => Ok(None),
            Value::Opt(Some(inner)) => T::from_value(*inner).map(Some),
            other => Err(ValueMismatch::new("optional", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_desc_follows_rust_type() {
        assert_eq!(
            <Vec<Option<i32>>>::type_desc(),
            TypeDesc::sequence_of(TypeDesc::optional_of(TypeDesc::Scalar(ScalarKind::I32)))
        );
        assert_eq!(<BTreeSet<String>>::type_desc().to_string(), "set<string>");
    }

    #[test]
    fn set_conversion_deduplicates() {
        let v = Value::Set(vec![Value::I32(1), Value::I32(2), Value::I32(1)]);
        let set = <HashSet<i32>>::from_value(v).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_value(), Value::Set(vec![Value::I32(1), Value::I32(2)]));
    }

    #[test]
    fn wrong_variant_is_a_mismatch() {
        let err = i32::from_value(Value::Str("x".into())).unwrap_err();
        assert_eq!(err, ValueMismatch { expected: "i32", found: "string" });
    }

    #[test]
    fn member_downcasts_to_original_type() {
        #[derive(Debug, Clone, PartialEq)]
        struct Stone;
        let v = Value::member(Stone);
        assert_eq!(v.clone(), v);
        assert_eq!(v.into_member::<Stone>().unwrap(), Stone);
        assert!(Value::member(1u8).into_member::<Stone>().is_err());
    }
}
