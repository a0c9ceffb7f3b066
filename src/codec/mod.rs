//! Codecs: bidirectional converters between one [`Value`] and its text form.
//!
//! # Contract
//! A codec is stateless.  `write` must produce text that `parse` accepts and
//! turns back into an equal value (floats: equal after round-trip, not
//! textually equal).  Both directions see the field's [`FieldMeta`], so a
//! codec can enforce `at_least` / `at_most` while parsing.
//!
//! Codecs compose structurally: the wrappers in [`combinator`] hold an inner
//! codec and never subclass it.

use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::catalogue::Catalogue;
use crate::field::{Bound, FieldMeta};
use crate::identifier::{Identifier, IdentifierError};
use crate::value::{Value, ValueMismatch};

pub mod combinator;

pub use combinator::{OptionalCodec, SequenceCodec, SetCodec};

// ── Error type ───────────────────────────────────────────────────────────────

/// Which side of a bound was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    AtLeast,
    AtMost,
}

impl Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::AtLeast => f.write_str("at least"),
            Limit::AtMost  => f.write_str("at most"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("Cannot parse '{raw}' as {expected}")]
    Invalid { raw: String, expected: &'static str },
    #[error("Value {value} is not {limit} {bound}")]
    BoundViolation { value: String, limit: Limit, bound: Bound },
    #[error("Cannot find anything named {name} in catalogue {catalogue}")]
    UnknownRegistryMember { catalogue: &'static str, name: String },
    #[error("Member has no name in catalogue {catalogue}")]
    UnnamedMember { catalogue: &'static str },
    #[error("Wrong value for codec: {0}")]
    TypeMismatch(#[from] ValueMismatch),
    #[error("{0} is a parse-only codec")]
    WriteUnsupported(String),
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
}

// ── Codec trait ──────────────────────────────────────────────────────────────

pub trait Codec: Send + Sync {
    fn write(&self, meta: &FieldMeta, value: &Value) -> Result<String, CodecError>;
    fn parse(&self, meta: &FieldMeta, raw: &str) -> Result<Value, CodecError>;
}

impl<C: Codec + ?Sized> Codec for Arc<C> {
    fn write(&self, meta: &FieldMeta, value: &Value) -> Result<String, CodecError> {
        (**self).write(meta, value)
    }
    fn parse(&self, meta: &FieldMeta, raw: &str) -> Result<Value, CodecError> {
        (**self).parse(meta, raw)
    }
}

// ── Built-in scalar codecs ───────────────────────────────────────────────────

/// Identity codec for UTF-8 strings.
pub struct StringCodec;
impl Codec for StringCodec {
    fn write(&self, _: &FieldMeta, value: &Value) -> Result<String, CodecError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(ValueMismatch::new("string", other).into()),
        }
    }
    fn parse(&self, _: &FieldMeta, raw: &str) -> Result<Value, CodecError> {
        Ok(Value::Str(raw.to_owned()))
    }
}

/// `true` / `false`, case-insensitive on input, lowercase on output.
pub struct BoolCodec;
impl Codec for BoolCodec {
    fn write(&self, _: &FieldMeta, value: &Value) -> Result<String, CodecError> {
        match value {
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(ValueMismatch::new("bool", other).into()),
        }
    }
    fn parse(&self, _: &FieldMeta, raw: &str) -> Result<Value, CodecError> {
        if raw.eq_ignore_ascii_case("true") {
            Ok(Value::Bool(true))
        } else if raw.eq_ignore_ascii_case("false") {
            Ok(Value::Bool(false))
        } else {
            Err(CodecError::Invalid { raw: raw.to_owned(), expected: "a bool (true / false)" })
        }
    }
}

pub struct IdentifierCodec;
impl Codec for IdentifierCodec {
    fn write(&self, _: &FieldMeta, value: &Value) -> Result<String, CodecError> {
        match value {
            Value::Ident(id) => Ok(id.to_string()),
            other => Err(ValueMismatch::new("identifier", other).into()),
        }
    }
    fn parse(&self, _: &FieldMeta, raw: &str) -> Result<Value, CodecError> {
        Ok(Value::Ident(Identifier::parse(raw)?))
    }
}

// ── Numbers ──────────────────────────────────────────────────────────────────

/// A primitive number the registry has a codec for.
pub trait Numeric: Copy + FromStr + Display + Into<Bound> + Send + Sync + 'static {
    /// Used in error messages.
    const NAME: &'static str;
    fn wrap(self) -> Value;
    fn unwrap(value: &Value) -> Option<Self>;
}

macro_rules! numeric {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl Numeric for $ty {
            const NAME: &'static str = $name;
            fn wrap(self) -> Value { Value::$variant(self) }
            fn unwrap(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

numeric!(i8,  I8,  "an 8-bit integer");
numeric!(i16, I16, "a 16-bit integer");
numeric!(i32, I32, "an integer");
numeric!(i64, I64, "a 64-bit integer");
numeric!(f32, F32, "a float");
numeric!(f64, F64, "a double");

/// Parses with `FromStr`, writes with `Display`, and checks the field's
/// `at_least` / `at_most` bounds after a successful parse.
pub struct NumberCodec<T>(PhantomData<fn() -> T>);

impl<T> NumberCodec<T> {
    pub fn new() -> Self { NumberCodec(PhantomData) }
}

impl<T> Default for NumberCodec<T> {
    fn default() -> Self { Self::new() }
}

impl<T: Numeric> Codec for NumberCodec<T> {
    fn write(&self, _: &FieldMeta, value: &Value) -> Result<String, CodecError> {
        T::unwrap(value)
            .map(|x| x.to_string())
            .ok_or_else(|| ValueMismatch::new(T::NAME, value).into())
    }

    fn parse(&self, meta: &FieldMeta, raw: &str) -> Result<Value, CodecError> {
        let x: T = raw
            .parse()
            .map_err(|_| CodecError::Invalid { raw: raw.to_owned(), expected: T::NAME })?;
        let as_bound: Bound = x.into();

        if let Some(min) = meta.at_least {
            if as_bound < min {
                return Err(CodecError::BoundViolation {
                    value: x.to_string(),
                    limit: Limit::AtLeast,
                    bound: min,
                });
            }
        }
        if let Some(max) = meta.at_most {
            if as_bound > max {
                return Err(CodecError::BoundViolation {
                    value: x.to_string(),
                    limit: Limit::AtMost,
                    bound: max,
                });
            }
        }
        Ok(x.wrap())
    }
}

// ── Catalogue members ────────────────────────────────────────────────────────

/// Writes a catalogue member as its identifier and parses by lookup.
pub struct CatalogueCodec<C> {
    catalogue: Arc<C>,
}

impl<C: Catalogue> CatalogueCodec<C> {
    pub fn new(catalogue: Arc<C>) -> Self { Self { catalogue } }
}

impl<C: Catalogue> Codec for CatalogueCodec<C> {
    fn write(&self, _: &FieldMeta, value: &Value) -> Result<String, CodecError> {
        let id = self.catalogue.id();
        let member = match value {
            Value::Member(m) => m.downcast_ref::<C::Member>().ok_or(ValueMismatch {
                expected: id,
                found:    "member of another catalogue",
            })?,
            other => return Err(ValueMismatch::new(id, other).into()),
        };
        self.catalogue
            .name_of(member)
            .map(|name| name.to_string())
            .ok_or(CodecError::UnnamedMember { catalogue: id })
    }

    fn parse(&self, _: &FieldMeta, raw: &str) -> Result<Value, CodecError> {
        let name = Identifier::parse(raw)?;
        match self.catalogue.lookup(&name) {
            Some(member) => Ok(Value::member(member)),
            None => Err(CodecError::UnknownRegistryMember {
                catalogue: self.catalogue.id(),
                name:      name.to_string(),
            }),
        }
    }
}

// ── Adapters ─────────────────────────────────────────────────────────────────

/// Turns a codec over one value shape into a codec over another.
///
/// `into` runs after the inner codec parses; `from` runs before it writes.
pub struct MapCodec<F, G> {
    inner: Arc<dyn Codec>,
    into:  F,
    from:  G,
}

impl<F, G> MapCodec<F, G>
where
    F: Fn(Value) -> Result<Value, CodecError> + Send + Sync,
    G: Fn(&Value) -> Result<Value, CodecError> + Send + Sync,
{
    pub fn new(inner: Arc<dyn Codec>, into: F, from: G) -> Self {
        Self { inner, into, from }
    }
}

impl<F, G> Codec for MapCodec<F, G>
where
    F: Fn(Value) -> Result<Value, CodecError> + Send + Sync,
    G: Fn(&Value) -> Result<Value, CodecError> + Send + Sync,
{
    fn write(&self, meta: &FieldMeta, value: &Value) -> Result<String, CodecError> {
        self.inner.write(meta, &(self.from)(value)?)
    }
    fn parse(&self, meta: &FieldMeta, raw: &str) -> Result<Value, CodecError> {
        (self.into)(self.inner.parse(meta, raw)?)
    }
}

/// A codec that can read values but refuses to write them, so a field using
/// it can never be stringified.
pub struct ParseOnlyCodec<P> {
    name:   String,
    parser: P,
}

impl<P> ParseOnlyCodec<P>
where
    P: Fn(&FieldMeta, &str) -> Result<Value, CodecError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, parser: P) -> Self {
        Self { name: name.into(), parser }
    }
}

impl<P> Codec for ParseOnlyCodec<P>
where
    P: Fn(&FieldMeta, &str) -> Result<Value, CodecError> + Send + Sync,
{
    fn write(&self, _: &FieldMeta, _: &Value) -> Result<String, CodecError> {
        Err(CodecError::WriteUnsupported(self.name.clone()))
    }
    fn parse(&self, meta: &FieldMeta, raw: &str) -> Result<Value, CodecError> {
        (self.parser)(meta, raw)
    }
}
