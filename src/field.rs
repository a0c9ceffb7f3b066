//! Field descriptors: one persisted slot of a config record.
//!
//! A [`Field`] carries the key written to disk, the declared [`TypeDesc`],
//! the documentation/validation metadata in [`FieldMeta`], and a get/set
//! accessor pair against the record type `R`.

use std::cmp::Ordering;
use std::fmt;

use crate::value::{ConfigValue, TypeDesc, Value, ValueMismatch};

// ── Bounds ───────────────────────────────────────────────────────────────────

/// A numeric limit for `at_least` / `at_most`.
///
/// Integer bounds compare exactly against integer values.  Any comparison
/// involving a float widens both sides to `f64`; NaN is unordered and never
/// violates a bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Int(i64),
    F32(f32),
    F64(f64),
}

impl Bound {
    fn as_f64(self) -> f64 {
        match self {
            Bound::Int(v) => v as f64,
            Bound::F32(v) => f64::from(v),
            Bound::F64(v) => v,
        }
    }
}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Bound::Int(a), Bound::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Int(v) => write!(f, "{v}"),
            Bound::F32(v) => write!(f, "{v}"),
            Bound::F64(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! int_bound {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Bound {
            fn from(v: $ty) -> Self { Bound::Int(i64::from(v)) }
        }
    )*};
}
int_bound!(i8, i16, i32, i64);

impl From<f32> for Bound {
    fn from(v: f32) -> Self { Bound::F32(v) }
}

impl From<f64> for Bound {
    fn from(v: f64) -> Self { Bound::F64(v) }
}

// ── Metadata ─────────────────────────────────────────────────────────────────

/// How the `# Default:` comment is produced for a field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DefaultComment {
    /// Write the default value through the field's codec.
    #[default]
    Written,
    /// Leave the comment out.
    Omitted,
    /// Write this text in place of the default value.
    Replaced(String),
}

/// Documentation and validation attached to a field.
#[derive(Debug, Clone, Default)]
pub struct FieldMeta {
    pub comment:     Vec<String>,
    pub example:     Vec<String>,
    pub note:        Vec<String>,
    pub section:     Option<String>,
    pub blank_lines: usize,
    pub at_least:    Option<Bound>,
    pub at_most:     Option<Bound>,
    pub skip:        bool,
    pub default:     DefaultComment,
    /// Name of a codec registered with `register_named`.
    pub codec:       Option<String>,
}

// ── Field ────────────────────────────────────────────────────────────────────

type Getter<R> = Box<dyn Fn(&R) -> Value + Send + Sync>;
type Setter<R> = Box<dyn Fn(&mut R, Value) -> Result<(), ValueMismatch> + Send + Sync>;

pub struct Field<R> {
    name: &'static str,
    ty:   TypeDesc,
    meta: FieldMeta,
    get:  Getter<R>,
    set:  Setter<R>,
}

impl<R: 'static> Field<R> {
    /// Describe a field of any [`ConfigValue`] type through a pair of
    /// projections into the record.
    ///
    /// An empty numeric sequence or set is written as `key:` and fails to
    /// parse on the next read.  Fields that may legitimately be empty should
    /// name a codec registered with [`CodecRegistry::register_named`] around
    /// [`SequenceCodec::skipping_empty`] or [`SetCodec::skipping_empty`].
    ///
    /// [`CodecRegistry::register_named`]: crate::registry::CodecRegistry::register_named
    /// [`SequenceCodec::skipping_empty`]: crate::codec::SequenceCodec::skipping_empty
    /// [`SetCodec::skipping_empty`]: crate::codec::SetCodec::skipping_empty
    ///
    /// ```
    /// use cfgkit::field::Field;
    ///
    /// struct Limits { max_players: i32 }
    ///
    /// let field = Field::new("max_players", |c: &Limits| &c.max_players, |c: &mut Limits| &mut c.max_players)
    ///     .comment("Players allowed at once")
    ///     .at_least(1);
    /// assert_eq!(field.name(), "max_players");
    /// ```
    pub fn new<V>(name: &'static str, get: fn(&R) -> &V, get_mut: fn(&mut R) -> &mut V) -> Self
    where
        V: ConfigValue + 'static,
    {
        Self {
            name,
            ty:   V::type_desc(),
            meta: FieldMeta::default(),
            get:  Box::new(move |record: &R| get(record).to_value()),
            set:  Box::new(move |record: &mut R, value: Value| {
                *get_mut(record) = V::from_value(value)?;
                Ok(())
            }),
        }
    }

    /// Describe a field with hand-written accessors, for types that have no
    /// [`ConfigValue`] impl (typically paired with [`Field::codec`]).
    pub fn custom<G, S>(name: &'static str, ty: TypeDesc, get: G, set: S) -> Self
    where
        G: Fn(&R) -> Value + Send + Sync + 'static,
        S: Fn(&mut R, Value) -> Result<(), ValueMismatch> + Send + Sync + 'static,
    {
        Self { name, ty, meta: FieldMeta::default(), get: Box::new(get), set: Box::new(set) }
    }
}

impl<R> Field<R> {
    pub fn name(&self) -> &'static str { self.name }
    pub fn type_desc(&self) -> &TypeDesc { &self.ty }
    pub fn meta(&self) -> &FieldMeta { &self.meta }

    /// Skipped fields are neither written nor read; their key is reported as
    /// unknown if it shows up in a file.
    pub fn is_skipped(&self) -> bool { self.meta.skip }

    pub fn get(&self, record: &R) -> Value { (self.get)(record) }

    pub fn set(&self, record: &mut R, value: Value) -> Result<(), ValueMismatch> {
        (self.set)(record, value)
    }

    // ── Metadata builders ────────────────────────────────────────────────

    /// Add `# <line>` comment lines.
    pub fn comment<I, S>(mut self, lines: I) -> Self
    where
        I: IntoLines<S>,
        S: Into<String>,
    {
        self.meta.comment.extend(lines.into_lines().into_iter().map(Into::into));
        self
    }

    /// Add `# Example: <line>` comment lines.
    pub fn example<I, S>(mut self, lines: I) -> Self
    where
        I: IntoLines<S>,
        S: Into<String>,
    {
        self.meta.example.extend(lines.into_lines().into_iter().map(Into::into));
        self
    }

    /// Add a `# Note:` block.
    pub fn note<I, S>(mut self, lines: I) -> Self
    where
        I: IntoLines<S>,
        S: Into<String>,
    {
        self.meta.note.extend(lines.into_lines().into_iter().map(Into::into));
        self
    }

    /// Open a section with a banner before this field.
    pub fn section(mut self, title: impl Into<String>) -> Self {
        self.meta.section = Some(title.into());
        self
    }

    pub fn blank_lines(mut self, count: usize) -> Self {
        self.meta.blank_lines = count;
        self
    }

    pub fn at_least(mut self, bound: impl Into<Bound>) -> Self {
        self.meta.at_least = Some(bound.into());
        self
    }

    pub fn at_most(mut self, bound: impl Into<Bound>) -> Self {
        self.meta.at_most = Some(bound.into());
        self
    }

    pub fn skip(mut self) -> Self {
        self.meta.skip = true;
        self
    }

    /// Don't write a `# Default:` comment.
    pub fn skip_default(mut self) -> Self {
        self.meta.default = DefaultComment::Omitted;
        self
    }

    /// Write `# Default: <text>` instead of the real default.
    pub fn skip_default_with(mut self, text: impl Into<String>) -> Self {
        self.meta.default = DefaultComment::Replaced(text.into());
        self
    }

    /// Use the codec registered under `name` instead of resolving by type.
    pub fn codec(mut self, name: impl Into<String>) -> Self {
        self.meta.codec = Some(name.into());
        self
    }
}

impl<R> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// One line or several: lets metadata builders take `"text"` as well as
/// `["a", "b"]`.
pub trait IntoLines<S> {
    fn into_lines(self) -> Vec<S>;
}

impl<'a> IntoLines<&'a str> for &'a str {
    fn into_lines(self) -> Vec<&'a str> { vec![self] }
}

impl IntoLines<String> for String {
    fn into_lines(self) -> Vec<String> { vec![self] }
}

impl<S, const N: usize> IntoLines<S> for [S; N] {
    fn into_lines(self) -> Vec<S> { self.into() }
}

impl<S> IntoLines<S> for Vec<S> {
    fn into_lines(self) -> Vec<S> { self }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ScalarKind;

    #[derive(Default)]
    struct Sample {
        count: i32,
        tags:  Vec<String>,
    }

    #[test]
    fn accessors_read_and_write_the_record() {
        let count = Field::new("count", |s: &Sample| &s.count, |s: &mut Sample| &mut s.count);
        let mut sample = Sample::default();
        count.set(&mut sample, Value::I32(7)).unwrap();
        assert_eq!(sample.count, 7);
        assert_eq!(count.get(&sample), Value::I32(7));
        assert_eq!(count.type_desc(), &TypeDesc::Scalar(ScalarKind::I32));
    }

    #[test]
    fn setter_rejects_wrong_shape() {
        let tags = Field::new("tags", |s: &Sample| &s.tags, |s: &mut Sample| &mut s.tags);
        let mut sample = Sample::default();
        let err = tags.set(&mut sample, Value::Str("x".into())).unwrap_err();
        assert_eq!(err.expected, "sequence");
    }

    #[test]
    fn builders_accumulate_metadata() {
        let f = Field::new("count", |s: &Sample| &s.count, |s: &mut Sample| &mut s.count)
            .comment("first")
            .comment(["second", "third"])
            .note(vec!["n".to_string()])
            .at_least(50)
            .at_most(100i64)
            .skip_default_with("depends");
        assert_eq!(f.meta().comment, vec!["first", "second", "third"]);
        assert_eq!(f.meta().note, vec!["n"]);
        assert_eq!(f.meta().at_least, Some(Bound::Int(50)));
        assert_eq!(f.meta().at_most, Some(Bound::Int(100)));
        assert_eq!(f.meta().default, DefaultComment::Replaced("depends".into()));
    }

    #[test]
    fn bounds_order_across_kinds() {
        assert!(Bound::Int(10) < Bound::Int(50));
        assert!(Bound::F32(0.5) < Bound::Int(1));
        assert!(Bound::Int(i64::MAX) > Bound::Int(i64::MAX - 1));
        assert_eq!(Bound::F64(f64::NAN).partial_cmp(&Bound::Int(0)), None);
        assert_eq!(Bound::F32(0.1).to_string(), "0.1");
    }
}
