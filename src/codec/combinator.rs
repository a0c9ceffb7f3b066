//! Wrapper codecs: sequence-of-T, set-of-T and optional-of-T.
//!
//! Collections are written as the inner codec's output joined with `", "`
//! and parsed by splitting on `,` and trimming each piece.  An empty string
//! splits into one empty piece, which is handed to the inner codec like any
//! other; a string collection therefore reads `""` back as `[""]` and a
//! numeric one fails.  [`SequenceCodec::skipping_empty`] and
//! [`SetCodec::skipping_empty`] drop empty pieces instead.

use std::sync::Arc;

use super::{Codec, CodecError};
use crate::field::FieldMeta;
use crate::value::{Value, ValueMismatch};

const SEPARATOR: char = ',';
const JOINER: &str = ", ";

fn write_all(
    inner: &dyn Codec,
    meta:  &FieldMeta,
    items: &[Value],
) -> Result<String, CodecError> {
    let parts = items
        .iter()
        .map(|item| inner.write(meta, item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(JOINER))
}

fn parse_all(
    inner:       &dyn Codec,
    meta:        &FieldMeta,
    raw:         &str,
    skip_empty:  bool,
) -> Result<Vec<Value>, CodecError> {
    raw.split(SEPARATOR)
        .map(str::trim)
        .filter(|piece| !skip_empty || !piece.is_empty())
        .map(|piece| inner.parse(meta, piece))
        .collect()
}

// ── Sequence ─────────────────────────────────────────────────────────────────

/// Ordered collection; element order survives a round trip.
pub struct SequenceCodec {
    inner:      Arc<dyn Codec>,
    skip_empty: bool,
}

impl SequenceCodec {
    pub fn new(inner: Arc<dyn Codec>) -> Self {
        Self { inner, skip_empty: false }
    }

    /// Ignore empty pieces when parsing, so `""` reads as an empty sequence.
    pub fn skipping_empty(mut self) -> Self {
        self.skip_empty = true;
        self
    }
}

impl Codec for SequenceCodec {
    fn write(&self, meta: &FieldMeta, value: &Value) -> Result<String, CodecError> {
        match value {
            Value::Seq(items) => write_all(self.inner.as_ref(), meta, items),
            other => Err(ValueMismatch::new("sequence", other).into()),
        }
    }
    fn parse(&self, meta: &FieldMeta, raw: &str) -> Result<Value, CodecError> {
        parse_all(self.inner.as_ref(), meta, raw, self.skip_empty).map(Value::Seq)
    }
}

// ── Set ──────────────────────────────────────────────────────────────────────

/// Unordered collection.  Elements are written in the order the value holds
/// them; duplicates are collapsed by the set type the value converts into.
pub struct SetCodec {
    inner:      Arc<dyn Codec>,
    skip_empty: bool,
}

impl SetCodec {
    pub fn new(inner: Arc<dyn Codec>) -> Self {
        Self { inner, skip_empty: false }
    }

    pub fn skipping_empty(mut self) -> Self {
        self.skip_empty = true;
        self
    }
}

impl Codec for SetCodec {
    fn write(&self, meta: &FieldMeta, value: &Value) -> Result<String, CodecError> {
        match value {
            Value::Set(items) => write_all(self.inner.as_ref(), meta, items),
            other => Err(ValueMismatch::new("set", other).into()),
        }
    }
    fn parse(&self, meta: &FieldMeta, raw: &str) -> Result<Value, CodecError> {
        parse_all(self.inner.as_ref(), meta, raw, self.skip_empty).map(Value::Set)
    }
}

// ── Optional ─────────────────────────────────────────────────────────────────

/// The empty string means "absent"; anything else goes to the inner codec.
pub struct OptionalCodec {
    inner: Arc<dyn Codec>,
}

impl OptionalCodec {
    pub fn new(inner: Arc<dyn Codec>) -> Self { Self { inner } }
}

impl Codec for OptionalCodec {
    fn write(&self, meta: &FieldMeta, value: &Value) -> Result<String, CodecError> {
        match value {
            Value::Opt(None)        => Ok(String::new()),
            Value::Opt(Some(inner)) => self.inner.write(meta, inner),
            other => Err(ValueMismatch::new("optional", other).into()),
        }
    }
    fn parse(&self, meta: &FieldMeta, raw: &str) -> Result<Value, CodecError> {
        if raw.is_empty() {
            return Ok(Value::Opt(None));
        }
        Ok(Value::Opt(Some(Box::new(self.inner.parse(meta, raw)?))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{NumberCodec, StringCodec};
    use crate::field::Bound;
    use std::collections::BTreeSet;

    fn ints() -> Arc<dyn Codec> { Arc::new(NumberCodec::<i32>::new()) }

    fn i32s(values: &[i32]) -> Vec<Value> {
        values.iter().copied().map(Value::I32).collect()
    }

    #[test]
    fn sequence_joins_and_preserves_order() {
        let codec = SequenceCodec::new(ints());
        let meta = FieldMeta::default();
        assert_eq!(codec.write(&meta, &Value::Seq(i32s(&[1, 2, 3]))).unwrap(), "1, 2, 3");
        assert_eq!(codec.parse(&meta, "3,  1 ,2").unwrap(), Value::Seq(i32s(&[3, 1, 2])));
    }

    #[test]
    fn set_parse_is_order_independent() {
        let codec = SetCodec::new(ints());
        let meta = FieldMeta::default();
        let parsed = match codec.parse(&meta, "3, 1, 2, 1").unwrap() {
            Value::Set(items) => items,
            other => panic!("expected set, got {other:?}"),
        };
        let set: BTreeSet<i32> = parsed
            .into_iter()
            .map(|v| match v { Value::I32(i) => i, _ => unreachable!() })
            .collect();
        assert_eq!(set, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn bounds_apply_to_each_element() {
        let codec = SequenceCodec::new(ints());
        let meta = FieldMeta { at_least: Some(Bound::Int(0)), ..FieldMeta::default() };
        assert!(matches!(
            codec.parse(&meta, "1, -1"),
            Err(CodecError::BoundViolation { .. })
        ));
    }

    // Historical behaviour: an empty value is one empty element, not an
    // empty collection.
    #[test]
    fn empty_string_parses_one_empty_element() {
        let meta = FieldMeta::default();

        let strings = SequenceCodec::new(Arc::new(StringCodec));
        assert_eq!(strings.parse(&meta, "").unwrap(), Value::Seq(vec![Value::Str(String::new())]));
        assert_eq!(strings.write(&meta, &Value::Seq(vec![])).unwrap(), "");

        let numbers = SetCodec::new(ints());
        assert!(matches!(numbers.parse(&meta, ""), Err(CodecError::Invalid { .. })));
    }

    #[test]
    fn skipping_empty_reads_empty_collections() {
        let meta = FieldMeta::default();
        let seq = SequenceCodec::new(ints()).skipping_empty();
        assert_eq!(seq.parse(&meta, "").unwrap(), Value::Seq(vec![]));
        assert_eq!(seq.parse(&meta, "1,,2, ").unwrap(), Value::Seq(i32s(&[1, 2])));
        let set = SetCodec::new(ints()).skipping_empty();
        assert_eq!(set.parse(&meta, " ").unwrap(), Value::Set(vec![]));
    }

    #[test]
    fn optional_uses_empty_string_for_absent() {
        let codec = OptionalCodec::new(ints());
        let meta = FieldMeta::default();
        assert_eq!(codec.write(&meta, &Value::Opt(None)).unwrap(), "");
        assert_eq!(codec.parse(&meta, "").unwrap(), Value::Opt(None));
        assert_eq!(
            codec.parse(&meta, "7").unwrap(),
            Value::Opt(Some(Box::new(Value::I32(7))))
        );
        assert_eq!(codec.write(&meta, &Value::Opt(Some(Box::new(Value::I32(7))))).unwrap(), "7");
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let meta = FieldMeta::default();
        assert!(matches!(
            SequenceCodec::new(ints()).write(&meta, &Value::Set(vec![])),
            Err(CodecError::TypeMismatch(_))
        ));
    }
}
