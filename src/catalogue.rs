//! Host-supplied catalogues of named domain objects.
//!
//! A catalogue maps [`Identifier`]s to members and back.  Registering one with
//! the [`CodecRegistry`](crate::registry::CodecRegistry) makes every field of
//! type `TypeDesc::member(catalogue.id())` readable and writable by name.

use crate::identifier::Identifier;

pub trait Catalogue: Send + Sync + 'static {
    type Member: Clone + Send + Sync + 'static;

    /// Stable id of this catalogue; matches `ScalarKind::Member(id)`.
    fn id(&self) -> &'static str;
    fn lookup(&self, name: &Identifier) -> Option<Self::Member>;
    fn name_of(&self, member: &Self::Member) -> Option<Identifier>;
}

/// A fixed list of `(name, member)` pairs.
#[derive(Debug, Clone)]
pub struct StaticCatalogue<T> {
    id:      &'static str,
    entries: Vec<(Identifier, T)>,
}

impl<T> StaticCatalogue<T> {
    pub fn new(id: &'static str) -> Self {
        Self { id, entries: Vec::new() }
    }

    pub fn with(mut self, name: Identifier, member: T) -> Self {
        self.entries.push((name, member));
        self
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl<T> Catalogue for StaticCatalogue<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    type Member = T;

    fn id(&self) -> &'static str { self.id }

    fn lookup(&self, name: &Identifier) -> Option<T> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, m)| m.clone())
    }

    fn name_of(&self, member: &T) -> Option<Identifier> {
        self.entries.iter().find(|(_, m)| m == member).map(|(n, _)| n.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_name_of_are_inverse() {
        let blocks = StaticCatalogue::new("block")
            .with(Identifier::parse("stone").unwrap(), 1u32)
            .with(Identifier::parse("dirt").unwrap(), 2u32);
        assert_eq!(blocks.len(), 2);

        let dirt = Identifier::parse("minecraft:dirt").unwrap();
        assert_eq!(blocks.lookup(&dirt), Some(2));
        assert_eq!(blocks.name_of(&2), Some(dirt));
        assert_eq!(blocks.lookup(&Identifier::parse("glass").unwrap()), None);
        assert_eq!(blocks.name_of(&3), None);
    }
}
