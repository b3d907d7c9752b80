//! Primary keys and the key-generator registry.
//!
//! Generators are looked up by an explicit [`KeyKind`] tag rather than by
//! runtime type inspection, and the registry lives in
//! [`Config`](crate::config::Config) instead of process-wide state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, RepoResult};
use crate::value::Value;

/// A primary-key value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Int(i64),
    Text(String),
    Uuid(uuid::Uuid),
}

impl Key {
    /// The tag identifying this key's kind.
    pub fn kind(&self) -> KeyKind {
        match self {
            Key::Int(_) => KeyKind::Int,
            Key::Text(_) => KeyKind::Text,
            Key::Uuid(_) => KeyKind::Uuid,
        }
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Int(v) => Value::BigInt(v),
            Key::Text(v) => Value::Text(v),
            Key::Uuid(v) => Value::Uuid(v),
        }
    }
}

impl From<&Key> for Value {
    fn from(key: &Key) -> Self {
        key.clone().into()
    }
}

/// Tag enum keying the generator registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Int,
    Text,
    Uuid,
}

/// Produces fresh primary keys of one kind.
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> RepoResult<Key>;
}

/// Random UUID keys.
pub struct UuidKeys;

impl KeyGenerator for UuidKeys {
    fn generate(&self) -> RepoResult<Key> {
        Ok(Key::Uuid(uuid::Uuid::new_v4()))
    }
}

/// Random UUIDs rendered as text keys, for text-typed id columns.
pub struct TextUuidKeys;

impl KeyGenerator for TextUuidKeys {
    fn generate(&self) -> RepoResult<Key> {
        Ok(Key::Text(uuid::Uuid::new_v4().to_string()))
    }
}

/// Registry of key generators, keyed by [`KeyKind`].
#[derive(Clone, Default)]
pub struct KeyGenerators {
    generators: HashMap<KeyKind, Arc<dyn KeyGenerator>>,
}

impl KeyGenerators {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the UUID-based generators pre-registered for the
    /// `Uuid` and `Text` kinds. `Int` keys are left to the database
    /// (sequences) unless a generator is registered explicitly.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(KeyKind::Uuid, UuidKeys);
        registry.register(KeyKind::Text, TextUuidKeys);
        registry
    }

    /// Register a generator for a key kind, replacing any previous one.
    pub fn register(&mut self, kind: KeyKind, generator: impl KeyGenerator + 'static) -> &mut Self {
        self.generators.insert(kind, Arc::new(generator));
        self
    }

    /// Whether a generator is registered for `kind`.
    pub fn contains(&self, kind: KeyKind) -> bool {
        self.generators.contains_key(&kind)
    }

    /// Draw a fresh key of the given kind.
    pub fn generate(&self, kind: KeyKind) -> RepoResult<Key> {
        match self.generators.get(&kind) {
            Some(generator) => generator.generate(),
            None => Err(RepoError::KeyGenerator(format!(
                "no generator registered for {kind:?} keys"
            ))),
        }
    }
}

impl fmt::Debug for KeyGenerators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGenerators")
            .field("kinds", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_uuid_and_text() {
        let registry = KeyGenerators::with_defaults();
        assert!(registry.contains(KeyKind::Uuid));
        assert!(registry.contains(KeyKind::Text));
        assert!(!registry.contains(KeyKind::Int));
    }

    #[test]
    fn generated_keys_match_their_kind() {
        let registry = KeyGenerators::with_defaults();
        assert_eq!(registry.generate(KeyKind::Uuid).unwrap().kind(), KeyKind::Uuid);
        assert_eq!(registry.generate(KeyKind::Text).unwrap().kind(), KeyKind::Text);
    }

    #[test]
    fn missing_generator_is_an_error() {
        let registry = KeyGenerators::new();
        let err = registry.generate(KeyKind::Int).unwrap_err();
        assert!(matches!(err, RepoError::KeyGenerator(_)));
    }

    #[test]
    fn register_replaces() {
        struct FixedInt;
        impl KeyGenerator for FixedInt {
            fn generate(&self) -> RepoResult<Key> {
                Ok(Key::Int(7))
            }
        }

        let mut registry = KeyGenerators::new();
        registry.register(KeyKind::Int, FixedInt);
        assert_eq!(registry.generate(KeyKind::Int).unwrap(), Key::Int(7));
    }

    #[test]
    fn key_converts_to_value() {
        assert_eq!(Value::from(Key::Int(3)), Value::BigInt(3));
        assert_eq!(
            Value::from(Key::Text("k".to_string())),
            Value::Text("k".to_string())
        );
    }
}
