//! Type Registry
//!
//! Stored values are type-erased, so a snapshot can only carry values whose
//! concrete type the embedding application registered up front. Each
//! registration binds a stable string tag to monomorphic encode/decode
//! functions for one type.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cache::Value;
use crate::error::{Result, SnapshotError};

type EncodeFn = fn(&(dyn Any + Send + Sync)) -> Result<Vec<u8>>;
type DecodeFn = fn(&[u8]) -> Result<Value>;

/// A stored value as written to disk: its registry tag plus the bincode
/// payload of the concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedValue {
    pub tag: String,
    pub payload: Vec<u8>,
}

#[derive(Clone, Copy)]
struct Binding {
    type_id: TypeId,
    type_name: &'static str,
    encode: EncodeFn,
    decode: DecodeFn,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// == Type Registry ==
/// Maps tags to concrete types for snapshot encoding and decoding.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    by_tag: HashMap<String, Binding>,
    tags: HashMap<TypeId, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Registers `T` under `tag`.
    ///
    /// Registering the same type under the same tag again is a no-op.
    /// Reusing a tag for another type, or a type under another tag, fails.
    pub fn register<T>(&mut self, tag: impl Into<String>) -> Result<&mut Self>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let tag = tag.into();
        let type_id = TypeId::of::<T>();

        if let Some(existing) = self.by_tag.get(&tag) {
            if existing.type_id == type_id {
                return Ok(self);
            }
            return Err(SnapshotError::DuplicateRegistration(format!(
                "tag '{}' already bound to {}",
                tag, existing.type_name
            )));
        }
        if let Some(existing) = self.tags.get(&type_id) {
            return Err(SnapshotError::DuplicateRegistration(format!(
                "{} already registered as '{}'",
                type_name::<T>(),
                existing
            )));
        }

        self.by_tag.insert(
            tag.clone(),
            Binding {
                type_id,
                type_name: type_name::<T>(),
                encode: encode_as::<T>,
                decode: decode_as::<T>,
            },
        );
        self.tags.insert(type_id, tag);
        Ok(self)
    }

    /// Builder form of `register`.
    pub fn with<T>(mut self, tag: impl Into<String>) -> Result<Self>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.register::<T>(tag)?;
        Ok(self)
    }

    /// Returns the tag `T` is registered under.
    pub fn tag_of<T: 'static>(&self) -> Option<&str> {
        self.tags.get(&TypeId::of::<T>()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    // == Encode / Decode ==
    /// Serializes a stored value under its registered tag.
    pub fn encode_value(&self, value: &Value) -> Result<TaggedValue> {
        let inner: &(dyn Any + Send + Sync) = value.as_ref();
        let tag = self
            .tags
            .get(&inner.type_id())
            .ok_or_else(|| SnapshotError::UnregisteredType(format!("{:?}", inner.type_id())))?;
        let binding = &self.by_tag[tag];

        Ok(TaggedValue {
            tag: tag.clone(),
            payload: (binding.encode)(inner)?,
        })
    }

    /// Rebuilds a stored value from its tag and payload.
    pub fn decode_value(&self, tagged: &TaggedValue) -> Result<Value> {
        let binding = self
            .by_tag
            .get(&tagged.tag)
            .ok_or_else(|| SnapshotError::UnregisteredType(tagged.tag.clone()))?;
        (binding.decode)(&tagged.payload)
    }
}

fn encode_as<T: Serialize + 'static>(value: &(dyn Any + Send + Sync)) -> Result<Vec<u8>> {
    let concrete = value
        .downcast_ref::<T>()
        .ok_or_else(|| SnapshotError::UnregisteredType(type_name::<T>().to_string()))?;
    bincode::serialize(concrete).map_err(SnapshotError::Encode)
}

fn decode_as<T>(payload: &[u8]) -> Result<Value>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let concrete: T = bincode::deserialize(payload).map_err(SnapshotError::Decode)?;
    Ok(Arc::new(concrete))
}
