//! Entity key encoding.

use std::fmt;

/// Size of an encoded key in bytes.
pub const KEY_SIZE: usize = 8;

/// Key of a stored entity.
///
/// Key format: `[entity_id (8 bytes, big-endian)]`
///
/// Big-endian encoding keeps sled's lexicographic order equal to id order, so
/// a full tree scan returns entities in insertion order. The search core must
/// not rely on that.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey(pub u64);

impl EntityKey {
    /// Encode the key to bytes.
    pub fn encode(&self) -> [u8; KEY_SIZE] {
        self.0.to_be_bytes()
    }

    /// Decode a key from bytes.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().ok()?;
        Some(Self(u64::from_be_bytes(bytes)))
    }

    /// The entity id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKey({:#018x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic_ordering() {
        let enc1 = EntityKey(1).encode();
        let enc2 = EntityKey(256).encode();
        let enc3 = EntityKey(u64::MAX).encode();

        // Lexicographic ordering should match numeric ordering
        assert!(enc1 < enc2);
        assert!(enc2 < enc3);
    }

    #[test]
    fn test_decode() {
        assert_eq!(EntityKey::decode(&EntityKey(42).encode()), Some(EntityKey(42)));
        assert!(EntityKey::decode(&[0u8; 4]).is_none());
        assert!(EntityKey::decode(&[0u8; 12]).is_none());
    }
}
