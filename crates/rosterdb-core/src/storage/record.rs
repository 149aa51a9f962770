//! Record encoding for stored entities.

use crate::entity::{Member, Team};
use crate::error::Error;
use rkyv::util::AlignedVec;

/// An entity that can be stored as an rkyv archive.
pub trait StoredRecord: Sized {
    /// Tree holding records of this type.
    const TREE: &'static str;

    /// Record identifier.
    fn id(&self) -> u64;

    /// Serialize the record to bytes.
    fn to_bytes(&self) -> Result<Vec<u8>, Error>;

    /// Deserialize a record from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>;
}

// sled hands values back without any alignment guarantee.
fn aligned(bytes: &[u8]) -> AlignedVec {
    let mut buf = AlignedVec::<16>::with_capacity(bytes.len());
    buf.extend_from_slice(bytes);
    buf
}

macro_rules! stored_record {
    ($ty:ty, $tree:literal) => {
        impl StoredRecord for $ty {
            const TREE: &'static str = $tree;

            fn id(&self) -> u64 {
                self.id
            }

            fn to_bytes(&self) -> Result<Vec<u8>, Error> {
                rkyv::to_bytes::<rkyv::rancor::Error>(self)
                    .map(|v| v.to_vec())
                    .map_err(|e| Error::Serialization(e.to_string()))
            }

            fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
                let buf = aligned(bytes);
                rkyv::from_bytes::<Self, rkyv::rancor::Error>(&buf)
                    .map_err(|e| Error::Deserialization(e.to_string()))
            }
        }
    };
}

stored_record!(Team, "team");
stored_record!(Member, "member");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_roundtrip() {
        let member = Member {
            id: 7,
            username: Some("member7".into()),
            age: 7,
            team_id: None,
        };
        let bytes = member.to_bytes().unwrap();
        assert_eq!(Member::from_bytes(&bytes).unwrap(), member);
    }

    #[test]
    fn test_unaligned_input() {
        let team = Team {
            id: 1,
            name: "teamA".into(),
        };
        let bytes = team.to_bytes().unwrap();

        // Shift by one byte to force misalignment.
        let mut shifted = vec![0u8];
        shifted.extend_from_slice(&bytes);
        assert_eq!(Team::from_bytes(&shifted[1..]).unwrap(), team);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            Member::from_bytes(&[1, 2, 3]),
            Err(Error::Deserialization(_))
        ));
    }
}
