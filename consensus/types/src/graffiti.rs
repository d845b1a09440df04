use crate::Hash256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const GRAFFITI_BYTES_LEN: usize = 32;

/// The 32-byte `graffiti` field on a beacon block.
#[derive(Default, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Graffiti(pub [u8; GRAFFITI_BYTES_LEN]);

impl Graffiti {
    pub fn as_utf8_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0)
            .trim_end_matches('\0')
            .to_string()
    }
}

impl From<[u8; GRAFFITI_BYTES_LEN]> for Graffiti {
    fn from(bytes: [u8; GRAFFITI_BYTES_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Graffiti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_utils::hex::encode(self.0))
    }
}

impl Serialize for Graffiti {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&serde_utils::hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Graffiti {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        let bytes = serde_utils::hex::decode(&string).map_err(serde::de::Error::custom)?;
        if bytes.len() != GRAFFITI_BYTES_LEN {
            return Err(serde::de::Error::custom(format!(
                "incorrect graffiti length {}",
                bytes.len()
            )));
        }
        let mut array = [0; GRAFFITI_BYTES_LEN];
        array.copy_from_slice(&bytes);
        Ok(Self(array))
    }
}

impl ssz::Encode for Graffiti {
    fn is_ssz_fixed_len() -> bool {
        <[u8; GRAFFITI_BYTES_LEN] as ssz::Encode>::is_ssz_fixed_len()
    }

    fn ssz_fixed_len() -> usize {
        <[u8; GRAFFITI_BYTES_LEN] as ssz::Encode>::ssz_fixed_len()
    }

    fn ssz_bytes_len(&self) -> usize {
        self.0.ssz_bytes_len()
    }

    fn ssz_append(&self, buf: &mut Vec<u8>) {
        self.0.ssz_append(buf)
    }
}

impl ssz::Decode for Graffiti {
    fn is_ssz_fixed_len() -> bool {
        <[u8; GRAFFITI_BYTES_LEN] as ssz::Decode>::is_ssz_fixed_len()
    }

    fn ssz_fixed_len() -> usize {
        <[u8; GRAFFITI_BYTES_LEN] as ssz::Decode>::ssz_fixed_len()
    }

    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, ssz::DecodeError> {
        <[u8; GRAFFITI_BYTES_LEN]>::from_ssz_bytes(bytes).map(Self)
    }
}

impl tree_hash::TreeHash for Graffiti {
    fn tree_hash_type() -> tree_hash::TreeHashType {
        <[u8; GRAFFITI_BYTES_LEN] as tree_hash::TreeHash>::tree_hash_type()
    }

    fn tree_hash_packed_encoding(&self) -> tree_hash::PackedEncoding {
        self.0.tree_hash_packed_encoding()
    }

    fn tree_hash_packing_factor() -> usize {
        <[u8; GRAFFITI_BYTES_LEN] as tree_hash::TreeHash>::tree_hash_packing_factor()
    }

    fn tree_hash_root(&self) -> Hash256 {
        self.0.tree_hash_root()
    }
}

/// A UTF-8 string (at most 32 bytes) that converts to `Graffiti` with zero
/// padding, used for operator-supplied configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraffitiString(String);

impl FromStr for GraffitiString {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > GRAFFITI_BYTES_LEN {
            return Err(format!(
                "graffiti exceeds max length {}",
                GRAFFITI_BYTES_LEN
            ));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<GraffitiString> for Graffiti {
    fn from(from: GraffitiString) -> Self {
        let mut bytes = [0; GRAFFITI_BYTES_LEN];
        let graffiti_bytes = from.0.as_bytes();
        let len = graffiti_bytes.len().min(GRAFFITI_BYTES_LEN);
        bytes[..len].copy_from_slice(&graffiti_bytes[..len]);
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graffiti_string_round_trip() {
        let graffiti: Graffiti = GraffitiString::from_str("despicable canary").unwrap().into();
        assert_eq!(graffiti.as_utf8_lossy(), "despicable canary");
    }

    #[test]
    fn oversized_graffiti_string_is_rejected() {
        assert!(GraffitiString::from_str(&"x".repeat(33)).is_err());
    }
}
