/// Implements `ssz::Encode` and `ssz::Decode` for a type with a fixed-length
/// `serialize`/`deserialize` byte representation.
macro_rules! impl_ssz {
    ($type:ty, $byte_len:expr) => {
        impl ssz::Encode for $type {
            fn is_ssz_fixed_len() -> bool {
                true
            }

            fn ssz_fixed_len() -> usize {
                $byte_len
            }

            fn ssz_bytes_len(&self) -> usize {
                $byte_len
            }

            fn ssz_append(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.serialize())
            }
        }

        impl ssz::Decode for $type {
            fn is_ssz_fixed_len() -> bool {
                true
            }

            fn ssz_fixed_len() -> usize {
                $byte_len
            }

            fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, ssz::DecodeError> {
                Self::deserialize(bytes)
                    .map_err(|e| ssz::DecodeError::BytesInvalid(format!("{:?}", e)))
            }
        }
    };
}

/// Implements `tree_hash::TreeHash` by hashing the serialized bytes as an
/// SSZ byte vector.
macro_rules! impl_tree_hash {
    ($type:ty, $byte_len:expr) => {
        impl tree_hash::TreeHash for $type {
            fn tree_hash_type() -> tree_hash::TreeHashType {
                tree_hash::TreeHashType::Vector
            }

            fn tree_hash_packed_encoding(&self) -> tree_hash::PackedEncoding {
                unreachable!("Vector should never be packed.")
            }

            fn tree_hash_packing_factor() -> usize {
                unreachable!("Vector should never be packed.")
            }

            fn tree_hash_root(&self) -> tree_hash::Hash256 {
                let values_per_chunk = tree_hash::BYTES_PER_CHUNK;
                let minimum_chunk_count = ($byte_len + values_per_chunk - 1) / values_per_chunk;
                tree_hash::merkle_root(&self.serialize(), minimum_chunk_count)
            }
        }
    };
}

/// Implements `serde` (de)serialization as a 0x-prefixed hex string.
macro_rules! impl_serde_hex {
    ($type:ty) => {
        impl serde::Serialize for $type {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&serde_utils::hex::encode(self.serialize()))
            }
        }

        impl<'de> serde::Deserialize<'de> for $type {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let string = <String as serde::Deserialize>::deserialize(deserializer)?;
                let bytes =
                    serde_utils::hex::decode(&string).map_err(serde::de::Error::custom)?;
                Self::deserialize(&bytes)
                    .map_err(|e| serde::de::Error::custom(format!("{:?}", e)))
            }
        }
    };
}

/// Implements `Debug` and `Display` as the 0x-prefixed hex string of the
/// compressed point.
macro_rules! impl_hex_debug_display {
    ($type:ty) => {
        impl std::fmt::Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", serde_utils::hex::encode(self.serialize()))
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", serde_utils::hex::encode(self.serialize()))
            }
        }
    };
}
