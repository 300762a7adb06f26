//! The capability surface every Key or Value type must expose.
//!
//! The engine is parametric over these capabilities and assumes no concrete
//! encoding. Serialization feeds the run writer's length-prefixed frames;
//! deserialization receives back exactly the bytes one `serialize` call
//! produced, plus the settings value supplied at sorter construction.

use crate::error::{Error, Result};

/// A Key or Value the sorting engine can buffer, spill, and read back.
pub trait Sortable: Sized {
    /// Extra state handed to every `deserialize` call for this type.
    /// Must be cheap to clone; use `()` if the decoder needs nothing.
    type Settings: Clone;

    /// Append this object's encoding to `buf`.
    fn serialize(&self, buf: &mut Vec<u8>);

    /// Decode one object from `bytes` (the exact slice a prior `serialize`
    /// produced). Malformed input is a `Deserialization` error.
    fn deserialize(bytes: &[u8], settings: &Self::Settings) -> Result<Self>;

    /// Approximate resident memory, including self size and any referenced
    /// heap memory. Drives the facade's budget accounting.
    fn mem_usage(&self) -> usize;

    /// For types with owned and unowned states (e.g. views into transient
    /// buffers), return an independent deep copy. The default is identity.
    fn into_owned(self) -> Self {
        self
    }
}

macro_rules! sortable_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sortable for $ty {
                type Settings = ();

                fn serialize(&self, buf: &mut Vec<u8>) {
                    buf.extend_from_slice(&self.to_le_bytes());
                }

                fn deserialize(bytes: &[u8], _settings: &()) -> Result<Self> {
                    let arr: [u8; std::mem::size_of::<$ty>()] =
                        bytes.try_into().map_err(|_| {
                            Error::corrupt(format!(
                                "expected {} bytes for {}, got {}",
                                std::mem::size_of::<$ty>(),
                                stringify!($ty),
                                bytes.len()
                            ))
                        })?;
                    Ok(<$ty>::from_le_bytes(arr))
                }

                fn mem_usage(&self) -> usize {
                    std::mem::size_of::<$ty>()
                }
            }
        )*
    };
}

sortable_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl Sortable for String {
    type Settings = ();

    fn serialize(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }

    fn deserialize(bytes: &[u8], _settings: &()) -> Result<Self> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::corrupt(format!("invalid utf-8 in string record: {e}")))
    }

    fn mem_usage(&self) -> usize {
        std::mem::size_of::<String>() + self.capacity()
    }
}

impl Sortable for Vec<u8> {
    type Settings = ();

    fn serialize(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self);
    }

    fn deserialize(bytes: &[u8], _settings: &()) -> Result<Self> {
        Ok(bytes.to_vec())
    }

    fn mem_usage(&self) -> usize {
        std::mem::size_of::<Vec<u8>>() + self.capacity()
    }
}

/// Zero-sized value for key-only sorts.
impl Sortable for () {
    type Settings = ();

    fn serialize(&self, _buf: &mut Vec<u8>) {}

    fn deserialize(bytes: &[u8], _settings: &()) -> Result<Self> {
        if !bytes.is_empty() {
            return Err(Error::corrupt(format!(
                "expected empty payload for unit value, got {} bytes",
                bytes.len()
            )));
        }
        Ok(())
    }

    fn mem_usage(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_round_trip() {
        let mut buf = Vec::new();
        42u64.serialize(&mut buf);
        assert_eq!(u64::deserialize(&buf, &()).unwrap(), 42);
    }

    #[test]
    fn short_int_payload_is_corrupt() {
        assert!(matches!(
            u64::deserialize(&[1, 2, 3], &()),
            Err(Error::Deserialization(_))
        ));
    }

    #[test]
    fn string_round_trip() {
        let mut buf = Vec::new();
        "héllo".to_string().serialize(&mut buf);
        assert_eq!(String::deserialize(&buf, &()).unwrap(), "héllo");
    }

    #[test]
    fn invalid_utf8_is_corrupt() {
        assert!(String::deserialize(&[0xff, 0xfe], &()).is_err());
    }
}
