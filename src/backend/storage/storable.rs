// src/backend/storage/storable.rs
use ic_stable_structures::{storable::Bound, Storable};
use serde::{de::DeserializeOwned, Serialize};
use std::borrow::Cow;

/// Wraps any serde type so it can live in stable structures, CBOR encoded.
/// Used for both values and composite keys; key order follows `T: Ord`.
#[derive(Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub struct Cbor<T>(pub T)
where
    T: Serialize + DeserializeOwned;

impl<T> Storable for Cbor<T>
where
    T: Serialize + DeserializeOwned,
{
    fn to_bytes(&self) -> Cow<[u8]> {
        let mut writer = vec![];
        ciborium::ser::into_writer(&self.0, &mut writer)
            .expect("Failed to serialize value to CBOR for stable storage");
        Cow::Owned(writer)
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        let value: T = ciborium::de::from_reader(bytes.as_ref())
            .expect("Failed to deserialize value from CBOR from stable storage");
        Cbor(value)
    }

    const BOUND: Bound = Bound::Unbounded;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::FlightKey;
    use candid::Principal;

    #[test]
    fn flight_key_survives_storage_encoding() {
        let key = FlightKey::new(Principal::from_slice(&[7; 29]), "ND1309", 1_700_000_000);
        let wrapped = Cbor(key.clone());
        let bytes = wrapped.to_bytes();
        assert_eq!(Cbor::<FlightKey>::from_bytes(bytes).0, key);
    }
}
