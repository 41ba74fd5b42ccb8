// src/backend/storage/airlines.rs
use crate::error::FlightSuretyError;
use crate::models::{airline::Airline, common::AirlineId};
use crate::storage::memory::Memory;
use crate::storage::storable::Cbor;
use ic_stable_structures::{StableBTreeMap, StableCell};

type StorableAirline = Cbor<Airline>;

pub struct AirlineStore {
    /// Key = airline principal, Value = Airline
    airlines: StableBTreeMap<Cbor<AirlineId>, StorableAirline, Memory>,
    /// Number of airlines in Registered or Funded state.
    admitted_count: StableCell<u64, Memory>,
}

impl AirlineStore {
    pub fn init(airlines_memory: Memory, count_memory: Memory) -> Result<Self, FlightSuretyError> {
        let admitted_count = StableCell::init(count_memory, 0).map_err(|e| {
            FlightSuretyError::StorageError(format!("Failed to initialize airline counter: {:?}", e))
        })?;
        Ok(Self {
            airlines: StableBTreeMap::init(airlines_memory),
            admitted_count,
        })
    }

    pub fn get(&self, airline_id: &AirlineId) -> Option<Airline> {
        self.airlines.get(&Cbor(*airline_id)).map(|cbor| cbor.0)
    }

    /// Inserts or updates an airline, returning the previous record if any.
    pub fn insert(&mut self, airline: &Airline) -> Option<Airline> {
        self.airlines
            .insert(Cbor(airline.airline_id), Cbor(airline.clone()))
            .map(|prev| prev.0)
    }

    pub fn admitted_count(&self) -> u64 {
        *self.admitted_count.get()
    }

    pub fn increment_admitted(&mut self) -> Result<u64, FlightSuretyError> {
        let next = self
            .admitted_count()
            .checked_add(1)
            .ok_or_else(|| FlightSuretyError::StorageError("Airline counter overflow".to_string()))?;
        self.admitted_count
            .set(next)
            .map_err(|e| FlightSuretyError::StorageError(format!("Failed to update airline counter: {:?}", e)))?;
        Ok(next)
    }

    pub fn list(&self) -> Vec<Airline> {
        self.airlines.iter().map(|(_key, airline)| airline.0).collect()
    }
}
