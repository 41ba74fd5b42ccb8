// src/backend/storage/flights.rs
use crate::models::{
    common::{AirlineId, FlightKey},
    flight::Flight,
};
use crate::storage::memory::Memory;
use crate::storage::storable::Cbor;
use ic_stable_structures::StableBTreeMap;

pub struct FlightStore {
    /// Key = (airline, code, timestamp), Value = Flight
    flights: StableBTreeMap<Cbor<FlightKey>, Cbor<Flight>, Memory>,
}

impl FlightStore {
    pub fn init(memory: Memory) -> Self {
        Self {
            flights: StableBTreeMap::init(memory),
        }
    }

    pub fn get(&self, key: &FlightKey) -> Option<Flight> {
        self.flights.get(&Cbor(key.clone())).map(|cbor| cbor.0)
    }

    pub fn contains(&self, key: &FlightKey) -> bool {
        self.flights.contains_key(&Cbor(key.clone()))
    }

    pub fn insert(&mut self, flight: &Flight) -> Option<Flight> {
        self.flights
            .insert(Cbor(flight.key.clone()), Cbor(flight.clone()))
            .map(|prev| prev.0)
    }

    pub fn len(&self) -> u64 {
        self.flights.len()
    }

    /// Flights of one airline. Scans the table; fine for catalog sizes.
    pub fn by_airline(&self, airline: &AirlineId) -> Vec<Flight> {
        self.flights
            .iter()
            .map(|(_key, flight)| flight.0)
            .filter(|flight| flight.key.airline == *airline)
            .collect()
    }
}
