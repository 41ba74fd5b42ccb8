// src/backend/storage/oracles.rs
use crate::models::{
    common::{FlightKey, OracleId},
    oracle::{OracleRegistration, StatusRequest},
};
use crate::storage::memory::Memory;
use crate::storage::storable::Cbor;
use ic_stable_structures::StableBTreeMap;

pub struct OracleStore {
    registrations: StableBTreeMap<Cbor<OracleId>, Cbor<OracleRegistration>, Memory>,
    /// One request per flight; it stays after finalization.
    requests: StableBTreeMap<Cbor<FlightKey>, Cbor<StatusRequest>, Memory>,
}

impl OracleStore {
    pub fn init(registrations_memory: Memory, requests_memory: Memory) -> Self {
        Self {
            registrations: StableBTreeMap::init(registrations_memory),
            requests: StableBTreeMap::init(requests_memory),
        }
    }

    pub fn get_registration(&self, oracle: &OracleId) -> Option<OracleRegistration> {
        self.registrations.get(&Cbor(*oracle)).map(|cbor| cbor.0)
    }

    pub fn is_registered(&self, oracle: &OracleId) -> bool {
        self.registrations.contains_key(&Cbor(*oracle))
    }

    pub fn insert_registration(&mut self, registration: &OracleRegistration) {
        self.registrations
            .insert(Cbor(registration.oracle), Cbor(registration.clone()));
    }

    pub fn get_request(&self, flight: &FlightKey) -> Option<StatusRequest> {
        self.requests.get(&Cbor(flight.clone())).map(|cbor| cbor.0)
    }

    pub fn insert_request(&mut self, request: &StatusRequest) {
        self.requests
            .insert(Cbor(request.flight.clone()), Cbor(request.clone()));
    }

    pub fn open_requests(&self) -> Vec<StatusRequest> {
        self.requests
            .iter()
            .map(|(_key, request)| request.0)
            .filter(StatusRequest::is_open)
            .collect()
    }
}
