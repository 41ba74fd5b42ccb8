// src/backend/storage/events.rs
use crate::error::FlightSuretyError;
use crate::models::event::{EventRecord, LedgerEvent};
use crate::storage::memory::Memory;
use crate::storage::storable::Cbor;
use ic_stable_structures::StableLog;

pub const MAX_EVENTS_PER_PAGE: u64 = 100;

pub struct EventLog {
    /// Append-only log of ledger events.
    log: StableLog<Cbor<LedgerEvent>, Memory, Memory>,
}

impl EventLog {
    pub fn init(index_memory: Memory, data_memory: Memory) -> Result<Self, FlightSuretyError> {
        let log = StableLog::init(index_memory, data_memory).map_err(|e| {
            FlightSuretyError::StorageError(format!("Failed to initialize event log: {:?}", e))
        })?;
        Ok(Self { log })
    }

    /// Appends an event and returns its sequence number.
    pub fn append(&self, event: LedgerEvent) -> Result<u64, FlightSuretyError> {
        self.log
            .append(&Cbor(event))
            .map_err(|e| FlightSuretyError::StorageError(format!("Failed to append event: {:?}", e)))
    }

    pub fn len(&self) -> u64 {
        self.log.len()
    }

    /// Returns up to `limit` events starting at `offset`.
    pub fn page(&self, offset: u64, limit: u64) -> Vec<EventRecord> {
        let end = offset
            .saturating_add(limit.min(MAX_EVENTS_PER_PAGE))
            .min(self.log.len());
        (offset..end)
            .filter_map(|sequence| {
                self.log.get(sequence).map(|cbor| EventRecord {
                    sequence,
                    event: cbor.0,
                })
            })
            .collect()
    }
}
