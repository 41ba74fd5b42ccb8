use crate::error::FlightSuretyError;
use crate::metrics::LedgerMetrics;
use crate::storage::memory::Memory;
use crate::storage::storable::Cbor;
use ic_stable_structures::StableCell;

pub struct MetricsStore {
    cell: StableCell<Cbor<LedgerMetrics>, Memory>,
}

impl MetricsStore {
    pub fn init(memory: Memory) -> Result<Self, FlightSuretyError> {
        let cell = StableCell::init(memory, Cbor(LedgerMetrics::default())).map_err(|e| {
            FlightSuretyError::StorageError(format!("Failed to initialize metrics cell: {:?}", e))
        })?;
        Ok(Self { cell })
    }

    pub fn get(&self) -> LedgerMetrics {
        self.cell.get().0.clone()
    }

    pub fn update<F>(&mut self, update_fn: F) -> Result<(), FlightSuretyError>
    where
        F: FnOnce(&mut LedgerMetrics),
    {
        let mut metrics = self.get();
        update_fn(&mut metrics);
        self.cell
            .set(Cbor(metrics))
            .map(|_old| ())
            .map_err(|e| FlightSuretyError::StorageError(format!("Failed to update metrics: {:?}", e)))
    }
}
