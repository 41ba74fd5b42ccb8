// src/backend/storage/memory.rs
use ic_stable_structures::memory_manager::{MemoryId, MemoryManager, VirtualMemory};
use ic_stable_structures::DefaultMemoryImpl;

// Memory IDs for stable structures. Never reuse or reorder: upgrades
// reattach tables by these IDs.
const GUARD_CONFIG_MEM_ID: MemoryId = MemoryId::new(0);
const AIRLINES_MEM_ID: MemoryId = MemoryId::new(1);
const AIRLINE_COUNT_MEM_ID: MemoryId = MemoryId::new(2);
const FLIGHTS_MEM_ID: MemoryId = MemoryId::new(3);
const POLICIES_MEM_ID: MemoryId = MemoryId::new(4);
const COVERAGE_MEM_ID: MemoryId = MemoryId::new(5);
const CREDITS_MEM_ID: MemoryId = MemoryId::new(6);
const ORACLES_MEM_ID: MemoryId = MemoryId::new(7);
const STATUS_REQUESTS_MEM_ID: MemoryId = MemoryId::new(8);
const EVENT_LOG_INDEX_MEM_ID: MemoryId = MemoryId::new(9);
const EVENT_LOG_DATA_MEM_ID: MemoryId = MemoryId::new(10);
const METRICS_MEM_ID: MemoryId = MemoryId::new(11);
// Reserve IDs 12-19 for future use

pub type Memory = VirtualMemory<DefaultMemoryImpl>;

/// Hands out the virtual memories backing one `LedgerState`.
pub struct LedgerMemory {
    manager: MemoryManager<DefaultMemoryImpl>,
}

impl LedgerMemory {
    pub fn init(memory: DefaultMemoryImpl) -> Self {
        Self {
            manager: MemoryManager::init(memory),
        }
    }

    fn get(&self, id: MemoryId) -> Memory {
        self.manager.get(id)
    }

    pub fn guard_config(&self) -> Memory {
        self.get(GUARD_CONFIG_MEM_ID)
    }

    pub fn airlines(&self) -> Memory {
        self.get(AIRLINES_MEM_ID)
    }

    pub fn airline_count(&self) -> Memory {
        self.get(AIRLINE_COUNT_MEM_ID)
    }

    pub fn flights(&self) -> Memory {
        self.get(FLIGHTS_MEM_ID)
    }

    pub fn policies(&self) -> Memory {
        self.get(POLICIES_MEM_ID)
    }

    pub fn coverage(&self) -> Memory {
        self.get(COVERAGE_MEM_ID)
    }

    pub fn credits(&self) -> Memory {
        self.get(CREDITS_MEM_ID)
    }

    pub fn oracles(&self) -> Memory {
        self.get(ORACLES_MEM_ID)
    }

    pub fn status_requests(&self) -> Memory {
        self.get(STATUS_REQUESTS_MEM_ID)
    }

    pub fn event_log_index(&self) -> Memory {
        self.get(EVENT_LOG_INDEX_MEM_ID)
    }

    pub fn event_log_data(&self) -> Memory {
        self.get(EVENT_LOG_DATA_MEM_ID)
    }

    pub fn metrics(&self) -> Memory {
        self.get(METRICS_MEM_ID)
    }
}
