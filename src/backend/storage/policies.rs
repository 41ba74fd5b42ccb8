// src/backend/storage/policies.rs
use crate::models::{
    common::{E8s, FlightKey, PassengerId},
    policy::{FlightCoverage, InsurancePolicy},
};
use crate::storage::memory::Memory;
use crate::storage::storable::Cbor;
use ic_stable_structures::StableBTreeMap;

type PolicyKey = Cbor<(PassengerId, FlightKey)>;

/// Policies, per-flight coverage and passenger credit balances.
pub struct PolicyStore {
    policies: StableBTreeMap<PolicyKey, Cbor<InsurancePolicy>, Memory>,
    coverage: StableBTreeMap<Cbor<FlightKey>, Cbor<FlightCoverage>, Memory>,
    credits: StableBTreeMap<Cbor<PassengerId>, E8s, Memory>,
}

impl PolicyStore {
    pub fn init(policies_memory: Memory, coverage_memory: Memory, credits_memory: Memory) -> Self {
        Self {
            policies: StableBTreeMap::init(policies_memory),
            coverage: StableBTreeMap::init(coverage_memory),
            credits: StableBTreeMap::init(credits_memory),
        }
    }

    pub fn get_policy(&self, passenger: &PassengerId, flight: &FlightKey) -> Option<InsurancePolicy> {
        self.policies
            .get(&Cbor((*passenger, flight.clone())))
            .map(|cbor| cbor.0)
    }

    pub fn insert_policy(&mut self, policy: &InsurancePolicy) -> Option<InsurancePolicy> {
        self.policies
            .insert(Cbor((policy.passenger, policy.flight.clone())), Cbor(policy.clone()))
            .map(|prev| prev.0)
    }

    /// Coverage of a flight; empty if nobody insured it yet.
    pub fn coverage(&self, flight: &FlightKey) -> FlightCoverage {
        self.coverage
            .get(&Cbor(flight.clone()))
            .map(|cbor| cbor.0)
            .unwrap_or_default()
    }

    pub fn set_coverage(&mut self, flight: &FlightKey, coverage: FlightCoverage) {
        self.coverage.insert(Cbor(flight.clone()), Cbor(coverage));
    }

    pub fn credit_balance(&self, passenger: &PassengerId) -> E8s {
        self.credits.get(&Cbor(*passenger)).unwrap_or(0)
    }

    /// Overwrites a balance. A zero balance removes the entry.
    pub fn set_credit_balance(&mut self, passenger: &PassengerId, balance: E8s) {
        if balance == 0 {
            self.credits.remove(&Cbor(*passenger));
        } else {
            self.credits.insert(Cbor(*passenger), balance);
        }
    }
}
