pub mod guards;
pub mod log;
pub mod rng;
