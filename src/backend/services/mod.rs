pub mod access_guard;
pub mod airline_service;
pub mod flight_service;
pub mod insurance_service;
pub mod oracle_service;

#[cfg(test)]
pub(crate) mod test_support;
