// src/backend/utils/log.rs
// Canister logging. On the wasm target lines go to the replica debug log via
// ic_cdk; native builds (tests) write to stderr.

#[doc(hidden)]
pub fn emit(level: &str, message: String) {
    #[cfg(target_family = "wasm")]
    ic_cdk::println!("{}: {}", level, message);
    #[cfg(not(target_family = "wasm"))]
    eprintln!("{}: {}", level, message);
}

macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::utils::log::emit("INFO", format!($($arg)*))
    };
}

macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::utils::log::emit("WARN", format!($($arg)*))
    };
}

macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::utils::log::emit("ERROR", format!($($arg)*))
    };
}

pub(crate) use log_error;
pub(crate) use log_info;
pub(crate) use log_warn;
