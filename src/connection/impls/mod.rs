#[cfg(feature = "ipmitool")]
pub mod ipmitool;
