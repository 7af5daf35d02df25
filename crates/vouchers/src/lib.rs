//! Vouchers domain module.
//!
//! This crate contains the voucher entity and its two discount variants,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod file_form;
pub mod voucher;

pub use voucher::{Voucher, VoucherType};
