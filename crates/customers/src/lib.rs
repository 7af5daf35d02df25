//! Customers domain module.
//!
//! This crate contains business rules for customers (voucher owners),
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod customer;

pub use customer::Customer;
