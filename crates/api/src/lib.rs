//! HTTP API: routing and request/response mapping over the voucher services.

pub mod app;
