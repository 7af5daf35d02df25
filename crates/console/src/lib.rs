//! Interactive command-line front end for the voucher services.

pub mod args;
pub mod console;
