//! Intake Gate - Paid form intake service
//!
//! Accepts form submissions, grants each email one free submission, and
//! gates the rest behind a one-off hosted checkout. Payments arrive through
//! signed webhooks and are recorded in an append-only ledger that also
//! drives account linking on the client side.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
