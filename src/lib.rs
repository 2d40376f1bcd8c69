//! Overtime Rate & Eligibility Calculation Engine
//!
//! This crate decides whether an employee may claim overtime for a date,
//! classifies the date, prices the hours with the effective rate formula,
//! and checks the claim against configured hour and amount limits. The
//! submission and approval workflow and an HTTP API are built on top.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod workflow;
