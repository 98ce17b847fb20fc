//! Gestia - AI Business Assistant Orchestration
//!
//! This crate implements the client-side protocol and state machine between
//! a human operator and a remote AI assistant that proposes business actions
//! (invoices, clients, suppliers, purchase orders, products) and data
//! visualizations.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
