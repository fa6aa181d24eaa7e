//! # Providers
//!
//! Clients for the external services `litlens` talks to. Today that is only the
//! multimodal model gateway under [`ai`].

pub mod ai;
