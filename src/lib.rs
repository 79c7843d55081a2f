//! Questline - Sales Gamification Backend
//!
//! An append-only point ledger with scoring, leveling, ranking, and
//! mission rules on top, a JSON HTTP API, an outbound WhatsApp gateway
//! client, and an LLM-backed coaching assistant.

pub mod api;
pub mod clients;
pub mod config;
pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod services;
pub mod storage;
pub mod utils;
