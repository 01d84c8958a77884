//! Lightstack Core
//!
//! Core types shared by the Lightstack orchestrator and its client.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, StackSpec, StackSummary)
//! - DTOs: Request and response bodies of the HTTP API

pub mod domain;
pub mod dto;
