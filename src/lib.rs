//! # perfbot
//!
//! A retrieval chat assistant for the employee performance tracker.
//!
//! A [`session::ChatSession`] loads a snapshot of the tracker's employees and
//! departments, then answers each question by finding the records whose
//! name, department, or position appear in it and describing them, with the
//! latest performance review for every matched employee.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  load   ┌──────────┐  retrieve  ┌───────────┐
//! │ Tracker API  │────────▶│  Corpus  │───────────▶│  Matches  │
//! │ (REST/JSON)  │         └──────────┘            └─────┬─────┘
//! └──────┬───────┘                                       │ respond
//!        │       latest review per employee              ▼
//!        └──────────────────────────────────────▶  ┌───────────┐
//!                                                  │   Reply   │
//!                                                  └───────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Records, corpus, transcript messages |
//! | [`client`] | Backend API trait and HTTP implementation |
//! | [`corpus`] | Concurrent corpus loading |
//! | [`retrieve`] | Substring matching |
//! | [`respond`] | Reply synthesis and enrichment |
//! | [`session`] | Chat session state machine |
//! | [`server`] | HTTP chat server |
//! | [`error`] | Error taxonomy |

pub mod client;
pub mod config;
pub mod corpus;
pub mod error;
pub mod models;
pub mod respond;
pub mod retrieve;
pub mod server;
pub mod session;

#[cfg(test)]
mod testing;
