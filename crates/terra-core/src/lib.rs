//! Metrics store, decay ticker, and command pipeline for the Terra simulation.
//!
//! This crate owns the engine: bounded planetary metrics mutated either by a
//! periodic passive decay or by free-text commands interpreted by an
//! external analysis service. The two mutation sources share one lock and
//! never interleave.
//!
//! # Modules
//!
//! - [`analysis`] -- [`AnalysisService`] trait, response validation, and
//!   [`StubAnalysisService`].
//! - [`catalog`] -- Example commands and the analysis model catalog.
//! - [`config`] -- Configuration loading from `terra-config.yaml` into
//!   strongly-typed structs.
//! - [`decay`] -- The passive decay ticker.
//! - [`event`] -- Holder for the latest special-event label.
//! - [`history`] -- Bounded, newest-first command history.
//! - [`processor`] -- The one-at-a-time command pipeline.
//! - [`simulation`] -- [`Simulation`] facade tying everything together.
//! - [`store`] -- Clamped metrics storage.
//! - [`thinking`] -- Cosmetic step labels shown before each analysis.
//! - [`world`] -- Shared state behind one lock plus the snapshot feed.
//!
//! [`AnalysisService`]: analysis::AnalysisService
//! [`StubAnalysisService`]: analysis::StubAnalysisService
//! [`Simulation`]: simulation::Simulation

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod decay;
pub mod event;
pub mod history;
pub mod processor;
pub mod simulation;
pub mod store;
pub mod thinking;
pub mod world;
