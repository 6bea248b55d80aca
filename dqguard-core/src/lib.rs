// dqguard-core/src/lib.rs

// 1. Documentation
#![allow(missing_docs)] // On autorise le manque de doc pour le moment

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- MODULES HEXAGONAUX ---

// 1. Ports (Interfaces / Traits)
// Lecture des lots, génération de suggestions
pub mod ports;

// 2. Domain (Cœur du métier)
// Dataset typé, moteur de règles, outliers, drift, baseline.
// Ne dépend de RIEN d'autre (ni infra, ni app).
pub mod domain;

// 3. Infrastructure (Adapters)
// DuckDB, fichiers JSON (règles, baselines, rapports), configuration YAML
pub mod infrastructure;

// 4. Application (Use Cases)
// Transformation, rapport qualité, pipeline complet
pub mod application;

// --- GESTION DES ERREURS GLOBALE ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use dqguard_core::GuardError;
pub use error::GuardError;
