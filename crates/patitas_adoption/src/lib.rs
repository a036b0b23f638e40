// --- File: crates/patitas_adoption/src/lib.rs ---
// Declare modules within this crate
pub mod doc;
pub mod guard;
#[cfg(test)]
mod guard_test;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_test;
pub mod models;
pub mod routes;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;
// Re-export the workflow for the composition root
pub use logic::{AdoptionError, AdoptionWorkflow};
