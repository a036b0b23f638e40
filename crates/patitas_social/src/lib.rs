// --- File: crates/patitas_social/src/lib.rs ---
// Declare modules within this crate
pub mod doc;
pub mod handlers;
pub mod logic;
pub mod models;
pub mod routes;

// Re-export the routes function to be used by the main backend service
pub use routes::routes;
// Re-export the workflow for the composition root
pub use logic::{LikeWorkflow, SocialError};
