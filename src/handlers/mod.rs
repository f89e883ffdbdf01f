// handlers/mod.rs - two handler tiers
//
// Public (no auth) → Protected (JWT auth, mounted under /api/v1)

pub mod protected;
pub mod public;
pub mod upload;
