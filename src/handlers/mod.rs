// Handler tiers:
// Public (no session required) → Protected (authenticated session required)
pub mod protected;
pub mod public;
