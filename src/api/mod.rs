// =============================================================================
// API Module — HTTP surface for the dashboard
// =============================================================================

pub mod rest;
