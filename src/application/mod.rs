// Cache-aware price fetching
pub mod fetcher;

// Invocation orchestrator
pub mod system;
