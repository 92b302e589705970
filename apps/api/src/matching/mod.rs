// Skill-to-career matching engine.
// Catalog load → vocabulary + career vectors (built once) → per-request queries.
// Handlers and the chat router are thin adapters over `CareerMatcher`.

pub mod catalog;
pub mod chat;
pub mod engine;
pub mod handlers;
pub mod index;

pub use engine::CareerMatcher;
