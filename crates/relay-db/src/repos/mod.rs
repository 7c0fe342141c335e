//! Repository implementations

mod agent;
mod auth_event;
mod ledger;
mod org;

pub use agent::AgentRepo;
pub use auth_event::AuthEventRepo;
pub use ledger::LedgerRepo;
pub use org::OrgRepo;
