//! Resume editing & synchronization engine.
//!
//! A [`document::DocumentStore`] holds the single in-memory resume shared by every
//! section controller. Controllers buffer their own slice, merge it back into the
//! store on every edit, and persist it through a [`gateway::ResumeGateway`] only when
//! asked. A [`navigation::NavigationGate`] per wizard step keeps the host from moving
//! on while a save is outstanding.

pub mod config;
pub mod dashboard;
pub mod document;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod navigation;
pub mod rich_text;
pub mod sections;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
