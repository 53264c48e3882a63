//! GitHub side of the relay: the inbound `issues` payload, its signature, and
//! the decision whether it is worth a forum thread.

pub mod event;
pub mod signature;

pub use event::{
    classify, Classification, EnvelopeRepository, EventEnvelope, Issue, IssueEvent, Label,
    Repository, User, OPENED_ACTION,
};
pub use signature::{sign_payload, verify_github_signature, SIGNATURE_HEADER};
