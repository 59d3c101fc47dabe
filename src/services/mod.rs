// src/services/mod.rs

pub mod analytics;
pub mod grader;
pub mod ledger;
pub mod link_issuer;
pub mod policy;
pub mod quizzes;
pub mod session;
