//! API models for request and response payloads

pub mod issue;

pub use issue::{
    CreateIssueRequest, Issue, IssueFilter, IssueQuery, IssueValidationError, NewIssue,
};
