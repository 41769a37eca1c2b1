//! Rule definition checks
//!
//! `invariants` finds every violation of a kind; `validation` stops at the
//! first one and reports it as an error.

pub mod invariants;
pub mod validation;
