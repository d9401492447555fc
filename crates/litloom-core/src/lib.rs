//! Litloom Core Types and Definitions
//!
//! This crate provides the foundational types shared by the litloom fragment
//! registry, the reference parser and the command-line driver:
//!
//! - **Identifiers**: String-interned names ([`identifier::Id`])
//! - **Locations**: Where an authored declaration came from ([`location::SourceLocation`])
//! - **Fragments**: Keys, relations and operations ([`fragment`] module)
//! - **Scopes**: Scope declarations ([`scope::ScopeDeclaration`])
//! - **Errors**: The diagnostic system ([`error`] module)

pub mod error;
pub mod fragment;
pub mod identifier;
pub mod location;
pub mod scope;
