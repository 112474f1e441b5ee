//! jlcheck-core: syntax validation for a small Julia-flavoured scripting
//! subset.
//!
//! Text flows through the [`lexer`] into the [`grammar`] engine, which pulls
//! tokens as it needs them and decides whether the fragment is exactly one
//! well-formed statement. Nothing is evaluated and no syntax tree is kept.
//!
//! # Public API
//!
//! - [`validate()`] -- validate one fragment, returning a [`Verdict`]
//! - [`group()`] -- show how an operator chain nests
//! - [`tokenize()`] -- materialize the token stream of a fragment
//! - [`Diagnostic`] -- lexical and syntax diagnostics
//! - [`StatementKind`], [`LoopKind`], [`ConditionKind`] -- accepted statement
//!   categories

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod precedence;
pub mod validate;

// ── Convenience re-exports ───────────────────────────────────────────

pub use error::Diagnostic;
pub use grammar::{ConditionKind, LoopKind, StatementKind};
pub use lexer::{tokenize, Spanned, Token, Tokenized, RESERVED_WORDS};
pub use validate::{group, validate, GroupReport, Verdict};
