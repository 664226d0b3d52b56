//! # Parley Common Library
//!
//! Request/answer coordination between a generation engine and its
//! front-ends (command line, chat bot, web form):
//! - Reply kinds and the values answers are made of
//! - Queries (open, single choice, multiple choice, boolean, information)
//! - Replies with sanitized answers, validity and engine-ready results
//! - A per-participant query store with recall, deduplication and ordering
//! - Configuration loading

pub mod config;
pub mod error;
pub mod identity;
pub mod locale;
pub mod query;
pub mod reply;
pub mod reply_kind;
pub mod store;
pub mod values;

pub use error::{Error, Result};
pub use identity::{Identity, Participants, Recipient};
pub use locale::Locale;
pub use query::{Query, QueryBuilder, QueryRef, QueryVariant};
pub use reply::Reply;
pub use reply_kind::ReplyKind;
pub use store::{Criterion, Filter, QueryStore, SortKey};
pub use values::{AspectRatio, Enumeration, InputMode, Instrument, RenderMode, Value};
