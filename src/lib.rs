//! A URL router built on a compressed trie of literal text and typed
//! placeholders.
//!
//! Routes are declared on a [`Router`], optionally nested in groups, and
//! folded into an immutable [`Tree`] with one trie per HTTP method. Lookups
//! backtrack: literal text is preferred over placeholders, and narrower
//! placeholders over looser ones, but a path always finds a route when any
//! route can consume it in full.
//!
//! ```rust
//! use http::Method;
//! use tagroute::{Context, Fallback, Router};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.get("/blog/<year:int>/<slug>", ["post"]);
//! router.get("/files/<path:str>", ["file"]);
//! let tree = router.build()?;
//!
//! let matched = tree.at(&Method::GET, "/blog/2024/hello")?;
//! assert_eq!(matched.params.get("year"), Some("2024"));
//! assert_eq!(matched.params.get("slug"), Some("hello"));
//!
//! let matched = tree.at(&Method::GET, "/files/a/b.txt")?;
//! assert_eq!(matched.params.get("path"), Some("a/b.txt"));
//!
//! let ctx = Context::new(&tree, &Method::GET, "/blog/2024/hello/");
//! assert!(matches!(ctx.fallback(), Some(Fallback::Redirect { .. })));
//! # Ok(())
//! # }
//! ```
#![deny(clippy::all)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

mod boundary;
mod context;
mod error;
mod params;
mod path;
mod router;
mod tag;
mod tree;

pub use context::{Context, Fallback};
pub use error::{InsertError, MatchError, PathError};
pub use params::{Params, ParamsIter};
pub use path::clean_path;
pub use router::{Route, Router};
pub use tag::{Kind, Tag};
pub use tree::{Endpoint, Match, Tree};
