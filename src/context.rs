use crate::params::Params;
use crate::path::clean_path;
use crate::tree::{Endpoint, Match, Tree};

use http::{Method, StatusCode};

/// What to answer for a request that matched no route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// The same resource is routed under a fixed-up path.
    Redirect { location: String, status: StatusCode },
    /// Other methods are routed for the path. `allow` is the value of the
    /// `Allow` header.
    Allowed { allow: String, status: StatusCode },
    /// No route is registered for the method at all.
    NotImplemented,
    NotFound,
}

impl Fallback {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Redirect { status, .. } | Self::Allowed { status, .. } => *status,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// The routing state of one request.
///
/// Holds the match result, if any, and a cursor over the handler chain: the
/// tree's middleware first, then the matched route's handlers. The parameter
/// buffer goes back to the tree's pool when the context is dropped.
///
/// ```rust
/// use http::Method;
/// use tagroute::{Context, Router};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut router = Router::new();
/// router.middleware(["log"]);
/// router.get("/hello/<name>", ["hello"]);
/// let tree = router.build()?;
///
/// let mut ctx = Context::new(&tree, &Method::GET, "/hello/world");
/// assert!(ctx.routed());
/// assert_eq!(ctx.param("name"), Some("world"));
/// assert_eq!(ctx.next_handler(), Some(&"log"));
/// assert_eq!(ctx.next_handler(), Some(&"hello"));
/// assert_eq!(ctx.next_handler(), None);
/// # Ok(())
/// # }
/// ```
pub struct Context<'t, 'p, H> {
    tree: &'t Tree<H>,
    method: Method,
    path: &'p str,
    matched: Option<Match<'t, 'p, H>>,
    index: usize,
}

impl<'t, 'p, H> Context<'t, 'p, H> {
    pub fn new(tree: &'t Tree<H>, method: &Method, path: &'p str) -> Self {
        Context {
            tree,
            method: method.clone(),
            path,
            matched: tree.at(method, path).ok(),
            index: 0,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &'p str {
        self.path
    }

    /// Whether a route matched.
    pub fn routed(&self) -> bool {
        self.matched.is_some()
    }

    /// The matched route.
    pub fn route(&self) -> Option<&'t Endpoint<H>> {
        self.matched.as_ref().map(|m| m.route)
    }

    pub fn params(&self) -> Option<&Params<'t, 'p>> {
        self.matched.as_ref().map(|m| &m.params)
    }

    /// The value captured for the parameter `name`.
    pub fn param(&self, name: &str) -> Option<&'p str> {
        self.matched.as_ref().and_then(|m| m.params.get(name))
    }

    /// Advances to the next handler in the chain.
    pub fn next_handler(&mut self) -> Option<&'t H> {
        let middleware = self.tree.middleware();

        let handler = match middleware.get(self.index) {
            Some(handler) => Some(handler),
            None => self
                .matched
                .as_ref()
                .and_then(|m| m.handlers().get(self.index - middleware.len())),
        };

        if handler.is_some() {
            self.index += 1;
        }
        handler
    }

    /// Decides how to answer an unrouted request, following the tree's flags.
    /// Returns `None` when a route matched.
    pub fn fallback(&self) -> Option<Fallback> {
        if self.routed() {
            return None;
        }

        let tree = self.tree;
        let method = &self.method;

        if tree.handle_not_implemented && *method != Method::OPTIONS && !tree.has_method(method) {
            trace!("{} {}: method not implemented", method, self.path);
            return Some(Fallback::NotImplemented);
        }

        if *method != Method::CONNECT {
            if tree.redirect_trailing_slash {
                let toggled = match self.path.strip_suffix('/') {
                    Some(path) => path.to_owned(),
                    None => format!("{}/", self.path),
                };

                if !toggled.is_empty() && tree.at(method, &toggled).is_ok() {
                    return Some(self.redirect(toggled));
                }
            }

            if tree.redirect_cleaned_path {
                let cleaned = clean_path(self.path);
                if cleaned != self.path && tree.at(method, &cleaned).is_ok() {
                    return Some(self.redirect(cleaned));
                }
            }
        }

        if tree.handle_method_not_allowed {
            let allow: Vec<&str> = tree
                .allowed(self.path)
                .into_iter()
                .filter(|&allowed| allowed != method.as_str())
                .collect();

            if !allow.is_empty() {
                let status = if *method == Method::OPTIONS {
                    StatusCode::OK
                } else {
                    StatusCode::METHOD_NOT_ALLOWED
                };

                trace!("{} {}: allowed {:?}", method, self.path, allow);
                return Some(Fallback::Allowed {
                    allow: allow.join(", "),
                    status,
                });
            }
        }

        Some(Fallback::NotFound)
    }

    fn redirect(&self, location: String) -> Fallback {
        let status = match (self.method == Method::GET, self.tree.permanent_redirect) {
            (true, true) => StatusCode::MOVED_PERMANENTLY,
            (true, false) => StatusCode::FOUND,
            (false, true) => StatusCode::PERMANENT_REDIRECT,
            (false, false) => StatusCode::TEMPORARY_REDIRECT,
        };

        trace!("{} {}: redirect to {}", self.method, self.path, location);
        Fallback::Redirect { location, status }
    }
}
