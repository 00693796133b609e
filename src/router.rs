use crate::error::InsertError;
use crate::tag::{self, Tag};
use crate::tree::Tree;

use http::Method;

/// A declared route, or a group of routes sharing a pattern prefix.
pub struct Route<H> {
    name: Option<String>,
    method: Option<Method>,
    pattern: String,
    handlers: Vec<H>,
    below: Option<Router<H>>,
}

impl<H> Route<H> {
    /// Names the route so it can be looked up with [`Tree::route`] and
    /// rendered with [`Tree::path_for`]. Names must be unique per tree.
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }
}

/// Route declarations, folded into a [`Tree`] by [`Router::build`].
///
/// Patterns are literal text mixed with placeholders:
///
/// ```ignore
///  Syntax          Matches
///  <name>          a single path segment, up to the next '/'
///  <name:bool>     true | false                (also :b, :boolean)
///  <name:int>      0 | -?[1-9][0-9]*           (also :i, :integer)
///  <name:num>      canonical decimals          (also :n, :number)
///  <name:str>      the entire rest of the path (also :s, :string)
///  <name^regex>    the regex, anchored where the placeholder starts
/// ```
///
/// When several placeholders could continue a path, literal text is tried
/// first, then placeholders from the narrowest kind (bool) to the loosest
/// (str), backtracking whenever the rest of the path does not fit.
///
/// ```rust
/// use http::Method;
/// use tagroute::Router;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut router = Router::new();
/// router.get("/item/<id:int>", ["item by id"]);
/// router.get("/item/<slug>", ["item by slug"]);
/// router.group("/admin", |admin| {
///     admin.post("/users/<name>", ["create user"]).name("create-user");
/// }, ["auth"]);
///
/// let tree = router.build()?;
///
/// let matched = tree.at(&Method::GET, "/item/42")?;
/// assert_eq!(matched.handlers(), ["item by id"]);
///
/// let matched = tree.at(&Method::GET, "/item/forty-two")?;
/// assert_eq!(matched.params.get("slug"), Some("forty-two"));
///
/// let matched = tree.at(&Method::POST, "/admin/users/ada")?;
/// assert_eq!(matched.handlers(), ["auth", "create user"]);
/// # Ok(())
/// # }
/// ```
pub struct Router<H> {
    routes: Vec<Route<H>>,
    handlers: Vec<H>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Router {
            routes: Vec::new(),
            handlers: Vec::new(),
        }
    }
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds handlers that wrap every route of this router. On the root router
    /// they become [`Tree::middleware`] and also run for unrouted requests.
    pub fn middleware(&mut self, handlers: impl IntoIterator<Item = H>) -> &mut Self {
        self.handlers.extend(handlers);
        self
    }

    /// Declares a group of routes below `pattern`. Routes declared by `f`
    /// inherit the prefix and run `handlers` before their own.
    pub fn group<F>(&mut self, pattern: &str, f: F, handlers: impl IntoIterator<Item = H>) -> &mut Self
    where
        F: FnOnce(&mut Router<H>),
    {
        let mut below = Router::new();
        f(&mut below);

        self.routes.push(Route {
            name: None,
            method: None,
            pattern: pattern.to_owned(),
            handlers: handlers.into_iter().collect(),
            below: Some(below),
        });
        self
    }

    /// Registers a route for `method`.
    pub fn handle(
        &mut self,
        method: Method,
        pattern: &str,
        handlers: impl IntoIterator<Item = H>,
    ) -> &mut Route<H> {
        self.push(Some(method), pattern, handlers)
    }

    /// Registers a route that accepts any method. It is only consulted when
    /// the request's own method has no matching route.
    pub fn any(&mut self, pattern: &str, handlers: impl IntoIterator<Item = H>) -> &mut Route<H> {
        self.push(None, pattern, handlers)
    }

    fn push(
        &mut self,
        method: Option<Method>,
        pattern: &str,
        handlers: impl IntoIterator<Item = H>,
    ) -> &mut Route<H> {
        self.routes.push(Route {
            name: None,
            method,
            pattern: pattern.to_owned(),
            handlers: handlers.into_iter().collect(),
            below: None,
        });

        let last = self.routes.len() - 1;
        &mut self.routes[last]
    }

    /// Register a handler for CONNECT requests
    pub fn connect(&mut self, pattern: &str, handlers: impl IntoIterator<Item = H>) -> &mut Route<H> {
        self.handle(Method::CONNECT, pattern, handlers)
    }

    /// Register a handler for DELETE requests
    pub fn delete(&mut self, pattern: &str, handlers: impl IntoIterator<Item = H>) -> &mut Route<H> {
        self.handle(Method::DELETE, pattern, handlers)
    }

    /// Register a handler for GET requests
    pub fn get(&mut self, pattern: &str, handlers: impl IntoIterator<Item = H>) -> &mut Route<H> {
        self.handle(Method::GET, pattern, handlers)
    }

    /// Register a handler for HEAD requests
    pub fn head(&mut self, pattern: &str, handlers: impl IntoIterator<Item = H>) -> &mut Route<H> {
        self.handle(Method::HEAD, pattern, handlers)
    }

    /// Register a handler for OPTIONS requests
    pub fn options(&mut self, pattern: &str, handlers: impl IntoIterator<Item = H>) -> &mut Route<H> {
        self.handle(Method::OPTIONS, pattern, handlers)
    }

    /// Register a handler for PATCH requests
    pub fn patch(&mut self, pattern: &str, handlers: impl IntoIterator<Item = H>) -> &mut Route<H> {
        self.handle(Method::PATCH, pattern, handlers)
    }

    /// Register a handler for POST requests
    pub fn post(&mut self, pattern: &str, handlers: impl IntoIterator<Item = H>) -> &mut Route<H> {
        self.handle(Method::POST, pattern, handlers)
    }

    /// Register a handler for PUT requests
    pub fn put(&mut self, pattern: &str, handlers: impl IntoIterator<Item = H>) -> &mut Route<H> {
        self.handle(Method::PUT, pattern, handlers)
    }

    /// Register a handler for TRACE requests
    pub fn trace(&mut self, pattern: &str, handlers: impl IntoIterator<Item = H>) -> &mut Route<H> {
        self.handle(Method::TRACE, pattern, handlers)
    }
}

impl<H: Clone> Router<H> {
    /// Folds every declared route into an immutable [`Tree`].
    ///
    /// Fails on the first malformed pattern, duplicate route, duplicate name
    /// or placeholder slot reused under another name.
    pub fn build(self) -> Result<Tree<H>, InsertError> {
        let Router { routes, handlers } = self;
        let mut tree = Tree::new(handlers);

        merge(&mut tree, routes, &mut Vec::new(), &mut Vec::new())?;
        tree.seal();

        info!(
            "built route tree: {} routes, at most {} params",
            tree.routes().count(),
            tree.max_params()
        );
        Ok(tree)
    }
}

// Walks the group nesting depth first. Pattern tags and handlers accumulate on
// the way down and are truncated on the way back up.
fn merge<H: Clone>(
    tree: &mut Tree<H>,
    routes: Vec<Route<H>>,
    tags: &mut Vec<Tag>,
    chain: &mut Vec<H>,
) -> Result<(), InsertError> {
    for route in routes {
        let (tag_mark, chain_mark) = (tags.len(), chain.len());

        tags.extend(tag::parse(&route.pattern)?);
        chain.extend(route.handlers);

        match route.below {
            Some(group) => {
                chain.extend(group.handlers);
                merge(tree, group.routes, tags, chain)?;
            }
            None => tree.insert(route.method, tags.clone(), chain.clone(), route.name)?,
        }

        tags.truncate(tag_mark);
        chain.truncate(chain_mark);
    }

    Ok(())
}
