use crate::error::{InsertError, MatchError, PathError};
use crate::params::{Buffer, Params, Pool};
use crate::tag::{self, Tag};

use http::Method;

use std::collections::HashMap;
use std::{fmt, mem};

type NodeId = usize;
type StaticId = usize;

/// A registered route: the terminal position of a pattern in a method's tree.
pub struct Endpoint<H> {
    method: Option<Method>,
    name: Option<String>,
    tags: Vec<Tag>,
    params: Vec<String>,
    handlers: Vec<H>,
}

impl<H> Endpoint<H> {
    /// The method this route was registered for, `None` for any method.
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// The route name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The full pattern, including any group prefixes.
    pub fn pattern(&self) -> String {
        tag::render(&self.tags)
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Parameter names, in the order values are captured.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The handler chain: group handlers first, then the route's own.
    pub fn handlers(&self) -> &[H] {
        &self.handlers
    }

    fn is_routed(&self) -> bool {
        !self.handlers.is_empty()
    }
}

impl<H> fmt::Debug for Endpoint<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &method_name(self.method.as_ref()))
            .field("pattern", &self.pattern())
            .field("name", &self.name)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

// An edge of the literal trie. Children are keyed by the first byte of their
// prefix, at most one child per byte.
struct Static {
    prefix: Vec<u8>,
    indices: Vec<u8>,
    children: Vec<StaticId>,
    // the node reached once the whole edge is consumed
    below: Option<NodeId>,
    back: Option<StaticId>,
}

// A placeholder edge leading out of a node.
struct Variable {
    tag: Tag,
    node: NodeId,
}

// A position in the tree: some input has been consumed up to here.
struct Node<H> {
    statics: Option<StaticId>,
    // sorted by placeholder kind, the order they are probed in
    variables: Vec<Variable>,
    endpoint: Option<Endpoint<H>>,
}

impl<H> Node<H> {
    fn new() -> Self {
        Node {
            statics: None,
            variables: Vec::new(),
            endpoint: None,
        }
    }
}

/// A frame of the backtracking search.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Frame {
    node: NodeId,
    // offset into the path where this node starts
    pos: usize,
    step: Step,
    // whether reaching this node captured a parameter
    captured: bool,
}

#[derive(Clone, Copy, Debug)]
enum Step {
    Start,
    // try the node below `edge`, whose end is at `end`, then walk back up
    Static { edge: StaticId, end: usize },
    Variable(usize),
}

/// A successful match: the route and the parameters captured for it.
pub struct Match<'t, 'p, H> {
    pub route: &'t Endpoint<H>,
    pub params: Params<'t, 'p>,
}

impl<'t, H> Match<'t, '_, H> {
    pub fn handlers(&self) -> &'t [H] {
        &self.route.handlers
    }
}

impl<H> fmt::Debug for Match<'_, '_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("route", &self.route)
            .field("params", &self.params)
            .finish()
    }
}

/// An immutable route tree, one trie per HTTP method plus a bucket for routes
/// that accept any method.
///
/// Build one with [`Router::build`](crate::Router::build). Lookups take `&self`
/// and can run from any number of threads at once.
pub struct Tree<H> {
    /// Redirect to the same path with (without) a trailing slash when only
    /// that variant is routed. `GET` requests are redirected with 301 (302
    /// when not permanent), other methods with 308 (307).
    pub redirect_trailing_slash: bool,

    /// Redirect to the cleaned path, with superfluous `//`, `./` and `../`
    /// elements removed, when it is routed.
    pub redirect_cleaned_path: bool,

    /// Answer with `405 Method Not Allowed` and an `Allow` header when the
    /// path is routed for other methods. `OPTIONS` requests get `200 OK`.
    pub handle_method_not_allowed: bool,

    /// Answer with `501 Not Implemented` for methods with no routes at all.
    pub handle_not_implemented: bool,

    /// Whether redirects are permanent.
    pub permanent_redirect: bool,

    handlers: Vec<H>,
    methods: HashMap<Method, NodeId>,
    any: Option<NodeId>,
    names: HashMap<String, NodeId>,
    nodes: Vec<Node<H>>,
    statics: Vec<Static>,
    max_params: usize,
    pool: Pool,
}

impl<H> Tree<H> {
    pub(crate) fn new(handlers: Vec<H>) -> Self {
        Tree {
            redirect_trailing_slash: true,
            redirect_cleaned_path: true,
            handle_method_not_allowed: true,
            handle_not_implemented: true,
            permanent_redirect: true,
            handlers,
            methods: HashMap::new(),
            any: None,
            names: HashMap::new(),
            nodes: Vec::new(),
            statics: Vec::new(),
            max_params: 0,
            pool: Pool::new(0),
        }
    }

    fn push_node(&mut self) -> NodeId {
        self.nodes.push(Node::new());
        self.nodes.len() - 1
    }

    fn push_static(&mut self, prefix: Vec<u8>, back: Option<StaticId>) -> StaticId {
        self.statics.push(Static {
            prefix,
            indices: Vec::new(),
            children: Vec::new(),
            below: None,
            back,
        });
        self.statics.len() - 1
    }

    fn root(&mut self, method: Option<&Method>) -> NodeId {
        let existing = match method {
            Some(method) => self.methods.get(method).copied(),
            None => self.any,
        };

        if let Some(root) = existing {
            return root;
        }

        let root = self.push_node();
        match method {
            Some(method) => {
                self.methods.insert(method.clone(), root);
            }
            None => self.any = Some(root),
        }
        root
    }

    /// Registers a route. `tags` is the full pattern, group prefixes included.
    pub(crate) fn insert(
        &mut self,
        method: Option<Method>,
        tags: Vec<Tag>,
        handlers: Vec<H>,
        name: Option<String>,
    ) -> Result<(), InsertError> {
        let pattern = tag::render(&tags);

        let mut params: Vec<String> = Vec::new();
        for tag in tags.iter().filter(|tag| tag.is_variable()) {
            if params.iter().any(|p| p == tag.name()) {
                return Err(InsertError::DuplicateParam {
                    pattern,
                    name: tag.name().to_owned(),
                });
            }
            params.push(tag.name().to_owned());
        }

        let mut node = self.root(method.as_ref());
        let mut i = 0;
        while i < tags.len() {
            if tags[i].is_variable() {
                node = self.merge_variable(node, &tags[i], &pattern)?;
                i += 1;
                continue;
            }

            // consecutive literals, e.g. a group prefix followed by the
            // route's own, form a single static run
            let mut literal = String::new();
            while i < tags.len() && !tags[i].is_variable() {
                literal.push_str(tags[i].name());
                i += 1;
            }
            node = self.merge_static(node, literal.as_bytes());
        }

        // an endpoint without handlers is not a route and may be replaced
        if self.nodes[node].endpoint.as_ref().is_some_and(Endpoint::is_routed) {
            return Err(InsertError::Conflict {
                route: format!("{} {}", method_name(method.as_ref()), pattern),
            });
        }

        if let Some(old) = self.nodes[node].endpoint.take().and_then(|e| e.name) {
            self.names.remove(&old);
        }

        if let Some(name) = &name {
            if self.names.contains_key(name) {
                return Err(InsertError::DuplicateName { name: name.clone() });
            }
            self.names.insert(name.clone(), node);
        }

        debug!(
            "route {} {} ({} params, {} handlers)",
            method_name(method.as_ref()),
            pattern,
            params.len(),
            handlers.len()
        );

        self.max_params = self.max_params.max(params.len());
        self.nodes[node].endpoint = Some(Endpoint {
            method,
            name,
            tags,
            params,
            handlers,
        });

        Ok(())
    }

    // Called once every route is inserted: sizes the buffer pool.
    pub(crate) fn seal(&mut self) {
        self.pool = Pool::new(self.max_params);
    }

    fn merge_static(&mut self, node: NodeId, s: &[u8]) -> NodeId {
        if s.is_empty() {
            return node;
        }

        let edge = match self.nodes[node].statics {
            Some(root) => self.merge_edge(root, s),
            None => {
                let edge = self.push_static(s.to_vec(), None);
                self.nodes[node].statics = Some(edge);
                edge
            }
        };

        match self.statics[edge].below {
            Some(below) => below,
            None => {
                let below = self.push_node();
                self.statics[edge].below = Some(below);
                below
            }
        }
    }

    // Returns the edge that exactly spells `s` below `root`, splitting or
    // appending edges as needed.
    fn merge_edge(&mut self, root: StaticId, mut s: &[u8]) -> StaticId {
        let mut x = root;
        // the root edge has no index entry, so its prefix is compared directly
        let mut compare_root = !self.statics[x].prefix.is_empty();

        loop {
            let start = if compare_root {
                compare_root = false;
                0
            } else {
                let edge = &self.statics[x];
                match edge.indices.iter().position(|&b| b == s[0]) {
                    Some(i) => {
                        x = edge.children[i];
                        1
                    }
                    None => break,
                }
            };

            let (common, len) = {
                let prefix = &self.statics[x].prefix;
                let shared = prefix[start..]
                    .iter()
                    .zip(&s[start..])
                    .take_while(|(a, b)| a == b)
                    .count();
                (start + shared, prefix.len())
            };

            if common == len {
                if common == s.len() {
                    return x;
                }
                s = &s[common..];
                continue;
            }

            self.split(x, common);
            if common == s.len() {
                return x;
            }
            s = &s[common..];
            break;
        }

        let y = self.push_static(s.to_vec(), Some(x));
        let edge = &mut self.statics[x];
        edge.indices.push(s[0]);
        edge.children.push(y);
        y
    }

    // Splits edge `x` at `at`: `x` keeps the head of its prefix and the tail
    // moves to a new child edge, taking the continuation along.
    fn split(&mut self, x: StaticId, at: usize) {
        let edge = &mut self.statics[x];
        let tail = Static {
            prefix: edge.prefix.split_off(at),
            indices: mem::take(&mut edge.indices),
            children: mem::take(&mut edge.children),
            below: edge.below.take(),
            back: Some(x),
        };
        let first = tail.prefix[0];

        self.statics.push(tail);
        let y = self.statics.len() - 1;

        for i in 0..self.statics[y].children.len() {
            let child = self.statics[y].children[i];
            self.statics[child].back = Some(y);
        }

        let edge = &mut self.statics[x];
        edge.indices = vec![first];
        edge.children = vec![y];
    }

    fn merge_variable(
        &mut self,
        node: NodeId,
        tag: &Tag,
        pattern: &str,
    ) -> Result<NodeId, InsertError> {
        let variables = &self.nodes[node].variables;
        let mut at = variables.len();

        for (i, var) in variables.iter().enumerate() {
            if var.tag.same(tag) {
                if var.tag.name() != tag.name() {
                    return Err(InsertError::InconsistentName {
                        pattern: pattern.to_owned(),
                        expected: var.tag.name().to_owned(),
                        found: tag.name().to_owned(),
                    });
                }
                return Ok(var.node);
            }

            if tag.kind() < var.tag.kind() {
                at = i;
                break;
            }
        }

        let child = self.push_node();
        self.nodes[node].variables.insert(
            at,
            Variable {
                tag: tag.clone(),
                node: child,
            },
        );
        Ok(child)
    }

    /// Finds the route for `method` and `path`.
    ///
    /// Routes registered for any method are tried when `method` has no match.
    /// The returned parameters hold a pooled buffer until they are dropped.
    pub fn at<'t, 'p>(
        &'t self,
        method: &Method,
        path: &'p str,
    ) -> Result<Match<'t, 'p, H>, MatchError> {
        let mut buf = self.pool.acquire();

        let route = self
            .methods
            .get(method)
            .and_then(|&root| self.find(root, path, &mut buf))
            .or_else(|| self.any.and_then(|root| self.find(root, path, &mut buf)))
            .ok_or(MatchError::NotFound)?;

        Ok(Match {
            route,
            params: Params::new(path, &route.params, buf),
        })
    }

    // Depth-first search with explicit backtracking. Static continuations are
    // tried before placeholders, deepest literal first; placeholders in kind
    // order. On success `buf.slots` holds one slot per parameter.
    fn find(&self, root: NodeId, path: &str, buf: &mut Buffer) -> Option<&Endpoint<H>> {
        let bytes = path.as_bytes();
        buf.clear();

        let Buffer { slots, frames } = buf;
        frames.push(Frame {
            node: root,
            pos: 0,
            step: Step::Start,
            captured: false,
        });

        while let Some(&frame) = frames.last() {
            let top = frames.len() - 1;
            let node = &self.nodes[frame.node];

            match frame.step {
                Step::Start if frame.pos == bytes.len() => {
                    if let Some(endpoint) = node.endpoint.as_ref().filter(|e| e.is_routed()) {
                        return Some(endpoint);
                    }

                    // nothing consumes an empty suffix
                    frames.pop();
                    if frame.captured {
                        slots.pop();
                    }
                }
                Step::Start => {
                    frames[top].step = match node
                        .statics
                        .and_then(|edge| self.descend(edge, bytes, frame.pos))
                    {
                        Some((edge, end)) => Step::Static { edge, end },
                        None => Step::Variable(0),
                    };
                }
                Step::Static { edge, end } => {
                    let edge = &self.statics[edge];
                    frames[top].step = match edge.back {
                        Some(back) => Step::Static {
                            edge: back,
                            end: end - edge.prefix.len(),
                        },
                        None => Step::Variable(0),
                    };

                    if let Some(below) = edge.below {
                        frames.push(Frame {
                            node: below,
                            pos: end,
                            step: Step::Start,
                            captured: false,
                        });
                    }
                }
                Step::Variable(i) => {
                    let Some(var) = node.variables.get(i) else {
                        frames.pop();
                        if frame.captured {
                            slots.pop();
                        }
                        continue;
                    };

                    frames[top].step = Step::Variable(i + 1);

                    let n = path
                        .get(frame.pos..)
                        .map_or(0, |rest| var.tag.boundary(rest));
                    if n > 0 {
                        slots.push((frame.pos, frame.pos + n));
                        frames.push(Frame {
                            node: var.node,
                            pos: frame.pos + n,
                            step: Step::Start,
                            captured: true,
                        });
                    }
                }
            }
        }

        None
    }

    // Follows the literal trie from `root` as far as `path[pos..]` allows and
    // returns the deepest fully consumed edge with the offset after it.
    fn descend(&self, root: StaticId, path: &[u8], mut pos: usize) -> Option<(StaticId, usize)> {
        let mut edge = root;

        let prefix = &self.statics[edge].prefix;
        if !path[pos..].starts_with(prefix) {
            return None;
        }
        pos += prefix.len();

        while let Some(&b) = path.get(pos) {
            let current = &self.statics[edge];
            let Some(i) = current.indices.iter().position(|&c| c == b) else {
                break;
            };

            let child = current.children[i];
            let prefix = &self.statics[child].prefix;
            if !path[pos..].starts_with(prefix) {
                break;
            }

            edge = child;
            pos += prefix.len();
        }

        Some((edge, pos))
    }

    /// Returns the methods, sorted, whose routes match `path`. Routes
    /// registered for any method are not included.
    pub fn allowed(&self, path: &str) -> Vec<&str> {
        let mut buf = self.pool.acquire();

        let mut allowed: Vec<&str> = self
            .methods
            .iter()
            .filter(|&(_, &root)| self.find(root, path, &mut buf).is_some())
            .map(|(method, _)| method.as_str())
            .collect();

        allowed.sort_unstable();
        allowed
    }

    /// Whether any route is registered for `method` specifically.
    pub fn has_method(&self, method: &Method) -> bool {
        self.methods.contains_key(method)
    }

    /// Looks up a route by name.
    pub fn route(&self, name: &str) -> Option<&Endpoint<H>> {
        self.names
            .get(name)
            .and_then(|&node| self.nodes[node].endpoint.as_ref())
    }

    /// Renders the path of a named route, filling its placeholders from
    /// `values`. Each value must satisfy its placeholder's grammar in full.
    ///
    /// ```rust
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut router = tagroute::Router::new();
    /// router.get("/users/<id:int>", [()]).name("user");
    /// let tree = router.build()?;
    ///
    /// assert_eq!(tree.path_for("user", &[("id", "7")])?, "/users/7");
    /// assert!(tree.path_for("user", &[("id", "seven")]).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn path_for(&self, name: &str, values: &[(&str, &str)]) -> Result<String, PathError> {
        let route = self
            .route(name)
            .ok_or_else(|| PathError::UnknownRoute(name.to_owned()))?;

        let mut path = String::new();
        for tag in &route.tags {
            if !tag.is_variable() {
                path.push_str(tag.name());
                continue;
            }

            let value = values
                .iter()
                .find(|(key, _)| *key == tag.name())
                .map(|&(_, value)| value)
                .ok_or_else(|| PathError::MissingParam(tag.name().to_owned()))?;

            if value.is_empty() || tag.boundary(value) != value.len() {
                return Err(PathError::InvalidParam(tag.name().to_owned()));
            }
            path.push_str(value);
        }

        Ok(path)
    }

    /// Handlers that run for every request, routed or not.
    pub fn middleware(&self) -> &[H] {
        &self.handlers
    }

    /// The largest number of parameters captured by any route.
    pub fn max_params(&self) -> usize {
        self.max_params
    }

    /// Iterates over every registered route.
    pub fn routes(&self) -> impl Iterator<Item = &Endpoint<H>> {
        self.nodes.iter().filter_map(|node| node.endpoint.as_ref())
    }
}

impl<H> fmt::Debug for Tree<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("routes", &self.routes().collect::<Vec<_>>())
            .field("max_params", &self.max_params)
            .finish()
    }
}

pub(crate) fn method_name(method: Option<&Method>) -> &str {
    method.map_or("*", Method::as_str)
}
