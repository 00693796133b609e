use std::fmt;

/// Represents errors that can occur while building a route tree.
///
/// These are programmer errors in the route declarations. Every variant names
/// the offending pattern so startup can abort with a useful message.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum InsertError {
    /// The same method and pattern were registered twice.
    Conflict {
        /// The conflicting route, as `METHOD pattern`.
        route: String,
    },
    /// Two routes were registered under the same name.
    DuplicateName {
        /// The reused route name.
        name: String,
    },
    /// A placeholder slot shared with an earlier route uses a different name.
    InconsistentName {
        /// The pattern being inserted.
        pattern: String,
        /// The name registered by the earlier route.
        expected: String,
        /// The name used by this pattern.
        found: String,
    },
    /// A parameter name appears more than once in a single route.
    DuplicateParam {
        /// The pattern being inserted.
        pattern: String,
        /// The repeated parameter name.
        name: String,
    },
    /// Placeholders must be registered with a name.
    UnnamedParam {
        /// The pattern being inserted.
        pattern: String,
    },
    /// Unbalanced brackets or an unknown placeholder kind.
    InvalidPattern {
        /// The pattern being inserted.
        pattern: String,
    },
    /// A regex placeholder failed to compile.
    InvalidRegex {
        /// The pattern being inserted.
        pattern: String,
        /// The compiler's message.
        error: String,
    },
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { route } => write!(f, "duplicate route: {}", route),
            Self::DuplicateName { name } => write!(f, "duplicate route name: {}", name),
            Self::InconsistentName {
                pattern,
                expected,
                found,
            } => write!(
                f,
                "inconsistent parameter name '{}' in '{}', previously registered as '{}'",
                found, pattern, expected
            ),
            Self::DuplicateParam { pattern, name } => {
                write!(f, "parameter '{}' appears twice in '{}'", name, pattern)
            }
            Self::UnnamedParam { pattern } => {
                write!(f, "parameters must be registered with a name: '{}'", pattern)
            }
            Self::InvalidPattern { pattern } => write!(f, "malformed route pattern: '{}'", pattern),
            Self::InvalidRegex { pattern, error } => {
                write!(f, "invalid regex placeholder in '{}': {}", pattern, error)
            }
        }
    }
}

impl std::error::Error for InsertError {}

/// A failed match attempt.
///
/// ```
/// use http::Method;
/// use tagroute::{MatchError, Router};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut router = Router::new();
/// router.get("/home", ["Welcome!"]);
/// let tree = router.build()?;
///
/// // no routes match
/// if let Err(err) = tree.at(&Method::GET, "/foobar") {
///     assert_eq!(err, MatchError::NotFound);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MatchError {
    /// No matching route was found.
    NotFound,
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matching route not found")
    }
}

impl std::error::Error for MatchError {}

/// Errors returned when rendering a named route back into a path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathError {
    /// No route is registered under the name.
    UnknownRoute(String),
    /// A placeholder of the route has no value.
    MissingParam(String),
    /// The value given for a placeholder does not satisfy its grammar.
    InvalidParam(String),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRoute(name) => write!(f, "no route named '{}'", name),
            Self::MissingParam(name) => write!(f, "missing value for parameter '{}'", name),
            Self::InvalidParam(name) => write!(f, "invalid value for parameter '{}'", name),
        }
    }
}

impl std::error::Error for PathError {}
