//! Trie routing with reverse URL lookup and sub-router mounting.
//!
//! A route template is a literal prefix followed by parameters, like `/user/:name` or
//! `/archive/:year/:month`. The literal segments form a path in the trie; parameters
//! capture whatever segments remain. Trailing parameters are optional, so `/user` also
//! resolves to `/user/:name`, with `name` unbound.
//!
//! Resolution never backtracks: a method registered at a node wins as soon as its
//! parameters can take all remaining segments, otherwise the walk moves on to the literal
//! child of the next segment.
//!
//! ```
//! use http::Method;
//! use trellis_web::router::{Resolution, Router};
//!
//! let mut router = Router::new();
//! router.add_route("/user/:name", Method::GET, "user", None).unwrap();
//!
//! let Resolution::Matched { endpoint, params } = router.resolve("/user/ivan", &Method::GET) else {
//!     panic!("no match")
//! };
//! assert_eq!(*endpoint, "user");
//! assert_eq!(params.get("name"), Some("ivan"));
//!
//! assert_eq!(router.reverse("user", &[("name", "ivan")]), Some("/user/ivan".to_string()));
//! ```

mod builder;
mod node;
mod reverse;

pub use builder::RouteItem;
pub use builder::RouterBuilder;
pub use builder::{connect, delete, get, head, options, patch, post, put, trace};

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use http::Method;
use thiserror::Error;
use tracing::debug;

use crate::handler::RequestHandler;
use crate::PathParams;
use node::{Conflict, RouteEntry, RouteNode, Walk};
use reverse::{ReverseEntry, ReverseIndex};

/// Routes endpoints of type `T` by path and method.
#[derive(Clone)]
pub struct Router<T = Arc<dyn RequestHandler>> {
    root: RouteNode<T>,
    index: ReverseIndex,
}

/// What a path and method resolve to.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'r, T> {
    Matched { endpoint: &'r T, params: PathParams },
    /// The path exists, but not for this method; lists the methods it has
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid route template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: &'static str },

    #[error("route template {template:?} has a literal segment after a parameter")]
    LiteralAfterParameter { template: String },

    #[error("method {method} is already registered for {template:?}")]
    DuplicateMethod { template: String, method: Method },

    #[error("route {template:?} would capture parameters where literal routes continue")]
    ParametersOverLiterals { template: String },

    #[error("route {template:?} continues below a node that captures parameters")]
    LiteralUnderParameters { template: String },

    #[error("mount point {prefix:?} is already in use")]
    MountOccupied { prefix: String },

    #[error("a router can't be mounted at the root")]
    MountAtRoot,
}

/// The name an endpoint is registered under when no explicit name is given.
pub trait RouteName {
    fn route_name(&self) -> Cow<'_, str>;
}

impl RouteName for &'static str {
    fn route_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl RouteName for String {
    fn route_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl RouteName for Arc<dyn RequestHandler> {
    fn route_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.name())
    }
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RouteTemplate {
    literals: Vec<String>,
    params: Vec<String>,
}

impl RouteTemplate {
    fn parse(template: &str) -> Result<Self, RouteError> {
        let invalid = |reason| RouteError::InvalidTemplate { template: template.to_string(), reason };

        if !template.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut literals = Vec::new();
        let mut params: Vec<String> = Vec::new();
        for segment in split_path(template) {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            match segment.strip_prefix(':') {
                Some("") => return Err(invalid("unnamed parameter")),
                Some(name) if params.iter().any(|param| param == name) => {
                    return Err(invalid("duplicate parameter name"));
                }
                Some(name) => params.push(name.to_string()),
                None if !params.is_empty() => {
                    return Err(RouteError::LiteralAfterParameter { template: template.to_string() });
                }
                None => literals.push(segment.to_string()),
            }
        }

        Ok(Self { literals, params })
    }

    fn literal_path(&self) -> String {
        format!("/{}", self.literals.join("/"))
    }
}

/// Splits a path into its segments: everything after the first `/`, where `/` itself has none.
fn split_path(path: &str) -> Vec<&str> {
    let segments: Vec<&str> = path.split('/').skip(1).collect();
    if segments == [""] { Vec::new() } else { segments }
}

impl<T> fmt::Debug for Router<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("names", &self.index.len()).finish_non_exhaustive()
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self { root: RouteNode::default(), index: ReverseIndex::default() }
    }
}

impl<T> Router<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `endpoint` for `method` at `template`.
    ///
    /// The route is recorded for reverse lookup under `name`, or under the endpoint's
    /// [`RouteName`] when `name` is `None`.
    ///
    /// # Errors
    ///
    /// Fails on a malformed template, a method already registered at the same literal
    /// path, parameters at a node that has literal children, and literal segments below a
    /// node that captures parameters. A failed registration leaves the router unchanged.
    pub fn add_route(&mut self, template: &str, method: Method, endpoint: T, name: Option<&str>) -> Result<(), RouteError>
    where
        T: RouteName,
    {
        let parsed = RouteTemplate::parse(template)?;
        let name = match name {
            Some(name) => name.to_string(),
            None => endpoint.route_name().into_owned(),
        };

        let entry = RouteEntry { endpoint, params: parsed.params.clone() };
        self.root.insert(&parsed.literals, method.clone(), entry).map_err(|conflict| {
            let template = template.to_string();
            match conflict {
                Conflict::DuplicateMethod => RouteError::DuplicateMethod { template, method: method.clone() },
                Conflict::ParamsOverLiterals => RouteError::ParametersOverLiterals { template },
                Conflict::UnderCapture | Conflict::Occupied => RouteError::LiteralUnderParameters { template },
            }
        })?;

        debug!(template, %method, %name, "route added");
        self.index.insert(&name, ReverseEntry::new(parsed.literal_path(), parsed.params));
        Ok(())
    }

    /// Resolves `path` for `method`.
    ///
    /// Unfilled trailing parameters of a match are present in the params, but unbound.
    pub fn resolve(&self, path: &str, method: &Method) -> Resolution<'_, T> {
        match self.root.resolve(&split_path(path), method) {
            Walk::Matched(entry, params) => Resolution::Matched { endpoint: &entry.endpoint, params },
            Walk::MethodNotAllowed(allowed) => Resolution::MethodNotAllowed(allowed),
            Walk::NotFound => Resolution::NotFound,
        }
    }

    /// Mounts `sub` at the literal path `prefix`.
    ///
    /// Every route of `sub` becomes reachable below `prefix`. Its reverse names are qualified
    /// with the prefix segments: `list` mounted at `/api/v1` is reversed as `api:v1:list`.
    ///
    /// # Errors
    ///
    /// Fails when `prefix` is `/` or not a plain literal path, when the slot already has
    /// routes or children, and when it lies below a node that captures parameters.
    pub fn mount(&mut self, prefix: &str, sub: Router<T>) -> Result<(), RouteError> {
        let parsed = RouteTemplate::parse(prefix)?;
        if !parsed.params.is_empty() {
            return Err(RouteError::InvalidTemplate {
                template: prefix.to_string(),
                reason: "a mount point can't have parameters",
            });
        }
        if parsed.literals.is_empty() {
            return Err(RouteError::MountAtRoot);
        }

        self.root.graft(&parsed.literals, sub.root).map_err(|conflict| match conflict {
            Conflict::UnderCapture => RouteError::LiteralUnderParameters { template: prefix.to_string() },
            _ => RouteError::MountOccupied { prefix: prefix.to_string() },
        })?;

        debug!(prefix, names = sub.index.len(), "router mounted");
        self.index.merge_mounted(&parsed.literals, sub.index);
        Ok(())
    }

    /// Builds the URL of the route registered as `name` from `args`.
    ///
    /// Candidates with more parameters are tried first. A candidate fits when it has every
    /// supplied name and only trailing parameters are left out. Values are inserted as they
    /// are, and one containing `/` fits no candidate since it would not resolve back to the
    /// same parameter.
    pub fn reverse(&self, name: &str, args: &[(&str, &str)]) -> Option<String> {
        self.index.reverse(name, args)
    }
}
