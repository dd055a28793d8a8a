//! The path trie.
//!
//! Every node maps literal segments to children and methods to endpoints. A method
//! registered with parameters makes its node a capturing leaf: the captured tail consumes
//! all remaining segments, so such a node never has children.

use std::collections::HashMap;

use http::Method;

use crate::PathParams;

/// Why a registration could not be applied to the trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Conflict {
    DuplicateMethod,
    ParamsOverLiterals,
    UnderCapture,
    Occupied,
}

#[derive(Debug, Clone)]
pub(crate) struct RouteEntry<T> {
    pub(crate) endpoint: T,
    pub(crate) params: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct RouteNode<T> {
    children: HashMap<String, RouteNode<T>>,
    /// Set once a method with parameters is registered here
    capturing: bool,
    /// In registration order
    methods: Vec<(Method, RouteEntry<T>)>,
}

impl<T> Default for RouteNode<T> {
    fn default() -> Self {
        Self { children: HashMap::new(), capturing: false, methods: Vec::new() }
    }
}

/// The outcome of walking the trie.
pub(crate) enum Walk<'r, T> {
    Matched(&'r RouteEntry<T>, PathParams),
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl<T> RouteNode<T> {
    pub(crate) fn is_empty(&self) -> bool {
        self.children.is_empty() && self.methods.is_empty() && !self.capturing
    }

    /// Registers `entry` under `method` at the node reached through `segments`.
    ///
    /// Intermediate nodes created for a registration that fails are removed again.
    pub(crate) fn insert(&mut self, segments: &[String], method: Method, entry: RouteEntry<T>) -> Result<(), Conflict> {
        let Some((first, rest)) = segments.split_first() else {
            if self.methods.iter().any(|(registered, _)| *registered == method) {
                return Err(Conflict::DuplicateMethod);
            }
            if !entry.params.is_empty() {
                if !self.children.is_empty() {
                    return Err(Conflict::ParamsOverLiterals);
                }
                self.capturing = true;
            }
            self.methods.push((method, entry));
            return Ok(());
        };

        if self.capturing {
            return Err(Conflict::UnderCapture);
        }

        let child = self.children.entry(first.clone()).or_default();
        let result = child.insert(rest, method, entry);
        if result.is_err() && child.is_empty() {
            self.children.remove(first);
        }
        result
    }

    /// Places `node` at the empty slot reached through `segments`.
    pub(crate) fn graft(&mut self, segments: &[String], node: RouteNode<T>) -> Result<(), Conflict> {
        let Some((first, rest)) = segments.split_first() else {
            if !self.is_empty() {
                return Err(Conflict::Occupied);
            }
            *self = node;
            return Ok(());
        };

        if self.capturing {
            return Err(Conflict::UnderCapture);
        }

        let child = self.children.entry(first.clone()).or_default();
        let result = child.graft(rest, node);
        if result.is_err() && child.is_empty() {
            self.children.remove(first);
        }
        result
    }

    /// Resolves the remaining `segments` for `method`.
    ///
    /// A method registered at this node wins when its parameters can take all remaining
    /// segments. Otherwise the walk descends into the literal child of the next segment,
    /// without coming back. Method mismatches are only reported once the segments are
    /// exhausted.
    pub(crate) fn resolve<'r>(&'r self, segments: &[&str], method: &Method) -> Walk<'r, T> {
        if let Some((_, entry)) = self.methods.iter().find(|(registered, _)| registered == method) {
            if entry.params.len() >= segments.len() {
                return Walk::Matched(entry, PathParams::bind(&entry.params, segments));
            }
        }

        match segments.split_first() {
            Some((first, rest)) => match self.children.get(*first) {
                Some(child) => child.resolve(rest, method),
                None => Walk::NotFound,
            },
            None if self.methods.is_empty() => Walk::NotFound,
            None => Walk::MethodNotAllowed(self.methods.iter().map(|(method, _)| method.clone()).collect()),
        }
    }
}
