//! Variable scopes for template evaluation.
//!
//! A [`Scope`] is the set of named variables visible while one template or
//! partial is evaluated. Scopes are plain values: building a partial's scope
//! never mutates the caller's, so locals cannot leak into sibling or parent
//! evaluations.

use serde_json::{Map, Value};
use tera::Context as TeraContext;

use crate::constants::{
    CURRENT_SHA_VAR, DEPLOYMENT_ID_ENTROPY_BYTES, DEPLOYMENT_ID_SHA_LEN, DEPLOYMENT_ID_VAR,
    LOCALS_VAR,
};

/// Caller-supplied template variables.
pub type Bindings = Map<String, Value>;

/// Ordered mapping from variable name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    vars: Map<String, Value>,
}

impl Scope {
    /// Create the system scope holding `current_sha` and `deployment_id`.
    ///
    /// Both entries are always present; they are `null` when unknown.
    #[must_use]
    pub fn system(current_sha: Option<&str>, deployment_id: Option<&str>) -> Self {
        let mut vars = Map::new();
        vars.insert(CURRENT_SHA_VAR.to_string(), optional_string(current_sha));
        vars.insert(DEPLOYMENT_ID_VAR.to_string(), optional_string(deployment_id));
        Self {
            vars,
        }
    }

    /// Return a new scope with `overrides` merged over this one.
    ///
    /// Later entries win on name collision; values are replaced, not deep-merged.
    #[must_use]
    pub fn merged_with(&self, overrides: &Bindings) -> Self {
        let mut vars = self.vars.clone();
        for (name, value) in overrides {
            vars.insert(name.clone(), value.clone());
        }
        Self {
            vars,
        }
    }

    /// Return the scope a partial evaluates with.
    ///
    /// The locals are merged over this scope and the whole mapping is also
    /// exposed as `locals`, so a partial can test `locals.replicas is defined`.
    /// An explicit local named `locals` takes precedence over that mapping.
    #[must_use]
    pub fn with_locals(&self, locals: &Bindings) -> Self {
        let mut vars = self.vars.clone();
        vars.insert(LOCALS_VAR.to_string(), Value::Object(locals.clone()));
        for (name, value) in locals {
            vars.insert(name.clone(), value.clone());
        }
        Self {
            vars,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Names of every variable in scope.
    pub fn names(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Build the Tera context that exposes every variable by name.
    pub fn to_context(&self) -> tera::Result<TeraContext> {
        TeraContext::from_serialize(&self.vars)
    }
}

impl From<Bindings> for Scope {
    fn from(vars: Bindings) -> Self {
        Self {
            vars,
        }
    }
}

/// Build a scope from `base` with `overrides` merged on top.
///
/// `build_scope(&system, &bindings)` is the top-level scope of a render;
/// partial locals are merged the same way by [`Scope::with_locals`].
#[must_use]
pub fn build_scope(base: &Scope, overrides: &Bindings) -> Scope {
    base.merged_with(overrides)
}

/// Derive a per-render deployment id from a commit SHA.
///
/// The id is the first eight characters of the SHA, a dash, and eight random
/// hex characters, e.g. `12345678-9f3ac01d`.
#[must_use]
pub fn generate_deployment_id(current_sha: &str) -> String {
    let prefix: String = current_sha.chars().take(DEPLOYMENT_ID_SHA_LEN).collect();
    let entropy = uuid::Uuid::new_v4();
    let suffix = hex::encode(&entropy.as_bytes()[..DEPLOYMENT_ID_ENTROPY_BYTES]);
    format!("{prefix}-{suffix}")
}

fn optional_string(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_string()))
}
