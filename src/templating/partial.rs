//! The `partial` template function.
//!
//! `partial(name="service", port=8080)` renders the partial `service` with the
//! invoking template's variables plus `port`, normalizes the result and
//! returns it as the text spliced at the call site. Every keyword argument
//! other than `name` is a local; an object passed as `locals=` is merged first
//! so a whole mapping can be forwarded at once.
//!
//! A fresh [`PartialFunction`] is registered for every evaluation, bound to
//! that evaluation's scope and nesting depth.

use std::collections::HashMap;

use tera::{Function, Value};

use super::error::TemplateError;
use super::renderer::Renderer;
use super::scope::{Bindings, Scope};
use crate::constants::LOCALS_VAR;

/// Name under which the function is registered.
pub const PARTIAL_FUNCTION: &str = "partial";

const NAME_ARG: &str = "name";

/// Evaluation context of a `partial(...)` call.
pub struct PartialFunction {
    renderer: Renderer,
    scope: Scope,
    depth: usize,
}

impl PartialFunction {
    /// Bind the function to the scope and depth of the evaluating template.
    pub fn new(renderer: Renderer, scope: Scope, depth: usize) -> Self {
        Self {
            renderer,
            scope,
            depth,
        }
    }
}

impl Function for PartialFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let name = match args.get(NAME_ARG) {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(tera::Error::msg(format!(
                    "partial() expects `name` to be a string, got {other}"
                )));
            }
            None => {
                return Err(tera::Error::msg(
                    "partial() requires a `name` argument, e.g. partial(name=\"service\")",
                ));
            }
        };

        let locals = collect_locals(args)?;
        self.renderer
            .render_partial(&name, &self.scope, &locals, self.depth + 1)
            .map(Value::String)
            .map_err(|e| partial_failed(&name, e))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// Gather the locals of a call: `locals=` first, then every other keyword.
fn collect_locals(args: &HashMap<String, Value>) -> tera::Result<Bindings> {
    let mut locals = Bindings::new();

    match args.get(LOCALS_VAR) {
        Some(Value::Object(map)) => locals.extend(map.clone()),
        Some(Value::Null) | None => {}
        Some(other) => {
            return Err(tera::Error::msg(format!(
                "partial() expects `locals` to be an object, got {other}"
            )));
        }
    }

    // HashMap order is arbitrary; keys are unique so the result does not depend on it.
    for (key, value) in args {
        if key != NAME_ARG && key != LOCALS_VAR {
            locals.insert(key.clone(), value.clone());
        }
    }

    Ok(locals)
}

/// Wrap a nested failure so it can be recovered from Tera's error chain.
fn partial_failed(name: &str, error: TemplateError) -> tera::Error {
    tera::Error::chain(format!("partial '{name}' failed"), error)
}
