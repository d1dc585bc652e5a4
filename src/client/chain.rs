//! Call-chain accumulation and endpoint resolution.

use crate::paths::{Endpoint, Verb};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// State built up by successive chain calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainState {
    endpoint_id: String,
    ids: VecDeque<Value>,
    payload: Option<Value>,
}

impl ChainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call: append `name` to the endpoint id, queue a leading
    /// scalar argument as a path id, and keep the first remaining object or
    /// array argument as payload.
    pub fn accumulate(&mut self, name: &str, args: Vec<Value>) {
        if self.endpoint_id.is_empty() {
            self.endpoint_id.push_str(name);
        } else {
            self.endpoint_id.push('_');
            self.endpoint_id.push_str(name);
        }

        let mut args = VecDeque::from(args);
        if args.front().is_some_and(is_scalar) {
            if let Some(id) = args.pop_front() {
                self.ids.push_back(id);
            }
        }
        self.payload = args.into_iter().find(|v| !is_scalar(v));
        debug!(endpoint = %self.endpoint_id, ids = self.ids.len(), "chain call");
    }

    pub fn endpoint_id(&self) -> &str {
        &self.endpoint_id
    }

    pub fn ids(&self) -> &VecDeque<Value> {
        &self.ids
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoint_id.is_empty() && self.ids.is_empty() && self.payload.is_none()
    }

    /// Take the accumulated state, leaving the chain empty.
    pub fn take(&mut self) -> (String, VecDeque<Value>, Option<Value>) {
        let state = std::mem::take(self);
        (state.endpoint_id, state.ids, state.payload)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

/// A table hit with its path filled in, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCall {
    pub endpoint_id: String,
    pub verb: Verb,
    pub path: String,
    pub payload: Option<Value>,
}

/// Substitute `ids` into the endpoint's template.
///
/// Ids beyond the placeholder count are ignored.
pub fn resolve_call(
    endpoint: &Endpoint,
    mut ids: VecDeque<Value>,
    payload: Option<Value>,
) -> Result<ResolvedCall> {
    let path = endpoint
        .path
        .resolve(&mut ids)
        .map_err(|e| Error::MissingPathId {
            endpoint: endpoint.id.clone(),
            path: e.path,
            placeholder: e.placeholder,
        })?;

    if !ids.is_empty() {
        warn!(endpoint = %endpoint.id, unused = ids.len(), "ignoring extra path ids");
    }

    Ok(ResolvedCall {
        endpoint_id: endpoint.id.clone(),
        verb: endpoint.verb,
        path,
        payload,
    })
}
