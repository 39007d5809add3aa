//! Scope lookup.
//!
//! # Responsibilities
//! - Resolve the effective policy and upstream of every configured scope
//! - Look up the scope serving a request
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) host lookup via HashMap
//! - O(n) path prefix scan, longest prefix first
//! - Unknown hosts fall back to the global scope

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::config::GateConfig;
use crate::policy::{EffectivePolicy, Inherited};
use crate::routing::matcher::{normalize_host, PathPrefixMatcher};

/// One configuration scope after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    /// Human-readable scope name for logs (`global`, `example.com`, `example.com/api`).
    pub label: String,
    pub policy: EffectivePolicy,
    pub upstream: Option<String>,
}

#[derive(Debug)]
struct HostRoutes {
    scope: Arc<Scope>,
    /// Sorted longest prefix first.
    locations: Vec<(PathPrefixMatcher, Arc<Scope>)>,
}

/// Compiled scope tree for one configuration generation.
#[derive(Debug)]
pub struct ScopeRouter {
    global: Arc<Scope>,
    hosts: HashMap<String, HostRoutes>,
}

impl ScopeRouter {
    /// Resolve every scope in a validated configuration.
    pub fn from_config(config: &GateConfig) -> Self {
        let global_values = Inherited::root().merge(&config.policy);
        let global = Arc::new(Scope {
            label: "global".to_string(),
            policy: global_values.effective(),
            upstream: config.default_upstream.clone(),
        });

        let mut hosts = HashMap::with_capacity(config.hosts.len());
        for host in &config.hosts {
            let name = normalize_host(&host.name);
            let host_values = global_values.merge(&host.policy);
            let host_upstream = host.upstream.clone().or_else(|| global.upstream.clone());

            let mut locations: Vec<_> = host
                .locations
                .iter()
                .map(|location| {
                    let scope = Scope {
                        label: format!("{}{}", name, location.path_prefix),
                        policy: host_values.merge(&location.policy).effective(),
                        upstream: location.upstream.clone().or_else(|| host_upstream.clone()),
                    };
                    (PathPrefixMatcher::new(location.path_prefix.as_str()), Arc::new(scope))
                })
                .collect();
            locations.sort_by(|a, b| b.0.prefix_len().cmp(&a.0.prefix_len()));

            let scope = Arc::new(Scope {
                label: name.clone(),
                policy: host_values.effective(),
                upstream: host_upstream,
            });
            hosts.insert(name, HostRoutes { scope, locations });
        }

        Self { global, hosts }
    }

    /// Scope serving a request for `host` and `path`.
    pub fn match_scope(&self, host: Option<&str>, path: &str) -> &Arc<Scope> {
        let Some(routes) = host.and_then(|h| self.hosts.get(&normalize_host(h))) else {
            return &self.global;
        };

        routes
            .locations
            .iter()
            .find(|(matcher, _)| matcher.matches(path))
            .map(|(_, scope)| scope)
            .unwrap_or(&routes.scope)
    }

    /// Every scope, global first, then hosts by name with their locations.
    pub fn scopes(&self) -> Vec<&Scope> {
        let mut names: Vec<_> = self.hosts.keys().collect();
        names.sort();

        let mut scopes = vec![self.global.as_ref()];
        for name in names {
            let routes = &self.hosts[name];
            scopes.push(routes.scope.as_ref());
            let mut locations: Vec<_> = routes.locations.iter().map(|(_, s)| s.as_ref()).collect();
            locations.sort_by(|a, b| a.label.cmp(&b.label));
            scopes.extend(locations);
        }
        scopes
    }
}
