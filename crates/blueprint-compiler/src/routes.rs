//! Route and namespace derivation from raw paths.

use indexmap::IndexMap;
use regex_lite::Regex;
use serde::Serialize;

use crate::docs::all_children;
use crate::endpoint::Endpoint;
use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub path: String,
    pub name: String,
    pub namespace_path: Option<String>,
    pub parent_path: Option<String>,
    pub endpoints: Vec<Endpoint>,
    pub is_deprecated: bool,
    pub is_undocumented: bool,
    pub is_draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub path: String,
    pub is_deprecated: bool,
    pub is_undocumented: bool,
    pub is_draft: bool,
}

/// `/devices/unmanaged/list` -> `/devices/unmanaged`.
pub fn route_path(path: &str) -> String {
    let pieces: Vec<&str> = path.split('/').collect();
    let inner = pieces
        .get(1..pieces.len().saturating_sub(1))
        .unwrap_or_default();
    format!("/{}", inner.join("/"))
}

/// Last segment of a route path.
pub fn route_name(route_path: &str) -> Result<String, CompileError> {
    route_path
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CompileError::UnresolvedName(format!("route name for '{}'", route_path)))
}

/// The route path minus its last segment, `None` at the top level.
pub fn parent_path(route_path: &str) -> Option<String> {
    route_path
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .filter(|parent| !parent.is_empty())
        .map(str::to_string)
}

/// The longest leading run of segments of `path` that are not themselves endpoint prefixes.
///
/// A prefix `/a/b` is an endpoint prefix when some declared path matches `^/a/b/\w+$`.
/// The final segment is never part of a namespace.
pub fn namespace_path(path: &str, all_paths: &[&str]) -> Option<String> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut namespace = String::new();

    for segment in segments.iter().take(segments.len().saturating_sub(1)) {
        let candidate = format!("{}/{}", namespace, segment);
        if is_endpoint_prefix(&candidate, all_paths) {
            break;
        }
        namespace = candidate;
    }

    (!namespace.is_empty()).then_some(namespace)
}

fn is_endpoint_prefix(prefix: &str, all_paths: &[&str]) -> bool {
    let pattern = format!(r"^{}/\w+$", regex_lite::escape(prefix));
    match Regex::new(&pattern) {
        Ok(re) => all_paths.iter().any(|path| re.is_match(path)),
        Err(_) => false,
    }
}

/// Group endpoints into routes, keyed by route path in first-seen order.
///
/// Endpoints whose raw paths collapse to the same route path are merged into
/// one route.
pub fn build_routes(
    endpoints: Vec<Endpoint>,
    all_paths: &[&str],
) -> Result<Vec<Route>, CompileError> {
    let routes = endpoints.into_iter().try_fold(
        IndexMap::<String, Route>::new(),
        |mut routes, endpoint| {
            let path = route_path(&endpoint.path);
            match routes.get_mut(&path) {
                Some(route) => route.endpoints.push(endpoint),
                None => {
                    let route = Route {
                        name: route_name(&path)?,
                        namespace_path: namespace_path(&endpoint.path, all_paths),
                        parent_path: parent_path(&path),
                        path: path.clone(),
                        endpoints: vec![endpoint],
                        is_deprecated: false,
                        is_undocumented: false,
                        is_draft: false,
                    };
                    routes.insert(path, route);
                }
            }
            Ok::<_, CompileError>(routes)
        },
    )?;

    Ok(routes
        .into_values()
        .map(|route| Route {
            is_deprecated: all_children(&route.endpoints, |e| e.doc.is_deprecated),
            is_undocumented: all_children(&route.endpoints, |e| e.doc.is_undocumented),
            is_draft: all_children(&route.endpoints, |e| e.doc.is_draft),
            ..route
        })
        .collect())
}

/// One namespace per distinct namespace path, in first-seen order.
pub fn build_namespaces(routes: &[Route]) -> Vec<Namespace> {
    let mut members: IndexMap<&str, Vec<&Route>> = IndexMap::new();
    for route in routes {
        if let Some(namespace) = route.namespace_path.as_deref() {
            members.entry(namespace).or_default().push(route);
        }
    }

    members
        .into_iter()
        .map(|(path, routes)| Namespace {
            path: path.to_string(),
            is_deprecated: all_children(&routes, |r| r.is_deprecated),
            is_undocumented: all_children(&routes, |r| r.is_undocumented),
            is_draft: all_children(&routes, |r| r.is_draft),
        })
        .collect()
}
