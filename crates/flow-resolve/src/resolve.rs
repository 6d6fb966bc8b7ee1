//! Layered, purely textual resolution of a call token to a class identity.
//!
//! There is no type checker behind this. A token is mapped through the
//! enclosing method's locals, then the enclosing class's fields, and the
//! resulting simple name is located through exact imports, wildcard imports,
//! the file's own package and finally project-wide uniqueness. The first step
//! that applies decides the outcome.

use crate::symbols::SymbolIndex;
use flow_core::config::ResolutionConfig;
use flow_core::graph::ClassId;
use flow_core::model::Import;
use std::collections::BTreeMap;

/// Which step located the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Via {
    ExactImport,
    WildcardImport,
    SamePackage,
    GlobalUnique,
}

/// Outcome of resolving one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { id: ClassId, via: Via },
    /// Global lookup found several classes with this simple name.
    Ambiguous(Vec<ClassId>),
    Unresolved,
    /// `this` or `super`.
    Skipped,
}

impl Resolution {
    pub fn id(&self) -> Option<&ClassId> {
        match self {
            Self::Resolved { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Name bindings visible at the point a token was found.
#[derive(Debug, Clone, Copy)]
pub struct ResolveScope<'a> {
    /// Locals and parameters of the enclosing method, if any.
    pub locals: Option<&'a BTreeMap<String, String>>,
    /// Fields of the enclosing class.
    pub fields: Option<&'a BTreeMap<String, String>>,
    pub imports: &'a [Import],
    /// Package of the enclosing file, empty for the default package.
    pub package: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Accept a project-wide unique simple name as a last resort.
    pub global_fallback: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            global_fallback: true,
        }
    }
}

impl From<&ResolutionConfig> for ResolveOptions {
    fn from(config: &ResolutionConfig) -> Self {
        Self {
            global_fallback: config.global_fallback,
        }
    }
}

/// Resolve the receiver token of a `token.member` access.
pub fn resolve_token(
    token: &str,
    scope: &ResolveScope<'_>,
    index: &SymbolIndex,
    options: &ResolveOptions,
) -> Resolution {
    let simple = token.rsplit('.').next().unwrap_or(token).trim();
    if simple.is_empty() || simple == "this" || simple == "super" {
        return Resolution::Skipped;
    }

    let typed = scope
        .locals
        .and_then(|locals| locals.get(simple))
        .or_else(|| scope.fields.and_then(|fields| fields.get(simple)));
    let simple = typed.map_or(simple, String::as_str);

    resolve_type(simple, scope.imports, scope.package, index, options)
}

/// Locate a simple type name from a file's point of view (imports, own
/// package, global uniqueness). Also used for supertypes.
pub fn resolve_type(
    simple: &str,
    imports: &[Import],
    package: &str,
    index: &SymbolIndex,
    options: &ResolveOptions,
) -> Resolution {
    if let Some(import) = imports
        .iter()
        .find(|i| !i.is_static && i.simple_name() == Some(simple))
    {
        // An explicit import names the class; if it is not ours it is external.
        return match declaring_package(import.package(), simple, index) {
            Some(package) => Resolution::Resolved {
                id: ClassId::new(package, simple),
                via: Via::ExactImport,
            },
            None => Resolution::Unresolved,
        };
    }

    if let Some(package) = imports
        .iter()
        .filter(|i| !i.is_static && i.wildcard)
        .find_map(|i| declaring_package(i.package(), simple, index))
    {
        return Resolution::Resolved {
            id: ClassId::new(package, simple),
            via: Via::WildcardImport,
        };
    }

    if index.contains(package, simple) {
        return Resolution::Resolved {
            id: ClassId::new(package, simple),
            via: Via::SamePackage,
        };
    }

    if !options.global_fallback {
        return Resolution::Unresolved;
    }
    let mut ids = index.identities(simple);
    match ids.len() {
        0 => Resolution::Unresolved,
        1 => Resolution::Resolved {
            id: ids.remove(0),
            via: Via::GlobalUnique,
        },
        _ => Resolution::Ambiguous(ids),
    }
}

/// Package under which `simple` is registered when imported through
/// `owner`. Nested classes are imported as `pkg.Outer.Inner` but registered
/// under `pkg`, so enclosing segments are dropped until one matches.
fn declaring_package<'o>(owner: &'o str, simple: &str, index: &SymbolIndex) -> Option<&'o str> {
    let mut owner = owner;
    loop {
        if index.contains(owner, simple) {
            return Some(owner);
        }
        owner = owner.rsplit_once('.')?.0;
    }
}
