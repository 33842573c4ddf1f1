//! The transpiler registry (§4.10): a thread-safe singleton mapping the
//! closed [`TranspileTarget`] enumeration to a [`Transpiler`] backend.
//!
//! Grounded on `original_source/src/yuho/transpile/{base.py,registry.py}` for
//! the `from_string`/alias-mapping and `file_extension` contract, and on the
//! general "registry as facade over a pluggable backend set" shape the
//! teacher's own codebase uses for its emitters. The Python original's
//! double-checked-locking singleton is reimplemented with
//! [`std::sync::OnceLock`] guarding a [`std::sync::Mutex`]-protected
//! registration/cache table — the idiomatic Rust replacement, needing no
//! unsafe code or manual memory fencing (§4.10 / §9 design notes).
//!
//! Per DESIGN.md: the original Python registry also carries `GraphQL` and
//! `Blocks` targets beyond the six named here. Since the data model
//! explicitly states the target enum is *closed*, those two are
//! deliberately not ported — spec.md's closedness invariant wins over
//! "supplement dropped features" for this one case.

pub mod alloy;
pub mod english;
pub mod json;
pub mod jsonld;
pub mod latex;
pub mod mermaid;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::ast::nodes::Module;

/// The closed enumeration of output backends (§4.10/§6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranspileTarget {
    Json,
    JsonLd,
    English,
    Latex,
    Mermaid,
    Alloy,
}

impl TranspileTarget {
    pub const ALL: [TranspileTarget; 6] = [
        TranspileTarget::Json,
        TranspileTarget::JsonLd,
        TranspileTarget::English,
        TranspileTarget::Latex,
        TranspileTarget::Mermaid,
        TranspileTarget::Alloy,
    ];

    /// Canonical file extension for this target (§6.3's `.json`, `.jsonld`,
    /// `.txt`, `.tex`, `.mmd`, `.als`).
    pub fn file_extension(self) -> &'static str {
        match self {
            TranspileTarget::Json => "json",
            TranspileTarget::JsonLd => "jsonld",
            TranspileTarget::English => "txt",
            TranspileTarget::Latex => "tex",
            TranspileTarget::Mermaid => "mmd",
            TranspileTarget::Alloy => "als",
        }
    }

    /// Parses a target name the way an embedding CLI's `--target` flag
    /// would, accepting the canonical name plus a few common aliases
    /// (`jsonld`, `tex`, `mmd`, `als`, ...), matching the original
    /// registry's permissive `from_string`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "json" => TranspileTarget::Json,
            "json-ld" | "jsonld" => TranspileTarget::JsonLd,
            "english" | "natural" | "cnl" => TranspileTarget::English,
            "latex" | "tex" => TranspileTarget::Latex,
            "mermaid" | "mmd" => TranspileTarget::Mermaid,
            "alloy" | "als" => TranspileTarget::Alloy,
            _ => return None,
        })
    }
}

impl std::fmt::Display for TranspileTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TranspileTarget::Json => "json",
            TranspileTarget::JsonLd => "json-ld",
            TranspileTarget::English => "english",
            TranspileTarget::Latex => "latex",
            TranspileTarget::Mermaid => "mermaid",
            TranspileTarget::Alloy => "alloy",
        };
        write!(f, "{s}")
    }
}

/// Failure mode for a transpiler backend. Unlike parse/build/semantic
/// diagnostics, transpilation failures are rare (a backend encountering a
/// module shape it cannot render) and are reported as a single structured
/// error rather than a diagnostic list.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{target} transpiler failed: {message}")]
pub struct TranspileError {
    pub target: TranspileTarget,
    pub message: String,
}

impl TranspileError {
    pub fn new(target: TranspileTarget, message: impl Into<String>) -> Self {
        Self {
            target,
            message: message.into(),
        }
    }
}

/// A backend that renders an analyzed [`Module`] to one target format.
///
/// Matches the original's `TranspilerBase` abstract contract: a `target`
/// tag, a canonical `file_extension`, and the `transpile` entry point
/// itself.
pub trait Transpiler: Send + Sync {
    fn target(&self) -> TranspileTarget;

    fn file_extension(&self) -> &'static str {
        self.target().file_extension()
    }

    fn transpile(&self, module: &Module) -> Result<String, TranspileError>;
}

enum Registration {
    Instance(Arc<dyn Transpiler>),
    Factory(Arc<dyn Fn() -> Box<dyn Transpiler> + Send + Sync>),
}

#[derive(Default)]
struct RegistryState {
    registrations: HashMap<TranspileTarget, Registration>,
    cache: HashMap<TranspileTarget, Arc<dyn Transpiler>>,
    defaults_registered: bool,
}

impl RegistryState {
    /// Built-in transpilers are lazily registered on first use (§4.10), not
    /// at process startup, so a caller that never transpiles never pays for
    /// constructing six backend instances.
    fn ensure_defaults(&mut self) {
        if self.defaults_registered {
            return;
        }
        self.defaults_registered = true;

        self.register_default(TranspileTarget::Json, || Box::new(json::JsonTranspiler));
        self.register_default(TranspileTarget::JsonLd, || {
            Box::new(jsonld::JsonLdTranspiler::default())
        });
        self.register_default(TranspileTarget::English, || {
            Box::new(english::EnglishTranspiler)
        });
        self.register_default(TranspileTarget::Latex, || Box::new(latex::LatexTranspiler));
        self.register_default(TranspileTarget::Mermaid, || {
            Box::new(mermaid::MermaidTranspiler)
        });
        self.register_default(TranspileTarget::Alloy, || Box::new(alloy::AlloyTranspiler));
    }

    fn register_default(
        &mut self,
        target: TranspileTarget,
        factory: impl Fn() -> Box<dyn Transpiler> + Send + Sync + 'static,
    ) {
        self.registrations
            .entry(target)
            .or_insert_with(|| Registration::Factory(Arc::new(factory)));
    }
}

static REGISTRY: OnceLock<Mutex<RegistryState>> = OnceLock::new();

fn state() -> &'static Mutex<RegistryState> {
    REGISTRY.get_or_init(|| Mutex::new(RegistryState::default()))
}

/// The transpiler registry facade (§4.10). All methods are associated
/// functions over the process-wide singleton; there is no instance to
/// construct.
pub struct TranspilerRegistry;

impl TranspilerRegistry {
    /// Returns the (possibly cached) transpiler instance for `target`,
    /// instantiating and caching it on first request.
    pub fn get(target: TranspileTarget) -> Arc<dyn Transpiler> {
        let mut guard = state().lock().expect("transpiler registry mutex poisoned");
        guard.ensure_defaults();

        if let Some(cached) = guard.cache.get(&target) {
            return cached.clone();
        }

        let instance: Arc<dyn Transpiler> = match guard.registrations.get(&target) {
            Some(Registration::Instance(instance)) => instance.clone(),
            Some(Registration::Factory(factory)) => Arc::from(factory()),
            None => unreachable!("ensure_defaults registers every TranspileTarget variant"),
        };
        guard.cache.insert(target, instance.clone());
        instance
    }

    /// Registers a pre-built instance for `target`, replacing any existing
    /// registration and evicting the cached instance (if any).
    pub fn register_instance(target: TranspileTarget, instance: Arc<dyn Transpiler>) {
        let mut guard = state().lock().expect("transpiler registry mutex poisoned");
        guard.ensure_defaults();
        guard.registrations.insert(target, Registration::Instance(instance));
        guard.cache.remove(&target);
    }

    /// Registers a factory callable for `target` ("class" registration in
    /// the original's dynamically-typed registry maps to a factory function
    /// in Rust, since there is no first-class class object to register).
    pub fn register_factory(
        target: TranspileTarget,
        factory: impl Fn() -> Box<dyn Transpiler> + Send + Sync + 'static,
    ) {
        let mut guard = state().lock().expect("transpiler registry mutex poisoned");
        guard.ensure_defaults();
        guard
            .registrations
            .insert(target, Registration::Factory(Arc::new(factory)));
        guard.cache.remove(&target);
    }

    /// Removes any registration and cached instance for `target`. A
    /// subsequent `get` falls back to the built-in default again.
    pub fn unregister(target: TranspileTarget) {
        let mut guard = state().lock().expect("transpiler registry mutex poisoned");
        guard.registrations.remove(&target);
        guard.cache.remove(&target);
        guard.defaults_registered = false;
    }

    /// Clears every registration and cached instance (for tests).
    pub fn reset() {
        let mut guard = state().lock().expect("transpiler registry mutex poisoned");
        *guard = RegistryState::default();
    }

    /// Convenience: `Self::get(target).transpile(module)`.
    pub fn transpile(target: TranspileTarget, module: &Module) -> Result<String, TranspileError> {
        Self::get(target).transpile(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn empty_module() -> Module {
        Module {
            span: crate::span::SourceSpan::new(0, 0, 1, 1),
            source_path: None,
            imports: Vec::new(),
            type_defs: IndexMap::new(),
            function_defs: IndexMap::new(),
            statutes: IndexMap::new(),
            variables: Vec::new(),
            items: Vec::new(),
        }
    }

    #[test]
    fn every_target_is_registered_lazily() {
        TranspilerRegistry::reset();
        for target in TranspileTarget::ALL {
            let out = TranspilerRegistry::transpile(target, &empty_module()).unwrap();
            assert!(!out.is_empty());
        }
    }

    #[test]
    fn extensions_match_targets() {
        assert_eq!(TranspileTarget::Json.file_extension(), "json");
        assert_eq!(TranspileTarget::JsonLd.file_extension(), "jsonld");
        assert_eq!(TranspileTarget::English.file_extension(), "txt");
        assert_eq!(TranspileTarget::Latex.file_extension(), "tex");
        assert_eq!(TranspileTarget::Mermaid.file_extension(), "mmd");
        assert_eq!(TranspileTarget::Alloy.file_extension(), "als");
    }

    #[test]
    fn from_name_accepts_aliases() {
        assert_eq!(TranspileTarget::from_name("jsonld"), Some(TranspileTarget::JsonLd));
        assert_eq!(TranspileTarget::from_name("TEX"), Some(TranspileTarget::Latex));
        assert_eq!(TranspileTarget::from_name("unknown"), None);
    }

    #[test]
    fn reset_clears_registrations_and_cache() {
        TranspilerRegistry::reset();
        let first = TranspilerRegistry::get(TranspileTarget::Json);
        TranspilerRegistry::reset();
        let second = TranspilerRegistry::get(TranspileTarget::Json);
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
