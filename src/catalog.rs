//! Template catalog: the immutable registry of instantiable components.
//!
//! A [`Template`] carries only presentation data (display name, icon
//! identifier, kind, category); the engine never stores renderable objects.
//! The catalog is built once at startup, from [`TemplateCatalog::builtin`]
//! plus any [`register`](TemplateCatalog::register) calls, and is read-only
//! afterwards.
//!
//! # Examples
//!
//! ```rust
//! use workboard::catalog::{Template, TemplateCatalog, TemplateCategory};
//! use workboard::types::ComponentKind;
//!
//! let mut catalog = TemplateCatalog::builtin();
//! assert!(catalog.lookup("terminal").is_some());
//! assert!(catalog.lookup("sandwich").is_none());
//!
//! catalog.register(Template {
//!     key: "gpu-profiler".into(),
//!     name: "GPU Profiler".into(),
//!     icon: "profiler".into(),
//!     kind: ComponentKind::Custom("gpu-profiler".into()),
//!     category: TemplateCategory::Community,
//! });
//! assert_eq!(catalog.lookup("gpu-profiler").unwrap().name, "GPU Profiler");
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::types::ComponentKind;

/// Where a catalog entry comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateCategory {
    /// Shipped with the product.
    #[default]
    Official,
    /// Published by the community marketplace.
    Community,
    /// Defined by the current user or organisation.
    Custom,
}

/// An instantiable catalog entry.
///
/// `icon` is an identifier the frontend resolves to an asset; the engine
/// treats it as an opaque string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub key: String,
    pub name: String,
    pub icon: String,
    pub kind: ComponentKind,
    pub category: TemplateCategory,
}

/// Registry mapping template keys to their presentation data.
///
/// Pure lookup, no state beyond the entries themselves.
#[derive(Clone, Debug, Default)]
pub struct TemplateCatalog {
    entries: FxHashMap<String, Template>,
}

impl TemplateCatalog {
    /// An empty catalog. Most callers want [`builtin`](Self::builtin).
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock catalog shipped with the dashboard.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (key, name, icon, kind) in [
            ("terminal", "Terminal", "terminal", ComponentKind::Terminal),
            ("jupyter", "Jupyter Notebook", "notebook", ComponentKind::Notebook),
            (
                "model-deploy",
                "Model Endpoint",
                "rocket",
                ComponentKind::ModelDeploy,
            ),
            (
                "metrics-panel",
                "Metrics Panel",
                "chart",
                ComponentKind::MetricsPanel,
            ),
            ("code-editor", "Code Editor", "code", ComponentKind::CodeEditor),
        ] {
            catalog.register(Template {
                key: key.to_string(),
                name: name.to_string(),
                icon: icon.to_string(),
                kind,
                category: TemplateCategory::Official,
            });
        }
        catalog
    }

    /// Add (or replace) an entry. Intended for startup-time extension only;
    /// the catalog is treated as immutable once the engine is running.
    pub fn register(&mut self, template: Template) {
        self.entries.insert(template.key.clone(), template);
    }

    /// Look up an entry by key.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&Template> {
        self.entries.get(key)
    }

    /// Iterate over all registered keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
