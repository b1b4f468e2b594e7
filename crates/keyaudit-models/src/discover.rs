use std::path::{Component, Path, PathBuf};

use keyaudit_core::{Diagnostic, Error, Result};

use crate::decode::{ManifestDecoder, ModelDecoder};
use crate::files::{FileLister, FsLister};
use crate::manifest::RelationDecl;

/// Separator between namespace segments of a canonical model name.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// A concrete model found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: String,
    pub path: PathBuf,
    pub table: Option<String>,
    pub relations: Vec<RelationDecl>,
}

impl ModelDescriptor {
    /// Last namespace segment, e.g. `Invoice` for `Billing::Invoice`.
    pub fn short_name(&self) -> &str {
        self.name
            .rsplit(NAMESPACE_SEPARATOR)
            .next()
            .unwrap_or(&self.name)
    }
}

/// Result of a discovery pass.
#[derive(Debug, Default)]
pub struct Discovery {
    pub models: Vec<ModelDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Walks the model root and keeps files that decode to concrete entities.
pub struct Discoverer<L = FsLister, D = ManifestDecoder> {
    model_root: PathBuf,
    dir: Option<PathBuf>,
    lister: L,
    decoder: D,
}

impl Discoverer {
    pub fn new(model_root: impl Into<PathBuf>) -> Self {
        Self::with_parts(model_root, FsLister, ManifestDecoder)
    }
}

impl<L: FileLister, D: ModelDecoder> Discoverer<L, D> {
    pub fn with_parts(model_root: impl Into<PathBuf>, lister: L, decoder: D) -> Self {
        Self {
            model_root: model_root.into(),
            dir: None,
            lister,
            decoder,
        }
    }

    /// Only scan `model_root/dir`. Names stay relative to the model root.
    pub fn restrict_to(mut self, dir: Option<PathBuf>) -> Self {
        self.dir = dir;
        self
    }

    pub fn scan_root(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => self.model_root.join(dir),
            None => self.model_root.clone(),
        }
    }

    /// Discover every concrete model below the scan root.
    ///
    /// A missing scan root is a configuration error; anything wrong with an
    /// individual file becomes a diagnostic and the file is skipped.
    pub fn discover(&self) -> Result<Discovery> {
        let scan_root = self.scan_root();
        if !scan_root.is_dir() {
            return Err(Error::Configuration(format!(
                "{} does not exist",
                scan_root.display()
            )));
        }

        let listing = self.lister.list_files(&scan_root)?;
        tracing::debug!(
            event = "files_listed",
            root = %scan_root.display(),
            files = listing.files.len(),
            unreadable = listing.unreadable.len()
        );

        let mut discovery = Discovery::default();
        for (path, err) in listing.unreadable {
            tracing::debug!(event = "path_unreadable", path = %path.display(), error = %err);
            discovery.diagnostics.push(Diagnostic::Discovery {
                path: path.display().to_string(),
                reason: format!("cannot be read: {err}"),
            });
        }
        for path in listing.files {
            match self.inspect_file(&path) {
                Ok(model) => discovery.models.push(model),
                Err(reason) => {
                    tracing::debug!(event = "file_skipped", path = %path.display(), reason = %reason);
                    discovery.diagnostics.push(Diagnostic::Discovery {
                        path: path.display().to_string(),
                        reason,
                    });
                }
            }
        }

        Ok(discovery)
    }

    fn inspect_file(&self, path: &Path) -> std::result::Result<ModelDescriptor, String> {
        let name = canonical_name(&self.model_root, path)
            .ok_or_else(|| "cannot derive a model name from the path".to_string())?;
        let manifest = self
            .decoder
            .decode(&name, path)
            .map_err(|err| err.to_string())?;

        if !manifest.entity {
            return Err(format!("{name} is not a persistent entity"));
        }
        if manifest.is_abstract {
            return Err(format!("{name} is abstract"));
        }

        Ok(ModelDescriptor {
            name,
            path: path.to_path_buf(),
            table: manifest.table,
            relations: manifest.relations,
        })
    }
}

/// Derive `Billing::Invoice` from `<root>/Billing/Invoice.toml`.
pub fn canonical_name(model_root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(model_root).ok()?;
    let mut segments = Vec::new();
    let mut components = relative.components().peekable();

    while let Some(component) = components.next() {
        let Component::Normal(segment) = component else {
            return None;
        };
        let segment = if components.peek().is_none() {
            Path::new(segment).file_stem()?.to_str()?
        } else {
            segment.to_str()?
        };
        if segment.is_empty() {
            return None;
        }
        segments.push(segment);
    }

    if segments.is_empty() {
        return None;
    }
    Some(segments.join(NAMESPACE_SEPARATOR))
}
