//! Format-preserving `Cargo.toml` model.
//!
//! Manifests are held as [`toml_edit::DocumentMut`] trees so that comments,
//! key order and fields deptidy does not understand survive a
//! read/mutate/write cycle untouched.

use crate::backup::BackupManager;
use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use toml_edit::{value, DocumentMut, InlineTable, Item, Table, TableLike, Value};

/// The manifest filename.
pub const MANIFEST_FILE: &str = "Cargo.toml";

/// Top-level key of the workspace table in the root manifest.
pub const WORKSPACE_KEY: &str = "workspace";

/// Key of the shared dependency table inside `[workspace]`.
pub const SHARED_DEPENDENCIES_KEY: &str = "dependencies";

/// Key of the member path list inside `[workspace]`.
pub const MEMBERS_KEY: &str = "members";

const VERSION_KEY: &str = "version";
const PATH_KEY: &str = "path";

/// A dependency section of a package manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    /// Regular runtime dependencies.
    Dependencies,
    /// Development-only dependencies.
    DevDependencies,
    /// Build-time dependencies.
    BuildDependencies,
}

impl Section {
    /// All sections, in scan order.
    pub const ALL: [Self; 3] = [
        Self::Dependencies,
        Self::DevDependencies,
        Self::BuildDependencies,
    ];

    /// The table name of this section.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies",
            Self::DevDependencies => "dev-dependencies",
            Self::BuildDependencies => "build-dependencies",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A read-only view of one dependency declaration.
///
/// Can be either a simple version string or a detailed table. Only the
/// fields that drive hoisting are extracted; every other field stays in the
/// document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencySpec {
    /// Simple version string: `serde = "1.0"`.
    Simple(String),

    /// Detailed table: `serde = { version = "1.0", features = ["derive"] }`.
    Detailed(DetailedSpec),
}

/// The hoisting-relevant fields of a detailed dependency table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailedSpec {
    /// Version requirement.
    pub version: Option<String>,

    /// Path to a local dependency.
    pub path: Option<String>,

    /// Whether the version is inherited from `[workspace.dependencies]`.
    pub workspace: bool,
}

impl DependencySpec {
    /// Read a declaration from a manifest item.
    ///
    /// Returns `None` for items that are neither a string nor a table.
    #[must_use]
    pub fn from_item(item: &Item) -> Option<Self> {
        if let Some(version) = item.as_str() {
            return Some(Self::Simple(version.to_string()));
        }

        let table = item.as_table_like()?;
        Some(Self::Detailed(DetailedSpec {
            version: table
                .get(VERSION_KEY)
                .and_then(Item::as_str)
                .map(str::to_string),
            path: table.get(PATH_KEY).and_then(Item::as_str).map(str::to_string),
            workspace: table
                .get(WORKSPACE_KEY)
                .and_then(Item::as_bool)
                .unwrap_or(false),
        }))
    }

    /// Returns the version requirement string if specified.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Simple(v) => Some(v),
            Self::Detailed(d) => d.version.as_deref(),
        }
    }

    /// Returns true if this is a path dependency, with or without a version.
    ///
    /// Cargo ignores `path` next to `workspace = true`, so these are never hoisted.
    #[must_use]
    pub fn is_path(&self) -> bool {
        matches!(self, Self::Detailed(d) if d.path.is_some())
    }

    /// Returns true if the declaration already inherits from the workspace.
    #[must_use]
    pub fn is_workspace(&self) -> bool {
        matches!(self, Self::Detailed(d) if d.workspace)
    }
}

/// One `Cargo.toml` file and its parsed document.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    doc: DocumentMut,
}

impl Manifest {
    /// Load a manifest from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(Error::io(path))?;
        Self::parse(path, &content)
    }

    /// Parse a manifest from a TOML string, remembering where it lives.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedManifest`] if the TOML is invalid.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        match content.parse::<DocumentMut>() {
            Ok(doc) => Ok(Self { path, doc }),
            Err(source) => Err(Error::MalformedManifest { path, source }),
        }
    }

    /// Path of the manifest file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying document.
    #[must_use]
    pub fn document(&self) -> &DocumentMut {
        &self.doc
    }

    /// Mutable access to the underlying document.
    pub fn document_mut(&mut self) -> &mut DocumentMut {
        &mut self.doc
    }

    /// Serialize the manifest, preserving the original formatting.
    #[must_use]
    pub fn to_toml_string(&self) -> String {
        self.doc.to_string()
    }

    /// Write the manifest back to its path, taking a backup first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup or the write fails.
    pub fn save(&self, backups: &mut BackupManager) -> Result<()> {
        backups.write(&self.path, &self.to_toml_string())
    }

    /// The table of a dependency section, if present.
    #[must_use]
    pub fn section(&self, section: Section) -> Option<&dyn TableLike> {
        self.doc.get(section.key())?.as_table_like()
    }

    /// Mutable table of a dependency section, if present.
    pub fn section_mut(&mut self, section: Section) -> Option<&mut dyn TableLike> {
        self.doc.get_mut(section.key())?.as_table_like_mut()
    }

    /// All declarations of a section in document order.
    pub fn dependencies(
        &self,
        section: Section,
    ) -> impl Iterator<Item = (&str, DependencySpec)> + '_ {
        self.section(section)
            .into_iter()
            .flat_map(|table| table.iter())
            .filter_map(|(name, item)| DependencySpec::from_item(item).map(|spec| (name, spec)))
    }

    /// The `[workspace.dependencies]` table, if present.
    #[must_use]
    pub fn shared_dependencies(&self) -> Option<&dyn TableLike> {
        self.doc
            .get(WORKSPACE_KEY)?
            .as_table_like()?
            .get(SHARED_DEPENDENCIES_KEY)?
            .as_table_like()
    }

    /// Get `[workspace.dependencies]`, creating it (and `[workspace]`) if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedShape`] if either key exists but is not a table.
    pub fn ensure_shared_dependencies(&mut self) -> Result<&mut dyn TableLike> {
        let path = &self.path;

        let workspace = self.doc.entry(WORKSPACE_KEY).or_insert_with(|| {
            let mut table = Table::new();
            table.set_implicit(true);
            Item::Table(table)
        });
        let workspace = workspace
            .as_table_like_mut()
            .ok_or_else(|| Error::shape(path, "`workspace` is not a table"))?;

        workspace
            .entry(SHARED_DEPENDENCIES_KEY)
            .or_insert(Item::Table(Table::new()))
            .as_table_like_mut()
            .ok_or_else(|| Error::shape(path, "`workspace.dependencies` is not a table"))
    }

    /// Rewrite one declaration to inherit its version from the workspace.
    ///
    /// A version string becomes `{ workspace = true }`. A table loses its
    /// `version` key and gains `workspace = true`; every other field keeps its
    /// position and comments. Returns `false` if the declaration does not exist.
    pub fn make_workspace_reference(&mut self, section: Section, name: &str) -> bool {
        let Some(item) = self.section_mut(section).and_then(|t| t.get_mut(name)) else {
            return false;
        };

        if let Some(simple) = item.as_value_mut().filter(|v| v.is_str()) {
            let decor = simple.decor().clone();
            let mut table = InlineTable::new();
            table.insert(WORKSPACE_KEY, true.into());
            let mut replacement = Value::InlineTable(table);
            *replacement.decor_mut() = decor;
            *simple = replacement;
            return true;
        }

        match item {
            Item::Value(Value::InlineTable(table)) => {
                table.remove(VERSION_KEY);
                table.insert(WORKSPACE_KEY, true.into());
                table.fmt();
                true
            }
            Item::Table(table) => {
                table.remove(VERSION_KEY);
                table.insert(WORKSPACE_KEY, value(true));
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(toml: &str) -> Manifest {
        Manifest::parse("Cargo.toml", toml).unwrap()
    }

    #[test]
    fn parse_dependency_specs() {
        let m = manifest(
            r#"
[package]
name = "app"

[dependencies]
serde = "1.0"
tokio = { version = "1", features = ["rt"] }
local = { path = "../local" }
shared = { workspace = true }
"#,
        );

        let deps: Vec<_> = m.dependencies(Section::Dependencies).collect();
        assert_eq!(deps.len(), 4);
        assert_eq!(deps[0], ("serde", DependencySpec::Simple("1.0".into())));
        assert_eq!(deps[1].1.version(), Some("1"));
        assert!(deps[2].1.is_path());
        assert!(deps[3].1.is_workspace());
    }

    #[test]
    fn path_with_version_is_still_a_path_dependency() {
        let m = manifest("[dependencies]\nlib = { path = \"../lib\", version = \"0.2\" }\n");
        let (_, spec) = m.dependencies(Section::Dependencies).next().unwrap();
        assert!(spec.is_path());
        assert_eq!(spec.version(), Some("0.2"));
    }

    #[test]
    fn malformed_manifest_is_rejected() {
        let err = Manifest::parse("Cargo.toml", "[dependencies\nserde = ").unwrap_err();
        assert!(matches!(err, Error::MalformedManifest { .. }));
    }

    #[test]
    fn simple_dependency_becomes_workspace_reference() {
        let mut m = manifest("[dependencies]\nserde = \"1.0\" # pinned\n");
        assert!(m.make_workspace_reference(Section::Dependencies, "serde"));
        let text = m.to_toml_string();
        assert!(text.contains("serde = { workspace = true }"));
        assert!(text.contains("# pinned"));
    }

    #[test]
    fn inline_dependency_keeps_other_fields() {
        let mut m = manifest(
            "[dev-dependencies]\ntokio = { version = \"1\", features = [\"rt\"], optional = true }\n",
        );
        assert!(m.make_workspace_reference(Section::DevDependencies, "tokio"));

        let (_, spec) = m.dependencies(Section::DevDependencies).next().unwrap();
        assert!(spec.is_workspace());
        assert_eq!(spec.version(), None);

        let table = m.section(Section::DevDependencies).unwrap();
        let tokio = table.get("tokio").unwrap().as_table_like().unwrap();
        assert_eq!(tokio.get("optional").and_then(Item::as_bool), Some(true));
        assert!(tokio.get("features").is_some());
        let keys: Vec<_> = tokio.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["features", "optional", "workspace"]);
    }

    #[test]
    fn standard_table_dependency_is_rewritten() {
        let mut m = manifest(
            "[build-dependencies.cc]\nversion = \"1.0\"\ndefault-features = false\n",
        );
        assert!(m.make_workspace_reference(Section::BuildDependencies, "cc"));

        let text = m.to_toml_string();
        assert!(text.contains("workspace = true"));
        assert!(text.contains("default-features = false"));
        assert!(!text.contains("version"));
    }

    #[test]
    fn standard_table_keeps_comments() {
        let mut m = manifest(
            "[dependencies.cc]\nversion = \"1.0\"\n# static linking only\ndefault-features = false\n",
        );
        assert!(m.make_workspace_reference(Section::Dependencies, "cc"));

        let text = m.to_toml_string();
        assert!(text.contains("# static linking only\ndefault-features = false\n"));
        assert!(text.contains("workspace = true"));
        assert!(!text.contains("version"));
    }

    #[test]
    fn missing_dependency_is_not_rewritten() {
        let mut m = manifest("[dependencies]\nserde = \"1.0\"\n");
        assert!(!m.make_workspace_reference(Section::Dependencies, "tokio"));
        assert!(!m.make_workspace_reference(Section::DevDependencies, "serde"));
    }

    #[test]
    fn shared_table_is_created_on_demand() {
        let mut m = manifest("[package]\nname = \"root\"\n");
        assert!(m.shared_dependencies().is_none());

        m.ensure_shared_dependencies()
            .unwrap()
            .insert("serde", toml_edit::value("1.0"));

        let shared = m.shared_dependencies().unwrap();
        assert_eq!(shared.get("serde").and_then(Item::as_str), Some("1.0"));
        assert!(m.to_toml_string().contains("[workspace.dependencies]"));
    }

    #[test]
    fn existing_shared_table_is_reused() {
        let mut m = manifest(
            "[workspace]\nmembers = []\n\n[workspace.dependencies]\nanyhow = \"1\"\n",
        );
        let shared = m.ensure_shared_dependencies().unwrap();
        assert!(shared.contains_key("anyhow"));
    }

    #[test]
    fn non_table_workspace_is_unexpected_shape() {
        let mut m = manifest("workspace = \"yes\"\n");
        let err = m.ensure_shared_dependencies().err().unwrap();
        assert!(matches!(err, Error::UnexpectedShape { .. }));
    }

    #[test]
    fn section_names() {
        assert_eq!(Section::DevDependencies.to_string(), "dev-dependencies");
        assert_eq!(Section::ALL[0], Section::Dependencies);
    }
}
