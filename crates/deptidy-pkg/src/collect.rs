//! Grouping of member dependency declarations by name.

use crate::manifest::{DependencySpec, Manifest, Section};
use std::collections::BTreeMap;

/// One declaration of a dependency in one manifest section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Index of the manifest in discovery order.
    pub manifest: usize,

    /// Section the declaration lives in.
    pub section: Section,

    /// Dependency name (the key in the section table).
    pub name: String,

    /// The declaration itself.
    pub spec: DependencySpec,
}

/// Occurrences grouped by dependency name.
///
/// Each list is ordered by manifest discovery order, then section order.
pub type Occurrences = BTreeMap<String, Vec<Occurrence>>;

/// Collect the declarations of every member manifest.
///
/// `manifests[0]` is the root and is not scanned. Declarations that already
/// carry `workspace = true` are left out since they are already hoisted.
#[must_use]
pub fn collect(manifests: &[Manifest]) -> Occurrences {
    let mut found = Occurrences::new();

    for (index, manifest) in manifests.iter().enumerate().skip(1) {
        for section in Section::ALL {
            for (name, spec) in manifest.dependencies(section) {
                if spec.is_workspace() {
                    continue;
                }
                found.entry(name.to_string()).or_default().push(Occurrence {
                    manifest: index,
                    section,
                    name: name.to_string(),
                    spec,
                });
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifests(sources: &[&str]) -> Vec<Manifest> {
        sources
            .iter()
            .enumerate()
            .map(|(i, src)| Manifest::parse(format!("m{i}/Cargo.toml"), src).unwrap())
            .collect()
    }

    #[test]
    fn root_is_not_collected() {
        let ms = manifests(&["[dependencies]\nserde = \"1\"\n", "[package]\nname = \"a\"\n"]);
        assert!(collect(&ms).is_empty());
    }

    #[test]
    fn groups_in_discovery_then_section_order() {
        let ms = manifests(&[
            "[workspace]\n",
            "[dev-dependencies]\nserde = \"1.0.1\"\n\n[dependencies]\nserde = \"1.0.0\"\n",
            "[build-dependencies]\nserde = \"1.0.2\"\n",
        ]);

        let found = collect(&ms);
        let serde = &found["serde"];
        let order: Vec<_> = serde.iter().map(|o| (o.manifest, o.section)).collect();
        assert_eq!(
            order,
            vec![
                (1, Section::Dependencies),
                (1, Section::DevDependencies),
                (2, Section::BuildDependencies),
            ]
        );
        assert_eq!(serde[0].spec.version(), Some("1.0.0"));
    }

    #[test]
    fn workspace_references_are_skipped() {
        let ms = manifests(&[
            "[workspace]\n",
            "[dependencies]\nserde = { workspace = true }\nanyhow = \"1\"\n",
        ]);

        let found = collect(&ms);
        assert!(!found.contains_key("serde"));
        assert_eq!(found["anyhow"].len(), 1);
    }

    #[test]
    fn non_dependency_values_are_ignored() {
        let ms = manifests(&["[workspace]\n", "[dependencies]\nweird = 3\nok = \"1\"\n"]);
        let found = collect(&ms);
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["ok"]);
    }
}
