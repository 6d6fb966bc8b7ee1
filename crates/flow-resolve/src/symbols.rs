//! Project-wide index from simple class name to declaring candidates.

use flow_core::diagnostics::{DiagnosticKind, Diagnostics};
use flow_core::graph::ClassId;
use flow_core::model::FileMetadata;
use std::collections::HashMap;
use std::path::PathBuf;

/// One declaration of a simple name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub package: String,
    pub file: PathBuf,
}

/// Simple class name -> every `(package, file)` that declares it, in
/// discovery order. Duplicates are kept so resolution can see ambiguity.
///
/// Resolving a name by global uniqueness is unsound when two packages use
/// the same simple name and only one of them is in the scanned tree: the
/// scanned one wins even if the source meant the other.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    by_name: HashMap<String, Vec<Candidate>>,
}

impl SymbolIndex {
    /// Build the index over all files. A simple name declared more than once
    /// is reported as [`DiagnosticKind::DuplicateSimpleName`].
    pub fn build(files: &[FileMetadata], diagnostics: &mut Diagnostics) -> Self {
        let mut index = Self::default();
        for file in files {
            for class in file.classes_in_order() {
                let candidate = Candidate {
                    package: file.package_name().to_string(),
                    file: file.path.clone(),
                };
                let entry = index.by_name.entry(class.simple_name.clone()).or_default();
                if let Some(first) = entry.first() {
                    diagnostics.push(
                        DiagnosticKind::DuplicateSimpleName,
                        format!(
                            "{} declared in {} and {}",
                            class.simple_name,
                            first.file.display(),
                            candidate.file.display()
                        ),
                    );
                }
                entry.push(candidate);
            }
        }
        tracing::debug!(names = index.by_name.len(), "symbol index built");
        index
    }

    /// All declarations of `name`, in discovery order.
    pub fn candidates(&self, name: &str) -> &[Candidate] {
        self.by_name.get(name).map_or(&[], Vec::as_slice)
    }

    /// Whether `package` declares a class named `name`.
    pub fn contains(&self, package: &str, name: &str) -> bool {
        self.candidates(name).iter().any(|c| c.package == package)
    }

    /// Distinct qualified identities declared under `name`, in discovery order.
    pub fn identities(&self, name: &str) -> Vec<ClassId> {
        let mut ids: Vec<ClassId> = Vec::new();
        for c in self.candidates(name) {
            let id = ClassId::new(c.package.clone(), name);
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::model::{ClassKind, ClassMetadata};

    fn file(path: &str, package: Option<&str>, classes: &[&str]) -> FileMetadata {
        let mut meta = FileMetadata::new(path);
        meta.package = package.map(String::from);
        for name in classes {
            meta.classes
                .insert((*name).to_string(), ClassMetadata::new(*name, ClassKind::Class));
        }
        meta
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let files = vec![
            file("a/Util.java", Some("com.a"), &["Util"]),
            file("b/Util.java", Some("com.b"), &["Util"]),
            file("Main.java", None, &["Main"]),
        ];
        let mut diags = Diagnostics::new();
        let index = SymbolIndex::build(&files, &mut diags);

        let util = index.candidates("Util");
        assert_eq!(util.len(), 2);
        assert_eq!(util[0].package, "com.a");
        assert_eq!(util[1].package, "com.b");
        assert_eq!(diags.count(DiagnosticKind::DuplicateSimpleName), 1);

        assert!(index.contains("", "Main"));
        assert!(!index.contains("com.a", "Main"));
        assert!(index.candidates("Missing").is_empty());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_identities_collapse_same_package() {
        let files = vec![
            file("x/Foo.java", Some("com.x"), &["Foo"]),
            file("x2/Foo.java", Some("com.x"), &["Foo"]),
        ];
        let index = SymbolIndex::build(&files, &mut Diagnostics::new());
        assert_eq!(index.candidates("Foo").len(), 2);
        assert_eq!(index.identities("Foo"), vec![ClassId::new("com.x", "Foo")]);
    }
}
