//! [`TestBranch`] builder for resource-loading scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary local repository root holding one branch working tree at
/// `<root>/<branch>`.
///
/// # Example
///
/// ```rust,no_run
/// use infra_test_utils::{TestBranch, resource_yaml};
///
/// let branch = TestBranch::new("master");
/// branch.write("boxes/codec.yml", &resource_yaml("Th2Box", "codec", "image-name: codec"));
/// branch.assert_file_exists("boxes/codec.yml");
/// ```
pub struct TestBranch {
    temp_dir: TempDir,
    name: String,
}

impl TestBranch {
    /// Create a temporary root with an empty `<branch>` directory.
    pub fn new(name: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(name)).unwrap();
        Self {
            temp_dir,
            name: name.to_string(),
        }
    }

    /// The local repository root (parent of every branch tree).
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Branch name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<root>/<branch>`
    pub fn branch_root(&self) -> PathBuf {
        self.root().join(&self.name)
    }

    /// Write `content` to `path` relative to the branch root, creating
    /// parent directories.
    pub fn write(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.branch_root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        full_path
    }

    /// Read a file relative to the branch root.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, path: &str) -> String {
        let full_path = self.branch_root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Assert that `path` (relative to the branch root) exists.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.branch_root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the branch root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.branch_root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}

/// Render a minimal resource document.
///
/// `spec` is inserted verbatim under `spec:`, one level deep; pass an
/// empty string to omit the payload.
pub fn resource_yaml(kind: &str, name: &str, spec: &str) -> String {
    let mut doc = format!(
        "apiVersion: th2.exactpro.com/v1\nkind: {kind}\nmetadata:\n  name: {name}\n"
    );
    if !spec.is_empty() {
        doc.push_str("spec:\n");
        for line in spec.lines() {
            doc.push_str("  ");
            doc.push_str(line);
            doc.push('\n');
        }
    }
    doc
}
