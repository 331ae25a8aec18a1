//! On-disk module fixtures.

use std::fs;
use std::path::{Path, PathBuf};

/// Builder for a module directory with one source file per package.
///
/// ```rust,ignore
/// ModuleFixture::new(dir, "example.com/mod")
///     .package("b", "b", &["fmt"])
///     .write();
/// ```
#[derive(Debug, Clone)]
pub struct ModuleFixture {
    root: PathBuf,
    module_path: String,
    packages: Vec<(String, String, Vec<String>)>,
}

impl ModuleFixture {
    pub fn new(root: impl AsRef<Path>, module_path: &str) -> Self {
        ModuleFixture {
            root: root.as_ref().to_path_buf(),
            module_path: module_path.to_string(),
            packages: Vec::new(),
        }
    }

    /// Add a package in `rel_dir` ("" for the module root).
    pub fn package(mut self, rel_dir: &str, name: &str, imports: &[&str]) -> Self {
        self.packages.push((
            rel_dir.to_string(),
            name.to_string(),
            imports.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Write `go.mod` and `<name>.go` for each package.
    pub fn write(self) -> PathBuf {
        fs::create_dir_all(&self.root).unwrap();
        fs::write(
            self.root.join("go.mod"),
            format!("module {}\n\ngo 1.21\n", self.module_path),
        )
        .unwrap();

        for (rel_dir, name, imports) in &self.packages {
            let dir = self.root.join(rel_dir);
            fs::create_dir_all(&dir).unwrap();
            let mut source = format!("package {}\n", name);
            for import in imports {
                source.push_str(&format!("\nimport _ {:?}\n", import));
            }
            fs::write(dir.join(format!("{}.go", name)), source).unwrap();
        }

        self.root
    }
}
