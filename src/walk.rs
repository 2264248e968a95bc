use crate::errors::Result;
use crate::parse::common::{is_go_test_file, ImportTable};
use crate::parse::{GoFile, GoParser};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Include pattern used when none is configured.
pub const DEFAULT_INCLUDE: &str = "**/*.go";

/// Decides which files under the project root are scanned.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: GlobSet,
    exclude: GlobSet,
    include_tests: bool,
}

impl FileFilter {
    /// - Applies include/exclude glob patterns to the root-relative path
    /// - Excludes `*_test.go` unless `include_tests` is set
    pub fn new(
        include_patterns: &[String],
        exclude_patterns: &[String],
        include_tests: bool,
    ) -> Result<Self> {
        let mut include_builder = GlobSetBuilder::new();
        if include_patterns.is_empty() {
            include_builder.add(Glob::new(DEFAULT_INCLUDE)?);
        }
        for pattern in include_patterns {
            include_builder.add(Glob::new(pattern)?);
        }

        let mut exclude_builder = GlobSetBuilder::new();
        for pattern in exclude_patterns {
            exclude_builder.add(Glob::new(pattern)?);
        }

        Ok(Self {
            include: include_builder.build()?,
            exclude: exclude_builder.build()?,
            include_tests,
        })
    }

    pub fn matches(&self, relative: &Path) -> bool {
        let is_go = relative.extension().and_then(|e| e.to_str()) == Some("go");
        if !is_go {
            return false;
        }
        if !self.include_tests && is_go_test_file(relative) {
            return false;
        }
        if self.exclude.is_match(relative) {
            return false;
        }
        self.include.is_match(relative)
    }
}

/// One parsed project file.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub package_path: String,
    pub file_name: String,
    pub file: GoFile,
    pub imports: ImportTable,
}

/// Lazily walks a Go project and parses every matching file.
///
/// Directories are visited depth-first in lexical order. The scanner is a
/// one-shot iterator; a parse failure is yielded as an error item.
pub struct SourceScanner {
    root: PathBuf,
    module: String,
    filter: FileFilter,
    walker: walkdir::FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>,
    parser: GoParser,
}

impl SourceScanner {
    pub fn new(root: &Path, module: &str, filter: FileFilter) -> Result<Self> {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(is_visible as fn(&DirEntry) -> bool);

        Ok(Self {
            root: root.to_path_buf(),
            module: module.to_string(),
            filter,
            walker,
            parser: GoParser::new()?,
        })
    }

    fn scan(&mut self, path: &Path, relative: &Path) -> Result<ScannedFile> {
        let file = self.parser.parse_file(path)?;
        let package_path = package_path(&self.module, relative.parent().unwrap_or(Path::new("")));
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let imports = ImportTable::from_specs(&file.imports);

        tracing::debug!(
            file = %relative.display(),
            package = %package_path,
            types = file.types.len(),
            funcs = file.funcs.len(),
            "parsed source file"
        );

        Ok(ScannedFile {
            package_path,
            file_name,
            file,
            imports,
        })
    }
}

impl Iterator for SourceScanner {
    type Item = Result<ScannedFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if !self.filter.matches(relative) {
                continue;
            }
            return Some(self.scan(path, relative));
        }
    }
}

/// Go tooling ignores `vendor`, `testdata` and names starting with `.` or `_`.
fn is_visible(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') || name.starts_with('_') {
        return false;
    }
    !(entry.file_type().is_dir() && (name == "vendor" || name == "testdata"))
}

/// Join the module path with a root-relative package directory.
pub fn package_path(module: &str, relative_dir: &Path) -> String {
    let mut path = module.trim_end_matches('/').to_string();
    for component in relative_dir.components() {
        if let Component::Normal(part) = component {
            path.push('/');
            path.push_str(&part.to_string_lossy());
        }
    }
    path
}

/// Map a package path back to its directory, if it lives under `module`.
pub fn package_dir(root: &Path, module: &str, package: &str) -> Option<PathBuf> {
    let module = module.trim_end_matches('/');
    if package == module {
        return Some(root.to_path_buf());
    }
    let relative = package.strip_prefix(module)?.strip_prefix('/')?;
    Some(relative.split('/').fold(root.to_path_buf(), |dir, part| dir.join(part)))
}

/// Go files directly inside one package directory, sorted by name.
pub fn package_files(dir: &Path, include_tests: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_visible(&entry) {
            continue;
        }
        let path = entry.path();
        let is_go = path.extension().and_then(|e| e.to_str()) == Some("go");
        if !is_go || (!include_tests && is_go_test_file(path)) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    Ok(files)
}
