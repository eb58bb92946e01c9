//! Directory walker.
//!
//! # Responsibilities
//! - Enumerate the routes root depth-first
//! - Yield every leaf file as a candidate, in a stable order
//! - Turn unreadable, cyclic or too-deep subtrees into rejected items
//!
//! # Design Decisions
//! - Entries are sorted by file name so two walks of an unchanged tree agree
//! - Hidden entries (leading '.') are not candidates
//! - Symlinks are followed; a directory whose canonical path is already on
//!   the recursion stack is a cycle

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("symlink cycle back to {}", .0.display())]
    Cycle(PathBuf),

    #[error("nesting deeper than {max} directories")]
    TooDeep { max: usize },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file to hand to the descriptor loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath {
    pub path: PathBuf,
    /// Path relative to the root, '/'-separated. Used in the report.
    pub label: String,
    /// Sub-directory the file was found in. Informational only.
    pub namespace: String,
}

#[derive(Debug)]
pub enum WalkItem {
    Candidate(CandidatePath),
    Rejected { label: String, error: WalkError },
}

#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    max_depth: usize,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>, max_depth: usize) -> Self {
        Self {
            root: root.into(),
            max_depth,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the whole tree. Never fails; problems become rejected items.
    pub fn walk(&self) -> Vec<WalkItem> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        self.visit(&self.root, 0, &mut stack, &mut out);
        out
    }

    fn visit(&self, dir: &Path, depth: usize, stack: &mut Vec<PathBuf>, out: &mut Vec<WalkItem>) {
        let label = self.label(dir);

        if depth > self.max_depth {
            out.push(WalkItem::Rejected {
                label,
                error: WalkError::TooDeep { max: self.max_depth },
            });
            return;
        }

        let canonical = match fs::canonicalize(dir) {
            Ok(p) => p,
            Err(source) => {
                out.push(WalkItem::Rejected {
                    label,
                    error: WalkError::Io {
                        path: dir.to_path_buf(),
                        source,
                    },
                });
                return;
            }
        };
        if stack.contains(&canonical) {
            out.push(WalkItem::Rejected {
                label,
                error: WalkError::Cycle(canonical),
            });
            return;
        }

        let mut entries = match fs::read_dir(dir).and_then(|rd| rd.collect::<Result<Vec<_>, _>>()) {
            Ok(entries) => entries,
            Err(source) => {
                out.push(WalkItem::Rejected {
                    label,
                    error: WalkError::Io {
                        path: dir.to_path_buf(),
                        source,
                    },
                });
                return;
            }
        };
        entries.sort_by_key(|e| e.file_name());

        stack.push(canonical);
        for entry in entries {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();

            // fs::metadata follows symlinks
            let metadata = match fs::metadata(&path) {
                Ok(m) => m,
                Err(source) => {
                    out.push(WalkItem::Rejected {
                        label: self.label(&path),
                        error: WalkError::Io { path, source },
                    });
                    continue;
                }
            };

            if metadata.is_dir() {
                self.visit(&path, depth + 1, stack, out);
            } else if metadata.is_file() {
                let namespace = self.label(dir);
                out.push(WalkItem::Candidate(CandidatePath {
                    label: self.label(&path),
                    namespace,
                    path,
                }));
            }
        }
        stack.pop();
    }

    fn label(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            ".".to_string()
        } else {
            parts.join("/")
        }
    }
}
