//! Run options.
//!
//! | Option | Default | Source |
//! |--------|---------|--------|
//! | `tab_width` | 4 | `-t SIZE` |
//! | `indent_mode` | off | `-i` |
//! | `mode.head` | off | `-h`, or a CGI `HEAD` request |
//! | `mode.pedantic` | off | `-p` |
//! | `mode.silent` | off | `-s` (wins over `-p`) |
//! | `search_path` | empty | `-I DIR`, then `VISION_PATH` |
//! | `max_import_depth` | 64 | |
//! | `max_call_depth` | 256 | |

use std::env;
use std::path::PathBuf;

/// Environment variable holding extra module directories.
pub const PATH_VAR: &str = "VISION_PATH";

/// How warnings and output are treated during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    /// Emit only the header buffer.
    pub head: bool,
    /// Suppress warnings.
    pub silent: bool,
    /// Turn `warn` into a fatal error.
    pub pedantic: bool,
}

impl RunMode {
    /// Silent mode overrides pedantic mode.
    pub fn normalized(mut self) -> Self {
        if self.silent {
            self.pedantic = false;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub tab_width: usize,
    /// Indentation is equivalent to braces.
    pub indent_mode: bool,
    pub mode: RunMode,
    /// Directories searched by `use` after the name as given.
    pub search_path: Vec<PathBuf>,
    pub max_import_depth: usize,
    /// Template calls allowed to be in progress at once.
    pub max_call_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            tab_width: 4,
            indent_mode: false,
            mode: RunMode::default(),
            search_path: Vec::new(),
            max_import_depth: 64,
            max_call_depth: 256,
        }
    }
}

impl Options {
    /// Append the directories listed in `VISION_PATH`.
    pub fn with_env(mut self) -> Self {
        if let Some(paths) = env::var_os(PATH_VAR) {
            self.extend_search_path(&paths);
        }
        self
    }

    fn extend_search_path(&mut self, paths: &std::ffi::OsStr) {
        self.search_path
            .extend(env::split_paths(paths).filter(|p| !p.as_os_str().is_empty()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = Options::default();
        assert_eq!(o.tab_width, 4);
        assert!(!o.indent_mode);
        assert_eq!(o.max_import_depth, 64);
        assert_eq!(o.max_call_depth, 256);
        assert!(o.search_path.is_empty());
    }

    #[test]
    fn silent_wins_over_pedantic() {
        let mode = RunMode { head: false, silent: true, pedantic: true }.normalized();
        assert!(mode.silent);
        assert!(!mode.pedantic);
    }

    #[test]
    fn search_path_appends_in_order() {
        let mut o = Options { search_path: vec![PathBuf::from("first")], ..Options::default() };
        let joined = env::join_paths(["a", "", "b"]).unwrap();
        o.extend_search_path(&joined);
        assert_eq!(
            o.search_path,
            vec![PathBuf::from("first"), PathBuf::from("a"), PathBuf::from("b")]
        );
    }
}
