// Resolution of the input/output directories from the CLI or a YAML file.
//
// The YAML layout is
//
//   dirs:
//     nas.url.source: /data/in
//     nas.url.cible: /data/out
//
// and the fully nested form `dirs: nas: url: {source, cible}` is accepted too.

use crate::cli::Args;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ConfigFile {
    dirs: DirsSection,
}

#[derive(Debug, Deserialize)]
struct DirsSection {
    #[serde(rename = "nas.url.source")]
    source: Option<String>,
    #[serde(rename = "nas.url.cible")]
    cible: Option<String>,
    nas: Option<NasSection>,
}

#[derive(Debug, Deserialize)]
struct NasSection {
    url: UrlSection,
}

#[derive(Debug, Deserialize)]
struct UrlSection {
    source: Option<String>,
    cible: Option<String>,
}

/// Input and output directories. Either side may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryPair {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl DirectoryPair {
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Both directories, or `None` if either is missing.
    pub fn resolved(&self) -> Option<(&Path, &Path)> {
        match (&self.input, &self.output) {
            (Some(input), Some(output)) => Some((input.as_path(), output.as_path())),
            _ => None,
        }
    }
}

/// Read the directory pair from a YAML config file.
///
/// A missing or malformed file yields [`DirectoryPair::unresolved`].
pub fn read_config_file(path: &Path) -> DirectoryPair {
    if !path.is_file() {
        tracing::error!("This file does not exist: {:?}", path);
        return DirectoryPair::unresolved();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            return DirectoryPair::unresolved();
        }
    };

    match serde_yaml::from_str::<ConfigFile>(&content) {
        Ok(config) => {
            let dirs = config.dirs;
            let (nested_source, nested_cible) = match dirs.nas {
                Some(nas) => (nas.url.source, nas.url.cible),
                None => (None, None),
            };
            DirectoryPair {
                input: dirs.source.or(nested_source).map(PathBuf::from),
                output: dirs.cible.or(nested_cible).map(PathBuf::from),
            }
        }
        Err(e) => {
            tracing::error!("Failed to load yaml file {:?}: {}", path, e);
            DirectoryPair::unresolved()
        }
    }
}

/// Pick the directories from `--config` if given, otherwise from `-i`/`-o`.
pub fn resolve_directories(args: &Args) -> DirectoryPair {
    match &args.config {
        Some(config) => read_config_file(config),
        None => DirectoryPair {
            input: args.data_in_path.as_deref().map(expand_tilde),
            output: args.data_out_path.as_deref().map(expand_tilde),
        },
    }
}

/// Expand a leading `~` to `$HOME`.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.properties");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_file_is_unresolved() {
        let pair = read_config_file(Path::new("toto.txt"));
        assert_eq!(pair, DirectoryPair::unresolved());
        assert!(pair.resolved().is_none());
    }

    #[test]
    fn test_dotted_keys() {
        let (_dir, path) = write_config(
            "dirs:\n  nas.url.source: /data/in\n  nas.url.cible: /data/out\n",
        );
        let pair = read_config_file(&path);
        assert_eq!(
            pair.resolved(),
            Some((Path::new("/data/in"), Path::new("/data/out")))
        );
    }

    #[test]
    fn test_nested_keys() {
        let (_dir, path) = write_config(
            "dirs:\n  nas:\n    url:\n      source: in\n      cible: out\n",
        );
        let pair = read_config_file(&path);
        assert_eq!(pair.input, Some(PathBuf::from("in")));
        assert_eq!(pair.output, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_malformed_yaml_is_unresolved() {
        let (_dir, path) = write_config("dirs: [unclosed\n");
        assert_eq!(read_config_file(&path), DirectoryPair::unresolved());
    }

    #[test]
    fn test_missing_dirs_section_is_unresolved() {
        let (_dir, path) = write_config("other: 1\n");
        assert_eq!(read_config_file(&path), DirectoryPair::unresolved());
    }

    #[test]
    fn test_partial_pair_is_not_resolved() {
        let (_dir, path) = write_config("dirs:\n  nas.url.source: /data/in\n");
        let pair = read_config_file(&path);
        assert_eq!(pair.input, Some(PathBuf::from("/data/in")));
        assert!(pair.resolved().is_none());
    }

    #[test]
    fn test_config_file_wins_over_cli_dirs() {
        let (_dir, path) = write_config(
            "dirs:\n  nas.url.source: /yaml/in\n  nas.url.cible: /yaml/out\n",
        );
        let args = Args::try_parse_from([
            "blury",
            "-c",
            path.to_str().unwrap(),
            "-i",
            "/cli/in",
            "-o",
            "/cli/out",
        ])
        .unwrap();

        let pair = resolve_directories(&args);
        assert_eq!(
            pair.resolved(),
            Some((Path::new("/yaml/in"), Path::new("/yaml/out")))
        );
    }

    #[test]
    fn test_missing_config_ignores_cli_dirs() {
        let args =
            Args::try_parse_from(["blury", "-c", "missing.yml", "-i", "/in", "-o", "/out"])
                .unwrap();
        assert_eq!(resolve_directories(&args), DirectoryPair::unresolved());
    }

    #[test]
    fn test_cli_dirs_expand_tilde() {
        let Some(home) = std::env::var_os("HOME") else {
            return;
        };
        let args = Args::try_parse_from(["blury", "-i", "~/x", "-o", "/out"]).unwrap();

        let pair = resolve_directories(&args);
        assert_eq!(pair.input, Some(PathBuf::from(&home).join("x")));
        assert_eq!(pair.output, Some(PathBuf::from("/out")));
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("rel"), PathBuf::from("rel"));
        assert_eq!(expand_tilde("~user/x"), PathBuf::from("~user/x"));
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(expand_tilde("~/pics"), PathBuf::from(&home).join("pics"));
            assert_eq!(expand_tilde("~"), PathBuf::from(home));
        }
    }
}
