// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Discovery of bag files under a data root.
//!
//! Recorded cruises keep their bags in directories named `rosbag`. The
//! walk is pre-order with siblings in lexicographic order, and stops at
//! the first such directory that holds matching files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::{Error, Result};

/// Directory name that holds bag files.
pub const LOG_DIRECTORY_NAME: &str = "rosbag";

/// File extension of bag files.
pub const LOG_EXTENSION: &str = "bag";

/// Outcome of a discovery walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// The first `rosbag` directory with matches, and its sorted matches
    Found {
        directory: PathBuf,
        paths: Vec<PathBuf>,
    },
    /// `rosbag` directories exist but none held a matching file
    NoMatchingFiles { directories: Vec<PathBuf> },
    /// No `rosbag` directory under the root
    NoLogDirectory,
}

impl Discovery {
    /// The discovered paths; empty unless `Found`.
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Discovery::Found { paths, .. } => paths,
            _ => &[],
        }
    }

    /// Consume into the discovered paths.
    pub fn into_paths(self) -> Vec<PathBuf> {
        match self {
            Discovery::Found { paths, .. } => paths,
            _ => Vec::new(),
        }
    }
}

/// Check that `root` is a directory, creating it when `create` is set.
pub fn ensure_directory(root: &Path, create: bool) -> Result<()> {
    if root.is_dir() {
        return Ok(());
    }
    if !create {
        return Err(Error::missing_directory(root));
    }
    fs::create_dir_all(root)?;
    info!(directory = %root.display(), "Created directory");
    Ok(())
}

/// Find the bag files of the first `rosbag` directory under `root`.
///
/// `keyword` is a case-sensitive file name prefix; an empty keyword
/// matches every `.bag` file. The root itself qualifies if it is named
/// `rosbag`.
pub fn find_log_paths(root: &Path, keyword: &str) -> Result<Discovery> {
    ensure_directory(root, false)?;

    let mut searched = Vec::new();
    if let Some((directory, paths)) = walk(root, keyword, &mut searched)? {
        return Ok(Discovery::Found { directory, paths });
    }
    if searched.is_empty() {
        Ok(Discovery::NoLogDirectory)
    } else {
        Ok(Discovery::NoMatchingFiles {
            directories: searched,
        })
    }
}

fn walk(
    dir: &Path,
    keyword: &str,
    searched: &mut Vec<PathBuf>,
) -> Result<Option<(PathBuf, Vec<PathBuf>)>> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();
        if file_type.is_dir() {
            subdirs.push(path);
        } else if file_type.is_symlink() && path.is_dir() {
            // Linked directories are never descended into.
            continue;
        } else {
            files.push(path);
        }
    }

    if dir.file_name().is_some_and(|name| name == LOG_DIRECTORY_NAME) {
        info!(directory = %dir.display(), "Found 'rosbag' folder");
        let mut matched: Vec<PathBuf> = files
            .into_iter()
            .filter(|path| is_match(path, keyword))
            .collect();
        info!(keyword, matched = matched.len(), "Keyword matched files");
        searched.push(dir.to_path_buf());

        if !matched.is_empty() {
            matched.sort();
            return Ok(Some((dir.to_path_buf(), matched)));
        }
    }

    subdirs.sort();
    for subdir in subdirs {
        if let Some(found) = walk(&subdir, keyword, searched)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

fn is_match(path: &Path, keyword: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.extension().is_some_and(|ext| ext == LOG_EXTENSION) && name.starts_with(keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::temp_dir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_sorted_matches_with_keyword() {
        let (root, _guard) = temp_dir("discovery_keyword");
        touch(&root, "cruise/rosbag/sensors_2.bag");
        touch(&root, "cruise/rosbag/sensors_1.bag");
        touch(&root, "cruise/rosbag/nav_1.bag");
        touch(&root, "cruise/rosbag/sensors_3.txt");

        let discovery = find_log_paths(&root, "sensors").unwrap();
        let names: Vec<_> = discovery
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["sensors_1.bag", "sensors_2.bag"]);
        assert!(matches!(discovery, Discovery::Found { ref directory, .. }
            if directory.ends_with("cruise/rosbag")));
    }

    #[test]
    fn test_empty_keyword_matches_all_bags() {
        let (root, _guard) = temp_dir("discovery_empty_keyword");
        touch(&root, "rosbag/b.bag");
        touch(&root, "rosbag/a.bag");
        touch(&root, "rosbag/notes.md");

        let paths = find_log_paths(&root.join("rosbag"), "").unwrap().into_paths();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.bag"));
    }

    #[test]
    fn test_first_directory_with_matches_wins() {
        let (root, _guard) = temp_dir("discovery_first_wins");
        touch(&root, "a/rosbag/other.bag");
        touch(&root, "b/rosbag/sensors.bag");
        touch(&root, "c/rosbag/sensors.bag");

        let discovery = find_log_paths(&root, "sensors").unwrap();
        let paths = discovery.paths();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].starts_with(root.join("b")));
    }

    #[test]
    fn test_case_sensitive_keyword() {
        let (root, _guard) = temp_dir("discovery_case");
        touch(&root, "rosbag/Sensors.bag");

        let discovery = find_log_paths(&root, "sensors").unwrap();
        assert_eq!(
            discovery,
            Discovery::NoMatchingFiles {
                directories: vec![root.join("rosbag")]
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_not_followed() {
        let (root, _guard) = temp_dir("discovery_loop");
        fs::create_dir_all(root.join("a")).unwrap();
        std::os::unix::fs::symlink(&root, root.join("a").join("loop")).unwrap();
        touch(&root, "z/rosbag/sensors_1.bag");

        let paths = find_log_paths(&root, "").unwrap().into_paths();
        assert_eq!(paths, vec![root.join("z").join("rosbag").join("sensors_1.bag")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_linked_directory_outside_root_ignored() {
        let (root, _guard) = temp_dir("discovery_link_root");
        let (outside, _outside_guard) = temp_dir("discovery_link_target");
        touch(&outside, "rosbag/elsewhere.bag");
        std::os::unix::fs::symlink(&outside, root.join("a_link")).unwrap();
        touch(&root, "b/rosbag/here.bag");

        let paths = find_log_paths(&root, "").unwrap().into_paths();
        assert_eq!(paths, vec![root.join("b").join("rosbag").join("here.bag")]);
    }

    #[test]
    fn test_no_log_directory() {
        let (root, _guard) = temp_dir("discovery_none");
        touch(&root, "bags/sensors.bag");
        assert_eq!(find_log_paths(&root, "").unwrap(), Discovery::NoLogDirectory);
    }

    #[test]
    fn test_missing_root() {
        let result = find_log_paths(Path::new("/nonexistent/bagzarr/data"), "");
        assert!(matches!(result, Err(Error::MissingDirectory { .. })));
    }

    #[test]
    fn test_ensure_directory_creates() {
        let (root, _guard) = temp_dir("discovery_ensure");
        let nested = root.join("x/y");
        assert!(ensure_directory(&nested, false).is_err());
        ensure_directory(&nested, true).unwrap();
        assert!(nested.is_dir());
    }
}
