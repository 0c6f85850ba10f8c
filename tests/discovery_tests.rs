// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Log discovery tests against real directory trees.

mod common;

use std::fs;
use std::path::Path;

use bagzarr::io::{ensure_directory, find_log_paths, Discovery};
use bagzarr::Error;

use common::temp_dir;

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

#[test]
fn test_sorted_matches_with_keyword() {
    let (root, _guard) = temp_dir("discovery_keyword");
    let logs = root.join("cruise").join("rosbag");
    touch(&logs.join("dive_003.bag"));
    touch(&logs.join("dive_001.bag"));
    touch(&logs.join("dive_002.bag"));
    touch(&logs.join("test_001.bag"));
    touch(&logs.join("dive_004.bag.active"));
    touch(&logs.join("dive_notes.txt"));

    let discovery = find_log_paths(&root, "dive").unwrap();
    let names: Vec<_> = discovery
        .paths()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["dive_001.bag", "dive_002.bag", "dive_003.bag"]);
    assert!(matches!(discovery, Discovery::Found { ref directory, .. } if *directory == logs));
}

#[test]
fn test_empty_keyword_matches_all_bags() {
    let (root, _guard) = temp_dir("discovery_all");
    let logs = root.join("rosbag");
    touch(&logs.join("b.bag"));
    touch(&logs.join("a.bag"));
    touch(&logs.join("a.txt"));

    let paths = find_log_paths(&root, "").unwrap().into_paths();
    assert_eq!(paths, vec![logs.join("a.bag"), logs.join("b.bag")]);
}

#[test]
fn test_no_rosbag_directory() {
    let (root, _guard) = temp_dir("discovery_none");
    touch(&root.join("logs").join("a.bag"));

    assert_eq!(find_log_paths(&root, "").unwrap(), Discovery::NoLogDirectory);
}

#[test]
fn test_rosbag_directory_without_matches() {
    let (root, _guard) = temp_dir("discovery_nomatch");
    touch(&root.join("rosbag").join("other.bag"));

    match find_log_paths(&root, "dive").unwrap() {
        Discovery::NoMatchingFiles { directories } => {
            assert_eq!(directories, vec![root.join("rosbag")]);
        }
        other => panic!("unexpected discovery: {other:?}"),
    }
}

#[test]
fn test_missing_root() {
    let (root, _guard) = temp_dir("discovery_missing");
    let missing = root.join("not_here");

    assert!(matches!(
        find_log_paths(&missing, ""),
        Err(Error::MissingDirectory { .. })
    ));
    assert!(matches!(
        ensure_directory(&missing, false),
        Err(Error::MissingDirectory { .. })
    ));
    ensure_directory(&missing, true).unwrap();
    assert!(missing.is_dir());
    assert_eq!(find_log_paths(&missing, "").unwrap(), Discovery::NoLogDirectory);
}

#[test]
fn test_first_rosbag_directory_with_matches_wins() {
    let (root, _guard) = temp_dir("discovery_order");
    touch(&root.join("a_cruise").join("rosbag").join("test_001.bag"));
    touch(&root.join("b_cruise").join("rosbag").join("dive_001.bag"));
    touch(&root.join("c_cruise").join("rosbag").join("dive_002.bag"));

    let paths = find_log_paths(&root, "dive").unwrap().into_paths();
    assert_eq!(paths, vec![root.join("b_cruise").join("rosbag").join("dive_001.bag")]);
}
