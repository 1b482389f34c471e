//! Integration tests for resolution and scanning across mixed roots.
//!
//! These tests build real directory trees and zip archives and check that:
//! - earlier roots shadow later ones
//! - missing roots are tolerated
//! - archive-scoped scans stay inside the archive that owns the search path
//! - every scanned resource resolves back to the same location
//!
//! Run with: `cargo test --test resolve_and_scan`

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use respath::{
    LoaderContext, RecursiveScanner, ResolverConfig, ResourceError, ResourceKind,
    ResourceResolver, SearchSpec, DEFAULT_SUFFIX,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Write `contents` to `root/relative`, creating parent directories.
fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

/// Build a zip archive at `path` holding the given entries.
fn write_archive(path: &Path, entries: &[(&str, &str)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, contents) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn uri(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// The usual project layout: a build output root ahead of a source root.
struct Project {
    _temp: TempDir,
    build: PathBuf,
    src: PathBuf,
}

impl Project {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let build = temp.path().join("build/resources");
        let src = temp.path().join("src/resources");
        std::fs::create_dir_all(&build).unwrap();
        std::fs::create_dir_all(&src).unwrap();
        Self {
            _temp: temp,
            build,
            src,
        }
    }

    fn loader(&self) -> LoaderContext {
        LoaderContext::new([uri(&self.build), uri(&self.src)])
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

#[test]
fn test_scan_finds_resource_in_second_root_and_round_trips() {
    let project = Project::new();
    let expected = write_file(&project.src, "a/b/x.feature", "Feature: x");

    let resolver = ResourceResolver::new(project.loader());
    let found = resolver
        .scanner(DEFAULT_SUFFIX)
        .scan(&SearchSpec::archive_scoped("classpath:a"))
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].logical_path(), "classpath:a/b/x.feature");

    let resolved = resolver.resolve(found[0].logical_path(), None).unwrap();
    assert_eq!(resolved.location().as_path(), Some(expected.as_path()));
    assert!(resolved.same_location(&found[0]));
    assert_eq!(resolved.read_to_string().unwrap(), "Feature: x");
}

#[test]
fn test_earlier_root_shadows_later_root() {
    let project = Project::new();
    let winner = write_file(&project.build, "users/create.json", "build");
    write_file(&project.src, "users/create.json", "src");

    let resolver = ResourceResolver::new(project.loader());
    let resource = resolver.resolve("classpath:users/create.json", None).unwrap();

    assert_eq!(resource.location().as_path(), Some(winner.as_path()));
    assert_eq!(resource.read_to_string().unwrap(), "build");
    assert_eq!(resource.kind(), ResourceKind::Json);
}

#[test]
fn test_missing_roots_are_skipped() {
    let project = Project::new();
    write_file(&project.src, "x.feature", "Feature: x");

    let loader = LoaderContext::new([
        uri(&project.build.join("does-not-exist")),
        uri(&project.src),
    ]);
    let resolver = ResourceResolver::new(loader);

    assert!(resolver.resolve("classpath:x.feature", None).is_ok());
    let found = resolver.scanner(DEFAULT_SUFFIX).scan_classpath().unwrap();
    assert_eq!(found.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_missing_jar_root_is_skipped_by_scan_and_resolve() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("missing.jar");
    let dir = temp.path().join("dir");
    write_file(&dir, "suite/x.feature", "Feature: x");

    let jar_uri = format!("jar:file://{}!/", jar.display());
    let resolver = ResourceResolver::new(LoaderContext::new([jar_uri, uri(&dir)]));
    let found = resolver
        .scanner(DEFAULT_SUFFIX)
        .scan(&SearchSpec::archive_scoped("classpath:suite"))
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].logical_path(), "classpath:suite/x.feature");
    assert!(resolver.resolve("classpath:suite/x.feature", None).is_ok());
}

#[test]
fn test_not_found_names_the_path() {
    let project = Project::new();
    let resolver = ResourceResolver::new(project.loader());

    let err = resolver.resolve("classpath:nope.feature", None).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "resource not found: classpath:nope.feature");
}

#[test]
fn test_archive_scoped_scan_stays_inside_owning_archive() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("features.jar");
    write_archive(
        &jar,
        &[
            ("features/a.feature", "Feature: a"),
            ("features/deep/b.feature", "Feature: b"),
            ("features/readme.txt", "ignored"),
            ("other/c.feature", "Feature: c"),
        ],
    );
    let dir = temp.path().join("dir");
    write_file(&dir, "features/d.feature", "Feature: d");

    let resolver = ResourceResolver::new(LoaderContext::new([uri(&jar), uri(&dir)]));
    let found = resolver
        .scanner(DEFAULT_SUFFIX)
        .scan(&SearchSpec::archive_scoped("classpath:features"))
        .unwrap();

    let logical: Vec<&str> = found.iter().map(|r| r.logical_path()).collect();
    assert_eq!(
        logical,
        vec!["classpath:features/a.feature", "classpath:features/deep/b.feature"]
    );
    for resource in &found {
        assert!(resource.location().is_archive());
        let again = resolver.resolve(resource.logical_path(), None).unwrap();
        assert!(again.same_location(resource));
    }
    assert_eq!(found[1].read_to_string().unwrap(), "Feature: b");
}

#[test]
fn test_full_scan_spans_archives_and_directories() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("lib.zip");
    write_archive(&jar, &[("one.feature", "1")]);
    let dir = temp.path().join("dir");
    write_file(&dir, "two.feature", "2");

    let scanner = RecursiveScanner::new(
        LoaderContext::new([uri(&dir), uri(&jar)]),
        DEFAULT_SUFFIX,
    );
    let found = scanner.scan_classpath().unwrap();

    let logical: Vec<&str> = found.iter().map(|r| r.logical_path()).collect();
    assert_eq!(logical, vec!["classpath:two.feature", "classpath:one.feature"]);
}

#[test]
fn test_plain_scan_round_trips_through_file_prefix() {
    let temp = TempDir::new().unwrap();
    let target = write_file(temp.path(), "local/y.feature", "Feature: y");
    write_file(temp.path(), "local/y.json", "{}");

    let resolver = ResourceResolver::new(LoaderContext::default());
    let search = uri(&temp.path().join("local"));
    let found = resolver
        .scanner(DEFAULT_SUFFIX)
        .scan_paths(&[search.as_str()])
        .unwrap();

    assert_eq!(found.len(), 1);
    assert!(found[0].logical_path().starts_with("file:"));
    let again = resolver.resolve(found[0].logical_path(), None).unwrap();
    assert_eq!(
        again.location().as_path().map(|p| p.canonicalize().unwrap()),
        Some(target.canonicalize().unwrap())
    );
}

#[test]
fn test_relative_reference_uses_context_directory() {
    let project = Project::new();
    let feature = write_file(&project.src, "users/create.feature", "Feature: create");
    write_file(&project.src, "users/payload.json", r#"{"name":"x"}"#);

    let resolver = ResourceResolver::new(project.loader());
    let context = feature.parent().unwrap();
    let payload = resolver.resolve("payload.json", Some(context)).unwrap();

    assert_eq!(payload.read_to_string().unwrap(), r#"{"name":"x"}"#);
    let again = resolver.resolve(payload.logical_path(), None).unwrap();
    assert!(again.same_location(&payload));
}

#[test]
fn test_load_splits_call_tag() {
    let project = Project::new();
    write_file(&project.src, "b/c/d.json", "{}");

    let resolver = ResourceResolver::new(project.loader());
    let loaded = resolver.load("classpath:b/c/d.json@smoke", None).unwrap();

    assert_eq!(loaded.call_tag.as_deref(), Some("@smoke"));
    assert_eq!(loaded.kind, ResourceKind::Json);
    assert_eq!(loaded.resource.logical_path(), "classpath:b/c/d.json");
}

#[test]
fn test_config_file_drives_resolution() {
    let project = Project::new();
    write_file(&project.build, "x.feature", "Feature: x");
    let config_path = project.build.parent().unwrap().join("respath.ini");
    std::fs::write(
        &config_path,
        format!(
            "[resources]\nroots = {}, {}\n[scan]\nsuffix = .feature\n",
            uri(&project.build),
            uri(&project.src)
        ),
    )
    .unwrap();

    let config = ResolverConfig::load(&config_path).unwrap();
    let scanner = RecursiveScanner::new(LoaderContext::from_config(&config), config.suffix);
    let found = scanner.scan_classpath().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].logical_path(), "classpath:x.feature");
}

#[test]
fn test_malformed_root_is_a_resolution_error() {
    let resolver = ResourceResolver::new(LoaderContext::new(["jar:file:/x.jar"]));
    let err = resolver.resolve("classpath:x.feature", None).unwrap_err();
    assert!(matches!(err, ResourceError::RootResolution { .. }));
}

#[test]
fn test_concurrent_resolution_shares_one_archive_handle() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("shared.jar");
    let entries: Vec<(String, String)> = (0..8)
        .map(|i| (format!("f/{}.feature", i), format!("Feature: {}", i)))
        .collect();
    let borrowed: Vec<(&str, &str)> = entries
        .iter()
        .map(|(n, c)| (n.as_str(), c.as_str()))
        .collect();
    write_archive(&jar, &borrowed);

    let resolver = Arc::new(ResourceResolver::new(LoaderContext::new([uri(&jar)])));
    std::thread::scope(|scope| {
        for i in 0..8 {
            let resolver = Arc::clone(&resolver);
            scope.spawn(move || {
                let path = format!("classpath:f/{}.feature", i);
                let text = resolver.read_to_string(&path, None).unwrap();
                assert_eq!(text, format!("Feature: {}", i));
            });
        }
    });

    assert_eq!(resolver.mounts().mounted(), 1);
}
