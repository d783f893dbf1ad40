/// End-to-end scanner integration tests.
///
/// These tests run the real background worker against real temporary
/// directory trees: thread spawning, the LIFO walk, reverse aggregation and
/// the message channel, with no mocking. Cancellation tests use a gate sink
/// that parks the worker at a known event, so the cancel always lands at a
/// deterministic point.
use crossbeam_channel::{Receiver, Sender};
use diskwise_core::model::ScanResult;
use diskwise_core::scanner::{
    start_scan, DiagnosticSink, FileDiagnosticLog, NullSink, ScanController, ScanEvent,
    ScanHandle, ScanMessage, ScanOutcome,
};
use diskwise_core::AnalyzerConfig;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write_bytes(path: &Path, n: usize) {
    fs::write(path, vec![0u8; n]).unwrap();
}

/// ```text
/// root/
///   alpha/
///     a.txt   (100 bytes)
///     b.rs    (200 bytes)
///   beta/
///     c.png   (300 bytes)
///   d.zip     (400 bytes)
/// ```
fn build_test_tree(root: &Path) {
    fs::create_dir_all(root.join("alpha")).unwrap();
    fs::create_dir_all(root.join("beta")).unwrap();
    write_bytes(&root.join("alpha/a.txt"), 100);
    write_bytes(&root.join("alpha/b.rs"), 200);
    write_bytes(&root.join("beta/c.png"), 300);
    write_bytes(&root.join("d.zip"), 400);
}

fn config() -> Arc<AnalyzerConfig> {
    Arc::new(AnalyzerConfig::default())
}

/// Drain messages until the terminal one, panicking after a generous
/// timeout so a stuck worker cannot hang the suite.
fn drain_to_completion(handle: &ScanHandle) -> (Vec<u64>, ScanOutcome) {
    let deadline = Instant::now() + Duration::from_secs(30);
    let mut progress = Vec::new();
    loop {
        assert!(
            Instant::now() < deadline,
            "scanner did not finish within 30 seconds"
        );
        match handle.messages.recv_timeout(Duration::from_millis(100)) {
            Ok(ScanMessage::Progress { dirs_visited }) => progress.push(dirs_visited),
            Ok(ScanMessage::Completed(result)) => {
                return (progress, ScanOutcome::Completed(*result))
            }
            Ok(ScanMessage::Cancelled) => return (progress, ScanOutcome::Cancelled),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                panic!("scanner channel disconnected before a terminal message")
            }
        }
    }
}

fn scan(root: &Path) -> ScanResult {
    let handle = start_scan(root.to_path_buf(), config(), Arc::new(NullSink)).unwrap();
    let (_, outcome) = drain_to_completion(&handle);
    handle.join();
    outcome.into_result().expect("scan was unexpectedly cancelled")
}

/// Parks the worker when it records an event matching `stop_at` until the
/// test sends (or drops) the release signal.
struct GateSink {
    stop_at: fn(&ScanEvent) -> bool,
    release: Receiver<()>,
}

impl GateSink {
    fn new(stop_at: fn(&ScanEvent) -> bool) -> (Arc<Self>, Sender<()>) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        (
            Arc::new(Self {
                stop_at,
                release: rx,
            }),
            tx,
        )
    }
}

impl DiagnosticSink for GateSink {
    fn record(&self, event: &ScanEvent) {
        if (self.stop_at)(event) {
            let _ = self.release.recv();
        }
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────────

/// Two files and a subdirectory: the root aggregates everything and lists
/// its children by size.
#[test]
fn scenario_sizes_and_listing() {
    let tmp = TempDir::new().unwrap();
    write_bytes(&tmp.path().join("ten.bin"), 10);
    write_bytes(&tmp.path().join("twenty.bin"), 20);
    fs::create_dir(tmp.path().join("sub")).unwrap();
    write_bytes(&tmp.path().join("sub/five.bin"), 5);

    let result = scan(tmp.path());
    assert_eq!(result.total_size(), 35);

    let listing: Vec<_> = result
        .children_of(&result.root)
        .iter()
        .map(|c| (c.name.as_str(), c.size, c.is_dir))
        .collect();
    assert_eq!(
        listing,
        vec![
            ("twenty.bin", 20, false),
            ("ten.bin", 10, false),
            ("sub", 5, true)
        ]
    );
}

/// Skipped volume-metadata directories are excluded from sizes and from
/// listings.
#[test]
fn scenario_skip_set_excluded() {
    let tmp = TempDir::new().unwrap();
    let svi = tmp.path().join("System Volume Information");
    fs::create_dir(&svi).unwrap();
    write_bytes(&svi.join("tracking.log"), 1_000);
    write_bytes(&tmp.path().join("visible.txt"), 10);

    let result = scan(tmp.path());
    assert_eq!(result.total_size(), 10);
    assert!(result
        .children_of(&result.root)
        .iter()
        .all(|c| c.name != "System Volume Information"));
    assert_eq!(result.size_of(&result.root.join("System Volume Information")), None);
    assert_eq!(result.stats.skipped_dirs, 1);
}

/// Non-forced delete of a populated directory fails as "not empty" and
/// leaves the tree alone; forced delete removes it and the caller then
/// invalidates the subtree in the result.
#[test]
fn scenario_delete_then_invalidate() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    let mut result = scan(tmp.path());
    let alpha = result.root.join("alpha");
    let rules = &AnalyzerConfig::default().rules;

    let err = diskwise_core::delete::delete(&alpha, true, false, rules).unwrap_err();
    assert!(matches!(err, diskwise_core::DeleteError::NotEmpty { .. }));
    assert!(alpha.join("b.rs").exists());

    diskwise_core::delete::delete(&alpha, true, true, rules).unwrap();
    assert!(!alpha.exists());

    assert_eq!(result.remove_subtree(&alpha), Some(300));
    assert_eq!(result.total_size(), 700);
    assert!(result.children_of(&alpha).is_empty());
    let rescanned = scan(tmp.path());
    assert_eq!(result.sizes_by_path, rescanned.sizes_by_path);
    assert_eq!(result.children_by_path, rescanned.children_by_path);
}

/// A protected location is refused and still exists afterwards.
#[test]
fn scenario_protected_delete_refused() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("Program Files").join("App");
    fs::create_dir_all(&target).unwrap();
    write_bytes(&target.join("app.exe"), 64);

    let rules = &AnalyzerConfig::default().rules;
    let err = diskwise_core::delete::delete(&target, true, true, rules).unwrap_err();
    assert!(matches!(err, diskwise_core::DeleteError::Protected { .. }));
    assert!(target.join("app.exe").exists());
}

// ── Properties ───────────────────────────────────────────────────────────────

/// Every directory's size equals the sum of its listed children.
#[test]
fn aggregate_equals_sum_of_children() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    fs::create_dir_all(tmp.path().join("alpha/nested/deeper")).unwrap();
    write_bytes(&tmp.path().join("alpha/nested/deeper/x.bin"), 77);

    let result = scan(tmp.path());
    assert_eq!(result.total_size(), 1_077);
    assert_eq!(result.directory_count(), 5);
    for (dir, size) in &result.sizes_by_path {
        let sum: u64 = result.children_of(dir).iter().map(|c| c.size).sum();
        assert_eq!(*size, sum, "{}", dir.display());
    }
}

/// Listings are sorted by size, largest first, in every directory.
#[test]
fn listings_are_sorted_descending() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    let result = scan(tmp.path());
    for children in result.children_by_path.values() {
        assert!(children.windows(2).all(|w| w[0].size >= w[1].size));
    }
    let names: Vec<_> = result
        .children_of(&result.root)
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["d.zip", "alpha", "beta"]);
}

/// Scanning an unchanged tree twice yields identical results.
#[test]
fn rescans_are_idempotent() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    // Equal sizes exercise the tie-breakers.
    write_bytes(&tmp.path().join("same-1"), 400);
    write_bytes(&tmp.path().join("same-2"), 400);

    let first = scan(tmp.path());
    let second = scan(tmp.path());
    assert_eq!(first.sizes_by_path, second.sizes_by_path);
    assert_eq!(first.children_by_path, second.children_by_path);
}

#[test]
fn empty_root_has_empty_listing() {
    let tmp = TempDir::new().unwrap();
    let result = scan(tmp.path());
    assert_eq!(result.total_size(), 0);
    assert!(result.children_of(&result.root).is_empty());
    assert!(!result.has_children(&result.root));
}

/// A relative root is made absolute before it becomes a key.
#[test]
fn relative_root_is_absolutised() {
    let handle = start_scan(".".into(), config(), Arc::new(NullSink)).unwrap();
    assert!(handle.root().is_absolute());
    handle.cancel();
    let _ = drain_to_completion(&handle);
    handle.join();
}

/// A nonexistent root completes with a zero-size root entry.
#[test]
fn missing_root_completes_empty() {
    let tmp = TempDir::new().unwrap();
    let result = scan(&tmp.path().join("nope"));
    assert_eq!(result.total_size(), 0);
    assert_eq!(result.directory_count(), 1);
    assert_eq!(result.stats.unreadable_dirs, 1);
}

#[test]
fn progress_counts_are_monotonic() {
    let tmp = TempDir::new().unwrap();
    for i in 0..6 {
        fs::create_dir(tmp.path().join(format!("d{i}"))).unwrap();
    }
    let mut config = AnalyzerConfig::default();
    config.scan.progress_interval = 2;

    let handle =
        start_scan(tmp.path().to_path_buf(), Arc::new(config), Arc::new(NullSink)).unwrap();
    let (progress, outcome) = drain_to_completion(&handle);
    handle.join();

    assert_eq!(progress, vec![2, 4, 6]);
    assert_eq!(outcome.into_result().unwrap().stats.dirs_visited, 7);
}

// ── Cancellation ─────────────────────────────────────────────────────────────

/// Cancel raised before the first directory is popped: no result.
#[test]
fn cancel_during_traversal_publishes_nothing() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());

    let (gate, release) = GateSink::new(|e| matches!(e, ScanEvent::Started { .. }));
    let handle = start_scan(tmp.path().to_path_buf(), config(), gate).unwrap();
    handle.cancel();
    release.send(()).unwrap();

    let (progress, outcome) = drain_to_completion(&handle);
    assert!(progress.is_empty());
    assert!(outcome.is_cancelled());
    assert!(handle.messages.try_recv().is_err());
    handle.join();
}

/// Cancel raised after the walk but before publication still wins.
#[test]
fn cancel_during_aggregation_publishes_nothing() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());

    let (gate, release) = GateSink::new(|e| matches!(e, ScanEvent::Finished { .. }));
    let handle = start_scan(tmp.path().to_path_buf(), config(), gate).unwrap();
    handle.cancel();
    release.send(()).unwrap();

    let (_, outcome) = drain_to_completion(&handle);
    assert!(outcome.is_cancelled());
    handle.join();
}

/// Starting a new scan cancels and joins the previous worker; only the new
/// scan's result is ever delivered.
#[test]
fn controller_restart_replaces_active_scan() {
    let first = TempDir::new().unwrap();
    build_test_tree(first.path());
    let second = TempDir::new().unwrap();
    write_bytes(&second.path().join("only.bin"), 42);

    let mut controller = ScanController::new(config());
    let (gate, release) = GateSink::new(|e| matches!(e, ScanEvent::Started { .. }));
    controller.start(first.path().to_path_buf(), gate).unwrap();
    assert!(controller.is_active());
    controller.cancel();

    let releaser = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        drop(release);
    });
    controller
        .start(second.path().to_path_buf(), Arc::new(NullSink))
        .unwrap();
    releaser.join().unwrap();

    let result = controller.finish().unwrap().into_result().unwrap();
    assert_eq!(result.root, second.path());
    assert_eq!(result.total_size(), 42);
    assert!(!controller.is_active());
    assert!(controller.finish().is_none());
}

// ── Diagnostic log ───────────────────────────────────────────────────────────

#[test]
fn diagnostic_log_records_scan() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("root");
    fs::create_dir(&root).unwrap();
    build_test_tree(&root);
    fs::create_dir(root.join("$Recycle.Bin")).unwrap();

    let log_path = tmp.path().join("scan_log.txt");
    fs::write(&log_path, "stale contents from a previous run\n").unwrap();

    let log = Arc::new(FileDiagnosticLog::create(&log_path).unwrap());
    assert_eq!(log.path(), log_path);
    let handle = start_scan(root.clone(), config(), log.clone()).unwrap();
    let (_, outcome) = drain_to_completion(&handle);
    handle.join();
    assert!(!outcome.is_cancelled());
    drop(log);

    let text = fs::read_to_string(&log_path).unwrap();
    assert!(text.starts_with("Scan started"));
    assert!(!text.contains("stale contents"));
    assert!(text.contains("[SKIP]"));
    assert!(text.contains("$Recycle.Bin"));
    assert!(text.contains("[VISIT]"));
    assert!(text.contains("[DONE] 3 directories"));
}

#[cfg(unix)]
#[test]
fn unreadable_directory_counts_zero() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());
    let locked = tmp.path().join("locked");
    fs::create_dir(&locked).unwrap();
    write_bytes(&locked.join("secret.bin"), 500);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read it anyway; nothing to test then.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = scan(tmp.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(result.size_of(&locked), Some(0));
    assert_eq!(result.total_size(), 1_000);
    assert_eq!(result.stats.unreadable_dirs, 1);
    assert!(result
        .children_of(&result.root)
        .iter()
        .any(|c| c.name == "locked" && c.is_dir && c.size == 0));
}
