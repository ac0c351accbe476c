//! Integration tests for the import workflow
//!
//! These tests drive `InstalledGamesController` end to end:
//! - Folder scans against a real temporary directory
//! - Cancellation and replacement of in-flight scans
//! - Failure handling that keeps the previous list
//! - Progress hosts that abort a running scan
//! - Confirmation and insertion into a `JsonGameLibrary`

use gameimport::{
    CancelToken, Enumeration, GameDatabase, ImportError, InstalledGamesController,
    JsonGameLibrary, Program, ProgramSource, Result, ScanState, SystemProgramSource,
    add_importable_games,
    config::ImporterSettings,
    controller::ScanKind,
    dialogs::{DialogResult, ProgressHost, ProgressOutcome, WindowHost},
    error::StringError,
    library::{INSTALLATION_DIRECTORY, LibraryEvent},
};
use std::cell::Cell;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Folder source whose first call answers immediately and later calls
/// behave according to `mode`
struct ScriptedSource {
    calls: AtomicUsize,
    mode: LaterCalls,
    finished: AtomicBool,
}

enum LaterCalls {
    /// Block until cancelled, then report cancellation
    BlockUntilCancelled,
    /// Block until cancelled, then report stale results anyway
    IgnoreCancellation,
    /// Fail immediately
    Fail,
}

fn program(name: &str) -> Program {
    Program {
        name: name.to_string(),
        path: format!(r"C:\Games\{name}\{name}.exe"),
        work_dir: Some(format!(r"C:\Games\{name}")),
        ..Program::default()
    }
}

impl ScriptedSource {
    fn new(mode: LaterCalls) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            mode,
            finished: AtomicBool::new(false),
        }
    }

    fn wait_for_cancel(cancel: &CancelToken) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !cancel.is_cancelled() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl ProgramSource for ScriptedSource {
    fn installed_programs(&self, _cancel: &CancelToken) -> Result<Enumeration> {
        Ok(Enumeration::Complete(Vec::new()))
    }

    fn store_apps(&self) -> Result<Vec<Program>> {
        Ok(Vec::new())
    }

    fn executables_in_folder(
        &self,
        root: &Path,
        _recursive: bool,
        cancel: &CancelToken,
    ) -> Result<Enumeration> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 || root.to_string_lossy().ends_with("fast") {
            return Ok(Enumeration::Complete(vec![program("Beta"), program("Alpha")]));
        }

        let result = match self.mode {
            LaterCalls::BlockUntilCancelled => {
                Self::wait_for_cancel(cancel);
                Ok(Enumeration::Cancelled)
            }
            LaterCalls::IgnoreCancellation => {
                Self::wait_for_cancel(cancel);
                Ok(Enumeration::Complete(vec![program("Stale")]))
            }
            LaterCalls::Fail => Err(ImportError::Enumeration(StringError::new("access denied"))),
        };
        self.finished.store(true, Ordering::SeqCst);
        result
    }

    fn program_from_path(&self, path: &Path) -> Result<Program> {
        Ok(program(&path.display().to_string()))
    }
}

fn names(controller: &InstalledGamesController) -> Vec<String> {
    controller
        .programs()
        .iter()
        .map(|item| item.name().to_string())
        .collect()
}

fn controller_with(source: Arc<ScriptedSource>, settings: ImporterSettings) -> InstalledGamesController {
    InstalledGamesController::new(source, &JsonGameLibrary::in_memory(), settings)
}

/// Wait until the scripted source returned, then give the worker time to report
fn settle(source: &ScriptedSource) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !source.finished.load(Ordering::SeqCst) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    thread::sleep(Duration::from_millis(50));
}

#[test]
fn test_cancelled_folder_scan_keeps_previous_list() {
    let source = Arc::new(ScriptedSource::new(LaterCalls::BlockUntilCancelled));
    let mut controller = controller_with(Arc::clone(&source), ImporterSettings::default());

    controller.scan_folder(Path::new(r"C:\first")).unwrap();
    controller.wait_for_scan().unwrap();
    assert_eq!(names(&controller), vec!["Alpha", "Beta"]);

    controller.scan_folder(Path::new(r"C:\second")).unwrap();
    assert_eq!(
        controller.scan_state(),
        &ScanState::Scanning(ScanKind::Folder)
    );

    assert!(controller.cancel_scan());
    assert_eq!(
        controller.scan_state(),
        &ScanState::Cancelled(ScanKind::Folder)
    );

    settle(&source);
    let state = controller.poll_scan().unwrap();

    assert_eq!(state, ScanState::Cancelled(ScanKind::Folder));
    assert_eq!(names(&controller), vec!["Alpha", "Beta"]);
}

#[test]
fn test_new_scan_replaces_in_flight_scan() {
    let source = Arc::new(ScriptedSource::new(LaterCalls::IgnoreCancellation));
    let mut controller = controller_with(Arc::clone(&source), ImporterSettings::default());

    controller.scan_folder(Path::new(r"C:\first")).unwrap();
    controller.wait_for_scan().unwrap();

    // The slow scan reports stale results after being superseded
    controller.scan_folder(Path::new(r"C:\slow")).unwrap();
    controller.scan_folder(Path::new(r"C:\fast")).unwrap();
    let state = controller.wait_for_scan().unwrap();

    assert_eq!(
        state,
        ScanState::Completed {
            kind: ScanKind::Folder,
            count: 2
        }
    );

    settle(&source);
    controller.poll_scan().unwrap();
    assert_eq!(names(&controller), vec!["Alpha", "Beta"]);
}

#[test]
fn test_failed_scan_keeps_previous_list() {
    let source = Arc::new(ScriptedSource::new(LaterCalls::Fail));
    let mut controller = controller_with(source, ImporterSettings::default());

    controller.scan_folder(Path::new(r"C:\first")).unwrap();
    controller.wait_for_scan().unwrap();

    controller.scan_folder(Path::new(r"C:\second")).unwrap();
    let state = controller.wait_for_scan().unwrap();

    assert!(matches!(
        state,
        ScanState::Failed {
            kind: ScanKind::Folder,
            ..
        }
    ));
    assert_eq!(names(&controller), vec!["Alpha", "Beta"]);
}

#[test]
fn test_surface_all_errors_only_in_debug_builds() {
    let source = Arc::new(ScriptedSource::new(LaterCalls::Fail));
    let mut controller = controller_with(
        source,
        ImporterSettings {
            surface_all_errors: true,
            ..ImporterSettings::default()
        },
    );

    controller.scan_folder(Path::new(r"C:\first")).unwrap();
    controller.wait_for_scan().unwrap();
    controller.scan_folder(Path::new(r"C:\second")).unwrap();

    let result = controller.wait_for_scan();
    assert_eq!(result.is_err(), cfg!(debug_assertions));
    assert_eq!(names(&controller), vec!["Alpha", "Beta"]);
}

#[test]
fn test_closing_view_cancels_scan() {
    let source = Arc::new(ScriptedSource::new(LaterCalls::BlockUntilCancelled));
    let mut controller = controller_with(Arc::clone(&source), ImporterSettings::default());

    controller.scan_folder(Path::new(r"C:\first")).unwrap();
    controller.wait_for_scan().unwrap();
    controller.scan_folder(Path::new(r"C:\second")).unwrap();

    controller.close_view(DialogResult::Cancelled);

    assert!(!controller.is_scanning());
    assert_eq!(controller.dialog_result(), Some(DialogResult::Cancelled));
    settle(&source);
    assert_eq!(names(&controller), vec!["Alpha", "Beta"]);
}

#[test]
fn test_manual_pick_supersedes_in_flight_scan() {
    let source = Arc::new(ScriptedSource::new(LaterCalls::IgnoreCancellation));
    let mut controller = controller_with(Arc::clone(&source), ImporterSettings::default());

    controller.scan_folder(Path::new(r"C:\first")).unwrap();
    controller.wait_for_scan().unwrap();

    // The slow scan would report stale results once it notices the cancel
    controller.scan_folder(Path::new(r"C:\slow")).unwrap();
    assert!(controller.add_executable(Path::new(r"C:\picked.exe")).unwrap());

    assert!(!controller.is_scanning());
    assert_eq!(
        controller.scan_state(),
        &ScanState::Cancelled(ScanKind::Folder)
    );

    settle(&source);
    controller.wait_for_scan().unwrap();
    controller.poll_scan().unwrap();

    assert_eq!(names(&controller), vec!["Alpha", "Beta", r"C:\picked.exe"]);
    let picked = controller.selected_program().unwrap();
    assert_eq!(picked.name(), r"C:\picked.exe");
    assert!(picked.import());
}

/// Progress host that aborts after a number of steps
struct AbortAfter {
    steps: usize,
    taken: Cell<usize>,
}

impl ProgressHost for AbortAfter {
    fn run(&self, _title: &str, step: &mut dyn FnMut() -> Result<bool>) -> Result<ProgressOutcome> {
        while self.taken.get() < self.steps {
            self.taken.set(self.taken.get() + 1);
            if step()? {
                return Ok(ProgressOutcome::Finished);
            }
        }
        Ok(ProgressOutcome::Cancelled)
    }
}

#[test]
fn test_progress_abort_cancels_scan() {
    let source = Arc::new(ScriptedSource::new(LaterCalls::BlockUntilCancelled));
    let mut controller = controller_with(Arc::clone(&source), ImporterSettings::default());

    controller.scan_folder(Path::new(r"C:\first")).unwrap();
    controller.wait_for_scan().unwrap();

    let progress = AbortAfter {
        steps: 2,
        taken: Cell::new(0),
    };
    let state = controller
        .scan_folder_with_progress(Path::new(r"C:\second"), &progress)
        .unwrap();

    assert_eq!(progress.taken.get(), 2);
    assert_eq!(state, ScanState::Cancelled(ScanKind::Folder));
    assert!(!controller.is_scanning());

    settle(&source);
    assert_eq!(
        controller.poll_scan().unwrap(),
        ScanState::Cancelled(ScanKind::Folder)
    );
    assert_eq!(names(&controller), vec!["Alpha", "Beta"]);
}

#[test]
fn test_progress_runs_scan_to_completion() {
    let source = Arc::new(ScriptedSource::new(LaterCalls::Fail));
    let mut controller = controller_with(source, ImporterSettings::default());

    let progress = AbortAfter {
        steps: usize::MAX,
        taken: Cell::new(0),
    };
    let state = controller
        .scan_folder_with_progress(Path::new(r"C:\first"), &progress)
        .unwrap();

    assert_eq!(
        state,
        ScanState::Completed {
            kind: ScanKind::Folder,
            count: 2
        }
    );
    assert!(progress.taken.get() >= 1);

    // Nothing in flight: the host is not consulted
    let idle = AbortAfter {
        steps: 0,
        taken: Cell::new(0),
    };
    assert_eq!(controller.run_with_progress(&idle).unwrap(), state);
}

/// Marks everything visible, then confirms
struct ImportVisible;

impl WindowHost for ImportVisible {
    fn show(&self, controller: &mut InstalledGamesController) {
        controller.wait_for_scan().unwrap();
        let visible: Vec<usize> = controller.visible_programs().map(|(index, _)| index).collect();
        for index in visible {
            controller.set_import(index, true);
        }
        controller.confirm_dialog();
    }
}

fn game_folder() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("game.exe"), b"").unwrap();
    std::fs::create_dir(dir.path().join("tools")).unwrap();
    std::fs::write(dir.path().join("tools").join("editor.exe"), b"").unwrap();
    std::fs::write(dir.path().join("readme.txt"), b"").unwrap();
    dir
}

#[test]
fn test_scan_confirm_import_then_hidden() {
    let folder = game_folder();
    let library_dir = tempfile::tempdir().unwrap();
    let library = JsonGameLibrary::open(library_dir.path()).unwrap();
    let events = library.subscribe();

    let mut controller = InstalledGamesController::new(
        Arc::new(SystemProgramSource),
        &library,
        ImporterSettings::default(),
    );
    let result = controller
        .open_view_on_folder(&ImportVisible, Some(folder.path()))
        .unwrap();
    assert_eq!(result, Some(DialogResult::Accepted));

    let games = controller.take_selected_games();
    assert_eq!(games.len(), 2);
    for game in &games {
        assert!(game.is_installed);
        assert!(game.game_actions[0].path.starts_with(INSTALLATION_DIRECTORY));
        assert_eq!(game.game_actions[0].working_dir, INSTALLATION_DIRECTORY);
    }

    let added = add_importable_games(&games, &library).unwrap();
    library.save().unwrap();
    assert_eq!(added.len(), 2);

    let LibraryEvent::GamesChanged { added: ids, .. } = events.try_recv().unwrap();
    assert_eq!(ids.len(), 2);
    assert!(events.try_recv().is_err());

    // A new session over the reopened library hides both executables
    let reopened = JsonGameLibrary::open(library_dir.path()).unwrap();
    assert_eq!(reopened.imported_executable_paths().len(), 2);

    let mut controller = InstalledGamesController::new(
        Arc::new(SystemProgramSource),
        &reopened,
        ImporterSettings::default(),
    );
    controller.scan_folder(folder.path()).unwrap();
    controller.wait_for_scan().unwrap();

    assert_eq!(controller.programs().len(), 2);
    assert_eq!(controller.visible_programs().count(), 0);
}

#[test]
fn test_non_recursive_scan() {
    let folder = game_folder();
    let mut controller = InstalledGamesController::new(
        Arc::new(SystemProgramSource),
        &JsonGameLibrary::in_memory(),
        ImporterSettings {
            scan_recursive: false,
            ..ImporterSettings::default()
        },
    );

    controller.scan_folder(folder.path()).unwrap();
    controller.wait_for_scan().unwrap();

    let names = names(&controller);
    assert_eq!(names.len(), 1);
    assert!(names[0].eq_ignore_ascii_case("game"));
}

#[test]
fn test_missing_folder_fails_without_error() {
    let mut controller = InstalledGamesController::new(
        Arc::new(SystemProgramSource),
        &JsonGameLibrary::in_memory(),
        ImporterSettings::default(),
    );

    controller
        .scan_folder(Path::new("definitely/not/a/folder"))
        .unwrap();
    let state = controller.wait_for_scan().unwrap();

    assert!(matches!(state, ScanState::Failed { .. }));
    assert!(controller.programs().is_empty());
}

#[test]
fn test_default_completion_status_applied() {
    let library = JsonGameLibrary::in_memory();
    let status = uuid::Uuid::new_v4();
    library.set_default_completion_status(Some(status));

    let folder = game_folder();
    let mut controller = InstalledGamesController::new(
        Arc::new(SystemProgramSource),
        &library,
        ImporterSettings::default(),
    );
    controller.open_view_on_folder(&ImportVisible, Some(folder.path())).unwrap();

    let added = add_importable_games(controller.selected_games(), &library).unwrap();
    assert!(added.iter().all(|game| game.completion_status_id == Some(status)));
    assert!(
        library
            .games()
            .iter()
            .all(|game| game.completion_status_id == Some(status))
    );
}
