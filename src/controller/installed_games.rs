//! State container of the installed-games import workflow
//!
//! `InstalledGamesController` owns the item list and is driven from a single
//! thread. Background scans never touch the list: they report over a channel
//! and the owner applies results in `poll_scan` or `wait_for_scan`.
//!
//! # Overlapping Scans
//!
//! Starting a scan while another is in flight cancels the older one. Every
//! scan gets a new generation number and results carrying any other
//! generation are discarded at the apply point, so only the newest scan can
//! change the list. A manual pick supersedes an in-flight scan the same
//! way, so the picked item survives the older scan finishing.
//!
//! # Progress
//!
//! `scan_folder_with_progress` and `detect_installed_with_progress` wait for
//! the scan under a `ProgressHost`. When the user aborts, the scan is
//! cancelled and reported as `ScanState::Cancelled`, never as an error.

use super::filter::{ImportedPaths, is_visible};
use super::finalizer::finalize;
use super::importable::ImportableProgram;
use super::scan::{
    ActiveScan, ScanKind, ScanMessage, ScanOutcome, ScanRequest, ScanState, sort_by_name,
    spawn_scan, wrap,
};
use crate::config::ImporterSettings;
use crate::dialogs::{
    DialogHost, DialogResult, FileFilter, ProgressHost, ProgressOutcome, WindowHost,
};
use crate::error::{ImportError, Result};
use crate::icon::IconImage;
use crate::library::{GameDatabase, GameMetadata};
use crate::programs::{
    EXECUTABLE_EXTENSIONS, ProgramKind, ProgramSource, has_executable_extension, is_shortcut,
};
use std::path::Path;
use std::sync::{Arc, mpsc};
use std::time::Duration;
use tracing::{debug, error, info};

/// Filter offered when picking a single executable
pub const EXECUTABLE_FILTER: FileFilter<'static> = FileFilter {
    name: "Executable (.exe,.bat,.lnk)",
    extensions: &EXECUTABLE_EXTENSIONS,
};

/// How often `wait_for_scan` checks whether the worker died
const WORKER_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Import workflow controller
pub struct InstalledGamesController {
    source: Arc<dyn ProgramSource>,
    settings: ImporterSettings,
    imported_paths: ImportedPaths,
    programs: Vec<ImportableProgram>,
    selected_program: Option<usize>,
    hide_imported: bool,
    mark_import_all: bool,
    scan_state: ScanState,
    active_scan: Option<ActiveScan>,
    generation: u64,
    results_tx: mpsc::Sender<ScanMessage>,
    results_rx: mpsc::Receiver<ScanMessage>,
    selected_games: Vec<GameMetadata>,
    dialog_result: Option<DialogResult>,
}

impl InstalledGamesController {
    /// Create a controller; the imported-path set is read from `database` once
    pub fn new<D: GameDatabase + ?Sized>(
        source: Arc<dyn ProgramSource>,
        database: &D,
        settings: ImporterSettings,
    ) -> Self {
        let imported_paths = ImportedPaths::new(database.imported_executable_paths());
        debug!("{} executables already imported", imported_paths.len());

        let (results_tx, results_rx) = mpsc::channel();
        Self {
            source,
            hide_imported: settings.hide_imported,
            settings,
            imported_paths,
            programs: Vec::new(),
            selected_program: None,
            mark_import_all: false,
            scan_state: ScanState::Idle,
            active_scan: None,
            generation: 0,
            results_tx,
            results_rx,
            selected_games: Vec::new(),
            dialog_result: None,
        }
    }

    /// All items, including hidden ones
    pub fn programs(&self) -> &[ImportableProgram] {
        &self.programs
    }

    /// Items passing the dedup filter, with their index in `programs()`
    pub fn visible_programs(&self) -> impl Iterator<Item = (usize, &ImportableProgram)> {
        self.programs
            .iter()
            .enumerate()
            .filter(|(_, item)| is_visible(item, self.hide_imported, &self.imported_paths))
    }

    /// Paths of games already in the library
    pub fn imported_paths(&self) -> &ImportedPaths {
        &self.imported_paths
    }

    /// Whether already imported programs are hidden
    pub fn hide_imported(&self) -> bool {
        self.hide_imported
    }

    /// Toggle hiding of already imported programs
    pub fn set_hide_imported(&mut self, hide: bool) {
        self.hide_imported = hide;
    }

    /// Last value given to `set_mark_import_all`
    pub fn mark_import_all(&self) -> bool {
        self.mark_import_all
    }

    /// Mark or unmark every item for import, hidden ones included
    pub fn set_mark_import_all(&mut self, import: bool) {
        self.mark_import_all = import;
        for item in &mut self.programs {
            item.set_import(import);
        }
    }

    /// Mark or unmark one item; false if `index` is out of range
    pub fn set_import(&mut self, index: usize, import: bool) -> bool {
        match self.programs.get_mut(index) {
            Some(item) => {
                item.set_import(import);
                true
            }
            None => false,
        }
    }

    /// Icon of an item, resolved on first access
    pub fn program_icon(&mut self, index: usize) -> Option<IconImage> {
        self.programs.get_mut(index)?.icon()
    }

    /// Item under the cursor
    pub fn selected_program(&self) -> Option<&ImportableProgram> {
        self.selected_program.and_then(|index| self.programs.get(index))
    }

    /// Move the cursor
    pub fn set_selected_program(&mut self, index: Option<usize>) {
        self.selected_program = index.filter(|&index| index < self.programs.len());
    }

    /// Current scan state
    pub fn scan_state(&self) -> &ScanState {
        &self.scan_state
    }

    /// Whether a background scan is in flight
    pub fn is_scanning(&self) -> bool {
        self.active_scan.is_some()
    }

    /// Pick a single executable through `dialogs` and add it
    pub fn select_executable(&mut self, dialogs: &dyn DialogHost) -> Result<bool> {
        match dialogs.select_file(EXECUTABLE_FILTER) {
            Some(path) => self.add_executable(&path),
            None => Ok(false),
        }
    }

    /// Add one executable, shortcut or batch file, marked for import
    ///
    /// Files with other extensions are ignored. A shortcut is named after
    /// its file name. The new item becomes the cursor. An in-flight scan is
    /// cancelled and its results are never applied.
    pub fn add_executable(&mut self, path: &Path) -> Result<bool> {
        if !has_executable_extension(path) {
            debug!("Ignoring {}: not an executable", path.display());
            return Ok(false);
        }

        if let Some(kind) = self.supersede_scan() {
            self.scan_state = ScanState::Cancelled(kind);
        }

        let program = match self.source.program_from_path(path) {
            Ok(program) => program,
            Err(e) => {
                error!("Failed to read program {}: {}", path.display(), e);
                return if self.settings.surface_errors() {
                    Err(e)
                } else {
                    Ok(false)
                };
            }
        };

        let mut item = ImportableProgram::new(program, ProgramKind::Win32);
        item.set_import(true);
        if is_shortcut(path)
            && let Some(name) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .filter(|stem| !stem.is_empty())
        {
            item.set_name(name);
        }

        info!("Added {} ({})", item.name(), path.display());
        self.programs.push(item);
        self.selected_program = Some(self.programs.len() - 1);
        Ok(true)
    }

    /// Pick a folder through `dialogs` and scan it
    pub fn scan_folder_with_dialog(&mut self, dialogs: &dyn DialogHost) -> Result<()> {
        match dialogs.select_folder() {
            Some(path) => self.scan_folder(&path),
            None => Ok(()),
        }
    }

    /// Start a background scan for executables below `root`
    pub fn scan_folder(&mut self, root: &Path) -> Result<()> {
        self.start_scan(ScanRequest::Folder {
            root: root.to_path_buf(),
            recursive: self.settings.scan_recursive,
        })
    }

    /// Start background detection of installed programs
    ///
    /// Store apps are appended when enabled in settings and supported by
    /// the running system.
    pub fn detect_installed(&mut self) -> Result<()> {
        let include_store_apps =
            self.settings.detect_store_apps && self.source.supports_store_apps();
        self.start_scan(ScanRequest::Installed { include_store_apps })
    }

    /// Start a folder scan and wait for it under `progress`
    pub fn scan_folder_with_progress(
        &mut self,
        root: &Path,
        progress: &dyn ProgressHost,
    ) -> Result<ScanState> {
        self.scan_folder(root)?;
        self.run_with_progress(progress)
    }

    /// Start full detection and wait for it under `progress`
    pub fn detect_installed_with_progress(
        &mut self,
        progress: &dyn ProgressHost,
    ) -> Result<ScanState> {
        self.detect_installed()?;
        self.run_with_progress(progress)
    }

    /// Wait for the in-flight scan under `progress`
    ///
    /// The scan is cancelled when the host reports that the user aborted.
    /// Returns at once when no scan is in flight.
    pub fn run_with_progress(&mut self, progress: &dyn ProgressHost) -> Result<ScanState> {
        let Some(kind) = self.active_scan.as_ref().map(|active| active.kind) else {
            return Ok(self.scan_state.clone());
        };

        let title = match kind {
            ScanKind::Folder => "Scanning folder",
            ScanKind::Installed | ScanKind::StoreApps => "Detecting installed programs",
        };
        if progress.run(title, &mut || self.wait_step())? == ProgressOutcome::Cancelled {
            self.cancel_scan();
        }
        Ok(self.scan_state.clone())
    }

    /// Replace the list with installed store apps, synchronously
    pub fn detect_store_apps(&mut self) -> Result<()> {
        self.supersede_scan();

        match self.source.store_apps() {
            Ok(programs) => {
                let mut items = wrap(programs, ProgramKind::StoreApp);
                sort_by_name(&mut items);
                self.apply_items(ScanKind::StoreApps, items);
                Ok(())
            }
            Err(e) => self.fail(ScanKind::StoreApps, e),
        }
    }

    /// Apply any finished scan result without blocking
    pub fn poll_scan(&mut self) -> Result<ScanState> {
        while let Ok(message) = self.results_rx.try_recv() {
            self.apply(message)?;
        }
        self.check_worker()?;
        Ok(self.scan_state.clone())
    }

    /// Block until the in-flight scan, if any, has been applied
    pub fn wait_for_scan(&mut self) -> Result<ScanState> {
        while !self.wait_step()? {}
        Ok(self.scan_state.clone())
    }

    /// Wait one check interval for the scan; true once none is in flight
    fn wait_step(&mut self) -> Result<bool> {
        if self.active_scan.is_none() {
            return Ok(true);
        }

        match self.results_rx.recv_timeout(WORKER_CHECK_INTERVAL) {
            Ok(message) => self.apply(message)?,
            Err(mpsc::RecvTimeoutError::Timeout) => self.check_worker()?,
            Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(true),
        }
        Ok(self.active_scan.is_none())
    }

    /// Cancel the in-flight scan; the list stays as it was
    pub fn cancel_scan(&mut self) -> bool {
        let Some(active) = self.active_scan.take() else {
            return false;
        };

        active.cancel.cancel();
        info!("{:?} scan cancelled", active.kind);
        self.scan_state = ScanState::Cancelled(active.kind);
        true
    }

    /// Finalize marked items and close with `Accepted`
    pub fn confirm_dialog(&mut self) {
        self.selected_games = finalize(&mut self.programs);
        info!("{} games selected for import", self.selected_games.len());
        self.close_view(DialogResult::Accepted);
    }

    /// End the session with `result`, cancelling any in-flight scan
    pub fn close_view(&mut self, result: DialogResult) {
        self.cancel_scan();
        self.dialog_result = Some(result);
    }

    /// Show the workflow through `host`
    pub fn open_view(&mut self, host: &dyn WindowHost) -> Option<DialogResult> {
        self.dialog_result = None;
        host.show(self);
        self.dialog_result
    }

    /// Show the workflow, scanning `directory` first when given
    pub fn open_view_on_folder(
        &mut self,
        host: &dyn WindowHost,
        directory: Option<&Path>,
    ) -> Result<Option<DialogResult>> {
        if let Some(directory) = directory.filter(|dir| !dir.as_os_str().is_empty()) {
            self.scan_folder(directory)?;
        }
        Ok(self.open_view(host))
    }

    /// Show the workflow listing store apps
    pub fn open_view_on_store_apps(
        &mut self,
        host: &dyn WindowHost,
    ) -> Result<Option<DialogResult>> {
        self.detect_store_apps()?;
        Ok(self.open_view(host))
    }

    /// Games produced by the last confirmation
    pub fn selected_games(&self) -> &[GameMetadata] {
        &self.selected_games
    }

    /// Take the games produced by the last confirmation
    pub fn take_selected_games(&mut self) -> Vec<GameMetadata> {
        std::mem::take(&mut self.selected_games)
    }

    /// Outcome of the last session
    pub fn dialog_result(&self) -> Option<DialogResult> {
        self.dialog_result
    }

    fn start_scan(&mut self, request: ScanRequest) -> Result<()> {
        self.supersede_scan();
        self.generation += 1;

        let kind = request.kind();
        match spawn_scan(
            Arc::clone(&self.source),
            request,
            self.generation,
            self.results_tx.clone(),
        ) {
            Ok(active) => {
                self.active_scan = Some(active);
                self.scan_state = ScanState::Scanning(kind);
                Ok(())
            }
            Err(e) => self.fail(kind, e),
        }
    }

    /// Cancel the in-flight scan because another entry point replaces it
    fn supersede_scan(&mut self) -> Option<ScanKind> {
        let active = self.active_scan.take()?;
        info!("Scan #{} superseded", active.generation);
        active.cancel.cancel();
        Some(active.kind)
    }

    /// The single point where scan results reach the list
    fn apply(&mut self, message: ScanMessage) -> Result<()> {
        let Some(active) = self
            .active_scan
            .take_if(|active| active.generation == message.generation)
        else {
            debug!("Discarding result of scan #{}", message.generation);
            return Ok(());
        };

        match message.outcome {
            ScanOutcome::Completed(items) => {
                self.apply_items(active.kind, items);
                Ok(())
            }
            ScanOutcome::Cancelled => {
                info!("{:?} scan cancelled", active.kind);
                self.scan_state = ScanState::Cancelled(active.kind);
                Ok(())
            }
            ScanOutcome::Failed(e) => self.fail(active.kind, e),
        }
    }

    fn apply_items(&mut self, kind: ScanKind, items: Vec<ImportableProgram>) {
        let count = items.len();
        self.programs = items;
        self.selected_program = None;
        info!("{:?} scan found {} programs", kind, count);
        self.scan_state = ScanState::Completed { kind, count };
    }

    /// Detect a worker that exited without reporting
    fn check_worker(&mut self) -> Result<()> {
        let finished = self
            .active_scan
            .as_ref()
            .is_some_and(|active| active.worker.is_finished());
        if !finished {
            return Ok(());
        }

        // The result may have been sent just before the thread exited
        while let Ok(message) = self.results_rx.try_recv() {
            self.apply(message)?;
        }

        match self.active_scan.take() {
            Some(active) => {
                let reason = match active.worker.join() {
                    Ok(()) => "worker exited without a result".to_string(),
                    Err(_) => "worker panicked".to_string(),
                };
                self.fail(active.kind, ImportError::ScanWorker(reason))
            }
            None => Ok(()),
        }
    }

    /// Record a failure; the error propagates only with the debug override
    fn fail(&mut self, kind: ScanKind, e: ImportError) -> Result<()> {
        error!("{:?} scan failed: {}", kind, e);
        self.scan_state = ScanState::Failed {
            kind,
            message: e.to_string(),
        };

        if self.settings.surface_errors() {
            Err(e)
        } else {
            Ok(())
        }
    }
}

impl Drop for InstalledGamesController {
    fn drop(&mut self) {
        if let Some(active) = self.active_scan.take() {
            active.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for InstalledGamesController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstalledGamesController")
            .field("programs", &self.programs.len())
            .field("hide_imported", &self.hide_imported)
            .field("scan_state", &self.scan_state)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
