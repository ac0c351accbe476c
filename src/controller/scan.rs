//! Background scan worker
//!
//! A scan runs one enumeration on its own thread and reports a single
//! `ScanMessage` over an `mpsc` channel. Messages carry the generation of the
//! scan that produced them so the owning controller can drop results of
//! scans it has already replaced or cancelled.

use super::importable::ImportableProgram;
use crate::error::{ImportError, Result};
use crate::programs::{CancelToken, Enumeration, Program, ProgramKind, ProgramSource};
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;
use tracing::{debug, info};

/// Discovery strategy of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// Executables below a folder
    Folder,
    /// Installed Win32 programs, plus store apps where supported
    Installed,
    /// Store apps only
    StoreApps,
}

/// Scan lifecycle as seen by the controller
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    /// No scan has run
    #[default]
    Idle,
    /// A background scan is in flight
    Scanning(ScanKind),
    /// Results were applied to the list
    Completed {
        /// Strategy that ran
        kind: ScanKind,
        /// Number of programs found
        count: usize,
    },
    /// The scan was cancelled, the list is unchanged
    Cancelled(ScanKind),
    /// The scan failed, the list is unchanged
    Failed {
        /// Strategy that ran
        kind: ScanKind,
        /// Logged error message
        message: String,
    },
}

/// What a background scan enumerates
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScanRequest {
    Folder { root: PathBuf, recursive: bool },
    Installed { include_store_apps: bool },
}

impl ScanRequest {
    pub(crate) fn kind(&self) -> ScanKind {
        match self {
            Self::Folder { .. } => ScanKind::Folder,
            Self::Installed { .. } => ScanKind::Installed,
        }
    }
}

/// Result of one scan
#[derive(Debug)]
pub(crate) enum ScanOutcome {
    Completed(Vec<ImportableProgram>),
    Cancelled,
    Failed(ImportError),
}

/// Message sent from a worker to the controller
#[derive(Debug)]
pub(crate) struct ScanMessage {
    pub(crate) generation: u64,
    pub(crate) outcome: ScanOutcome,
}

/// Scan currently owned by the controller
#[derive(Debug)]
pub(crate) struct ActiveScan {
    pub(crate) generation: u64,
    pub(crate) kind: ScanKind,
    pub(crate) cancel: CancelToken,
    pub(crate) worker: JoinHandle<()>,
}

/// Start `request` on a new worker thread
pub(crate) fn spawn_scan(
    source: Arc<dyn ProgramSource>,
    request: ScanRequest,
    generation: u64,
    results: mpsc::Sender<ScanMessage>,
) -> Result<ActiveScan> {
    let kind = request.kind();
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();

    let worker = std::thread::Builder::new()
        .name(format!("scan-{generation}"))
        .spawn(move || {
            let outcome = run_scan(source.as_ref(), &request, &worker_cancel);
            // The controller may be gone already
            let _ = results.send(ScanMessage {
                generation,
                outcome,
            });
        })
        .map_err(|e| ImportError::ScanWorker(e.to_string()))?;

    debug!("Started {:?} scan #{}", kind, generation);
    Ok(ActiveScan {
        generation,
        kind,
        cancel,
        worker,
    })
}

/// Run one scan to completion on the calling thread
pub(crate) fn run_scan(
    source: &dyn ProgramSource,
    request: &ScanRequest,
    cancel: &CancelToken,
) -> ScanOutcome {
    match collect(source, request, cancel) {
        Ok(Some(items)) => ScanOutcome::Completed(items),
        Ok(None) => ScanOutcome::Cancelled,
        Err(e) => ScanOutcome::Failed(e),
    }
}

fn collect(
    source: &dyn ProgramSource,
    request: &ScanRequest,
    cancel: &CancelToken,
) -> Result<Option<Vec<ImportableProgram>>> {
    let mut items = match request {
        ScanRequest::Folder { root, recursive } => {
            info!("Scanning {} for executables", root.display());
            match source.executables_in_folder(root, *recursive, cancel)? {
                Enumeration::Complete(programs) => wrap(programs, ProgramKind::Win32),
                Enumeration::Cancelled => return Ok(None),
            }
        }
        ScanRequest::Installed { include_store_apps } => {
            info!("Detecting installed programs");
            let mut items = match source.installed_programs(cancel)? {
                Enumeration::Complete(programs) => wrap(programs, ProgramKind::Win32),
                Enumeration::Cancelled => return Ok(None),
            };

            if *include_store_apps {
                if cancel.is_cancelled() {
                    return Ok(None);
                }
                items.extend(wrap(source.store_apps()?, ProgramKind::StoreApp));
            }
            items
        }
    };

    sort_by_name(&mut items);
    Ok(Some(items))
}

pub(crate) fn wrap(programs: Vec<Program>, kind: ProgramKind) -> Vec<ImportableProgram> {
    programs
        .into_iter()
        .map(|program| ImportableProgram::new(program, kind))
        .collect()
}

/// Ascending by name, ordinal comparison; ties keep enumeration order
pub(crate) fn sort_by_name(items: &mut [ImportableProgram]) {
    items.sort_by(|a, b| a.name().cmp(b.name()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StringError;
    use std::path::Path;

    struct StaticSource {
        installed: Vec<Program>,
        store: Result<Vec<Program>>,
    }

    fn program(name: &str) -> Program {
        Program {
            name: name.to_string(),
            path: format!(r"C:\{name}\{name}.exe"),
            ..Program::default()
        }
    }

    impl ProgramSource for StaticSource {
        fn installed_programs(&self, cancel: &CancelToken) -> Result<Enumeration> {
            if cancel.is_cancelled() {
                return Ok(Enumeration::Cancelled);
            }
            Ok(Enumeration::Complete(self.installed.clone()))
        }

        fn store_apps(&self) -> Result<Vec<Program>> {
            match &self.store {
                Ok(programs) => Ok(programs.clone()),
                Err(e) => Err(ImportError::StoreEnumeration(StringError::new(e.to_string()))),
            }
        }

        fn executables_in_folder(
            &self,
            root: &Path,
            _recursive: bool,
            _cancel: &CancelToken,
        ) -> Result<Enumeration> {
            Err(ImportError::Enumeration(StringError::new(format!(
                "{} not found",
                root.display()
            ))))
        }

        fn program_from_path(&self, path: &Path) -> Result<Program> {
            Ok(program(&path.display().to_string()))
        }
    }

    fn names(items: &[ImportableProgram]) -> Vec<&str> {
        items.iter().map(ImportableProgram::name).collect()
    }

    #[test]
    fn test_installed_with_store_apps_sorted() {
        let source = StaticSource {
            installed: vec![program("Zeta"), program("Alpha")],
            store: Ok(vec![program("Mahjong")]),
        };
        let request = ScanRequest::Installed {
            include_store_apps: true,
        };

        let ScanOutcome::Completed(items) = run_scan(&source, &request, &CancelToken::new()) else {
            panic!("scan should complete");
        };
        assert_eq!(names(&items), vec!["Alpha", "Mahjong", "Zeta"]);
        assert_eq!(items[1].kind(), ProgramKind::StoreApp);
        assert_eq!(items[0].kind(), ProgramKind::Win32);
    }

    #[test]
    fn test_store_apps_skipped_when_not_requested() {
        let source = StaticSource {
            installed: vec![program("Alpha")],
            store: Ok(vec![program("Mahjong")]),
        };
        let request = ScanRequest::Installed {
            include_store_apps: false,
        };

        let ScanOutcome::Completed(items) = run_scan(&source, &request, &CancelToken::new()) else {
            panic!("scan should complete");
        };
        assert_eq!(names(&items), vec!["Alpha"]);
    }

    #[test]
    fn test_store_failure_fails_detection() {
        let source = StaticSource {
            installed: vec![program("Alpha")],
            store: Err(ImportError::UnsupportedPlatform("Store apps")),
        };
        let request = ScanRequest::Installed {
            include_store_apps: true,
        };

        assert!(matches!(
            run_scan(&source, &request, &CancelToken::new()),
            ScanOutcome::Failed(ImportError::StoreEnumeration(_))
        ));
    }

    #[test]
    fn test_cancelled_token_yields_cancelled() {
        let source = StaticSource {
            installed: vec![program("Alpha")],
            store: Ok(Vec::new()),
        };
        let cancel = CancelToken::new();
        cancel.cancel();

        let request = ScanRequest::Installed {
            include_store_apps: true,
        };
        assert!(matches!(
            run_scan(&source, &request, &cancel),
            ScanOutcome::Cancelled
        ));
    }

    #[test]
    fn test_worker_reports_generation() {
        let source: Arc<dyn ProgramSource> = Arc::new(StaticSource {
            installed: vec![program("Alpha")],
            store: Ok(Vec::new()),
        });
        let (tx, rx) = mpsc::channel();

        let scan = spawn_scan(
            source,
            ScanRequest::Folder {
                root: PathBuf::from("missing"),
                recursive: true,
            },
            7,
            tx,
        )
        .unwrap();
        assert_eq!(scan.kind, ScanKind::Folder);

        let message = rx.recv().unwrap();
        assert_eq!(message.generation, 7);
        assert!(matches!(message.outcome, ScanOutcome::Failed(_)));
        scan.worker.join().unwrap();
    }

    #[test]
    fn test_sort_is_stable_and_ordinal() {
        let mut items = wrap(
            vec![program("b"), program("B"), program("a")],
            ProgramKind::Win32,
        );
        sort_by_name(&mut items);
        assert_eq!(names(&items), vec!["B", "a", "b"]);
    }
}
