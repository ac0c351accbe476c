//! `gameimport` - Import installed programs into a game library
//!
//! Command-line front end of the import workflow. Each command fills the
//! program list, prints the items that pass the dedup filter and, with
//! `--import`, inserts the marked items into the library.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gameimport::{
    InstalledGamesController, JsonGameLibrary, ScanState, SystemProgramSource,
    add_importable_games,
    config::ConfigManager,
    dialogs::{DialogResult, ProgressHost, ProgressOutcome, WindowHost},
    error::get_user_friendly_error,
    utils,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "gameimport")]
#[command(about = "Import installed games into the library", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Insert the marked programs into the library
    #[arg(long, global = true)]
    import: bool,

    /// Mark every listed program for import
    #[arg(long, global = true)]
    all: bool,

    /// List programs that are already in the library too
    #[arg(long, global = true)]
    show_imported: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a folder for executables
    Scan {
        /// Folder to scan
        folder: PathBuf,
    },
    /// Detect installed programs and store apps
    Detect,
    /// List installed store apps
    Store,
    /// Add a single executable, shortcut or batch file
    Add {
        /// File to add
        file: PathBuf,
    },
    /// Choose a file or folder with the system dialog
    Pick {
        /// Choose a folder to scan instead of a single file
        #[arg(long)]
        folder: bool,
    },
}

/// Console stand-in for the modal import window
struct ConsoleHost {
    mark_all: bool,
    confirm: bool,
}

impl WindowHost for ConsoleHost {
    fn show(&self, controller: &mut InstalledGamesController) {
        match controller.wait_for_scan() {
            Ok(ScanState::Cancelled(kind)) => println!("{kind:?} scan cancelled"),
            Ok(ScanState::Failed { kind, message }) => {
                eprintln!("{kind:?} scan failed: {message}");
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}", get_user_friendly_error(&e));
                controller.close_view(DialogResult::Cancelled);
                return;
            }
        }

        let visible: Vec<usize> = controller.visible_programs().map(|(index, _)| index).collect();
        for &index in &visible {
            if self.mark_all {
                controller.set_import(index, true);
            }

            let icon = controller
                .program_icon(index)
                .map_or_else(|| "-".to_string(), |icon| format!("{}x{}", icon.width(), icon.height()));
            let item = &controller.programs()[index];
            let mark = if item.import() { "x" } else { " " };
            println!("[{mark}] {:<40} {:<8} {}", item.name(), icon, item.display_path());
        }

        let hidden = controller.programs().len() - visible.len();
        if hidden > 0 {
            println!("({hidden} already imported programs hidden)");
        }

        if self.confirm {
            controller.confirm_dialog();
        } else {
            controller.close_view(DialogResult::Cancelled);
        }
    }
}

/// Console progress indicator; Ctrl-C aborts the running scan
struct ConsoleProgress {
    interrupted: Arc<AtomicBool>,
}

impl ConsoleProgress {
    /// Route Ctrl-C to this indicator for the rest of the process
    fn install() -> Result<Self> {
        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&interrupted);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .context("Failed to install Ctrl-C handler")?;
        Ok(Self { interrupted })
    }
}

impl ProgressHost for ConsoleProgress {
    fn run(
        &self,
        title: &str,
        step: &mut dyn FnMut() -> gameimport::Result<bool>,
    ) -> gameimport::Result<ProgressOutcome> {
        eprintln!("{title}... (Ctrl-C to cancel)");
        self.interrupted.store(false, Ordering::SeqCst);

        loop {
            if self.interrupted.swap(false, Ordering::SeqCst) {
                return Ok(ProgressOutcome::Cancelled);
            }
            if step()? {
                return Ok(ProgressOutcome::Finished);
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        let message = e
            .downcast_ref::<gameimport::ImportError>()
            .map_or_else(|| format!("{e:#}"), get_user_friendly_error);
        eprintln!("Error: {message}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    utils::init_logging(&ConfigManager::data_dir()).context("Failed to initialize logging")?;

    let settings = ConfigManager::load().context("Failed to load settings")?;
    let library_dir = settings
        .library_dir
        .clone()
        .unwrap_or_else(JsonGameLibrary::default_dir);
    let library = JsonGameLibrary::open(&library_dir)
        .with_context(|| format!("Failed to open library at {}", library_dir.display()))?;

    let mut controller =
        InstalledGamesController::new(Arc::new(SystemProgramSource), &library, settings);
    controller.set_hide_imported(!cli.show_imported);

    let host = ConsoleHost {
        mark_all: cli.all,
        confirm: cli.import,
    };
    let progress = ConsoleProgress::install()?;

    let result = match cli.command {
        Command::Scan { folder } => {
            controller.scan_folder_with_progress(&folder, &progress)?;
            controller.open_view(&host)
        }
        Command::Detect => {
            controller.detect_installed_with_progress(&progress)?;
            controller.open_view(&host)
        }
        Command::Store => controller.open_view_on_store_apps(&host)?,
        Command::Add { file } => {
            if !controller.add_executable(&file)? {
                anyhow::bail!("{} is not an executable, shortcut or batch file", file.display());
            }
            controller.open_view(&host)
        }
        Command::Pick { folder } => {
            pick(&mut controller, folder)?;
            controller.run_with_progress(&progress)?;
            controller.open_view(&host)
        }
    };

    if result != Some(DialogResult::Accepted) {
        info!("Import cancelled");
        return Ok(());
    }

    let games = controller.take_selected_games();
    let added = add_importable_games(&games, &library).context("Failed to import games")?;
    library.save().context("Failed to save library")?;

    for game in &added {
        println!("Imported {} ({})", game.name, game.id);
    }
    println!("{} games imported", added.len());
    Ok(())
}

#[cfg(windows)]
fn pick(controller: &mut InstalledGamesController, folder: bool) -> Result<()> {
    let dialogs = gameimport::dialogs::NativeDialogs;
    if folder {
        controller.scan_folder_with_dialog(&dialogs)?;
    } else {
        controller.select_executable(&dialogs)?;
    }
    Ok(())
}

#[cfg(not(windows))]
fn pick(_controller: &mut InstalledGamesController, _folder: bool) -> Result<()> {
    Err(gameimport::ImportError::UnsupportedPlatform("System file dialogs").into())
}
