//! File-backed game library
//!
//! Games are kept in memory and written to `<root>\games.json` on `save()`.
//! Icon payloads go to `<root>\files\<game id>\<file name>`; a library
//! without a root keeps them in memory.
//!
//! # Change Notifications
//!
//! Observers receive `LibraryEvent`s through `subscribe()`. Outside a buffered
//! update every insert or update emits its own event; inside one, changes are
//! collected and emitted as a single event when the outermost buffer closes.

use super::database::GameDatabase;
use super::models::{CompletionStatusSettings, Game, GameMetadata};
use crate::error::{ImportError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const GAMES_FILE: &str = "games.json";
const FILES_DIR: &str = "files";

/// Change notification emitted by the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryEvent {
    /// Games were inserted or updated
    GamesChanged {
        /// Ids of inserted games
        added: Vec<Uuid>,
        /// Ids of updated games
        updated: Vec<Uuid>,
    },
}

/// Persisted library contents
#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryFile {
    games: Vec<Game>,
    #[serde(default)]
    completion_statuses: CompletionStatusSettings,
}

/// Changes collected while a buffered update is open
#[derive(Debug, Default)]
struct PendingChanges {
    depth: usize,
    added: Vec<Uuid>,
    updated: Vec<Uuid>,
}

/// JSON-file game library implementing `GameDatabase`
#[derive(Debug)]
pub struct JsonGameLibrary {
    /// Library directory, `None` for an in-memory library
    root: Option<PathBuf>,
    contents: Mutex<LibraryFile>,
    /// Icon payloads of an in-memory library, keyed by stored icon path
    memory_files: Mutex<HashMap<String, Vec<u8>>>,
    pending: Mutex<PendingChanges>,
    subscribers: Mutex<Vec<mpsc::Sender<LibraryEvent>>>,
}

impl JsonGameLibrary {
    /// Create an empty library that is never written to disk
    pub fn in_memory() -> Self {
        Self::with_contents(None, LibraryFile::default())
    }

    /// Open the library stored in `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        let games_path = root.join(GAMES_FILE);
        let contents = if games_path.exists() {
            let json = std::fs::read_to_string(&games_path)?;
            serde_json::from_str(&json)?
        } else {
            info!("No library at {}, starting empty", root.display());
            LibraryFile::default()
        };

        debug!(
            "Opened library at {} with {} games",
            root.display(),
            contents.games.len()
        );
        Ok(Self::with_contents(Some(root), contents))
    }

    fn with_contents(root: Option<PathBuf>, contents: LibraryFile) -> Self {
        Self {
            root,
            contents: Mutex::new(contents),
            memory_files: Mutex::new(HashMap::new()),
            pending: Mutex::new(PendingChanges::default()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Default library directory: `%APPDATA%\GameImport\library`
    pub fn default_dir() -> PathBuf {
        crate::config::ConfigManager::data_dir().join("library")
    }

    /// Library directory, `None` for in-memory libraries
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Write `games.json` atomically
    pub fn save(&self) -> Result<()> {
        let Some(root) = &self.root else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&*self.contents.lock())?;
        let mut temp = tempfile::NamedTempFile::new_in(root)?;
        temp.write_all(json.as_bytes())?;
        temp.persist(root.join(GAMES_FILE))
            .map_err(|e| ImportError::Io(e.error))?;

        info!("Library saved to {}", root.display());
        Ok(())
    }

    /// Snapshot of all games
    pub fn games(&self) -> Vec<Game> {
        self.contents.lock().games.clone()
    }

    /// Look up a game by id
    pub fn game(&self, id: Uuid) -> Option<Game> {
        self.contents
            .lock()
            .games
            .iter()
            .find(|game| game.id == id)
            .cloned()
    }

    /// Configure the completion status assigned to imported games
    pub fn set_default_completion_status(&self, status: Option<Uuid>) {
        self.contents.lock().completion_statuses.default_status = status;
    }

    /// Read back a game's stored icon
    pub fn icon_bytes(&self, game: &Game) -> Option<Vec<u8>> {
        let icon = game.icon.as_ref()?;
        match &self.root {
            Some(root) => std::fs::read(root.join(FILES_DIR).join(icon)).ok(),
            None => self.memory_files.lock().get(icon).cloned(),
        }
    }

    /// Receive change notifications
    pub fn subscribe(&self) -> mpsc::Receiver<LibraryEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Store an icon payload, returning the path recorded on the game
    fn store_icon(&self, game_id: Uuid, file_name: &str, content: &[u8]) -> Result<String> {
        let relative = format!("{game_id}/{file_name}");
        match &self.root {
            Some(root) => {
                let dir = root.join(FILES_DIR).join(game_id.to_string());
                std::fs::create_dir_all(&dir)?;
                std::fs::write(dir.join(file_name), content)?;
            }
            None => {
                self.memory_files
                    .lock()
                    .insert(relative.clone(), content.to_vec());
            }
        }
        Ok(relative)
    }

    fn record_change(&self, added: Option<Uuid>, updated: Option<Uuid>) {
        let mut pending = self.pending.lock();
        if pending.depth > 0 {
            pending.added.extend(added);
            pending.updated.extend(updated);
            return;
        }
        drop(pending);

        self.emit(LibraryEvent::GamesChanged {
            added: added.into_iter().collect(),
            updated: updated.into_iter().collect(),
        });
    }

    fn emit(&self, event: LibraryEvent) {
        // Drop subscribers whose receiver is gone
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl GameDatabase for JsonGameLibrary {
    fn imported_executable_paths(&self) -> HashSet<String> {
        self.contents
            .lock()
            .games
            .iter()
            .flat_map(Game::executable_paths)
            .collect()
    }

    fn default_completion_status(&self) -> Option<Uuid> {
        self.contents.lock().completion_statuses.default_status
    }

    fn import_game(&self, metadata: &GameMetadata) -> Result<Game> {
        let mut game = Game::from_metadata(metadata);

        if let Some(icon) = &metadata.icon {
            match self.store_icon(game.id, &icon.file_name, &icon.content) {
                Ok(path) => game.icon = Some(path),
                Err(e) => warn!("Failed to store icon for {}: {}", game.name, e),
            }
        }

        self.contents.lock().games.push(game.clone());
        self.record_change(Some(game.id), None);
        Ok(game)
    }

    fn update_game(&self, game: &Game) -> Result<()> {
        {
            let mut contents = self.contents.lock();
            let stored = contents
                .games
                .iter_mut()
                .find(|stored| stored.id == game.id)
                .ok_or(ImportError::GameNotFound(game.id))?;
            *stored = game.clone();
        }

        self.record_change(None, Some(game.id));
        Ok(())
    }

    fn begin_buffered_update(&self) {
        self.pending.lock().depth += 1;
    }

    fn end_buffered_update(&self) {
        let mut pending = self.pending.lock();
        if pending.depth == 0 {
            warn!("Buffered update ended without matching begin");
            return;
        }

        pending.depth -= 1;
        if pending.depth > 0 || (pending.added.is_empty() && pending.updated.is_empty()) {
            return;
        }

        let event = LibraryEvent::GamesChanged {
            added: std::mem::take(&mut pending.added),
            updated: std::mem::take(&mut pending.updated),
        };
        drop(pending);
        self.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::database::BufferedUpdate;
    use crate::library::models::{GameAction, INSTALLATION_DIRECTORY, MetadataFile};
    use crate::test_utils::create_test_dir;

    fn metadata(name: &str, install_dir: &str, relative_exe: &str) -> GameMetadata {
        GameMetadata {
            name: name.to_string(),
            install_directory: Some(install_dir.to_string()),
            is_installed: true,
            game_actions: vec![GameAction {
                name: name.to_string(),
                path: format!("{INSTALLATION_DIRECTORY}\\{relative_exe}"),
                working_dir: INSTALLATION_DIRECTORY.to_string(),
                is_play_action: true,
                ..GameAction::default()
            }],
            ..GameMetadata::default()
        }
    }

    #[test]
    fn test_imported_paths_expand_install_dir() {
        let library = JsonGameLibrary::in_memory();
        library
            .import_game(&metadata("Game", r"C:\Games\Game", r"bin\game.exe"))
            .unwrap();

        let paths = library.imported_executable_paths();
        assert!(paths.contains(r"C:\Games\Game\bin\game.exe"));
    }

    #[test]
    fn test_unbuffered_changes_emit_individually() {
        let library = JsonGameLibrary::in_memory();
        let events = library.subscribe();

        let game = library.import_game(&metadata("A", r"C:\A", "a.exe")).unwrap();
        library.update_game(&game).unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            LibraryEvent::GamesChanged {
                added: vec![game.id],
                updated: vec![]
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            LibraryEvent::GamesChanged {
                added: vec![],
                updated: vec![game.id]
            }
        );
    }

    #[test]
    fn test_nested_buffers_emit_once() {
        let library = JsonGameLibrary::in_memory();
        let events = library.subscribe();

        {
            let _outer = BufferedUpdate::begin(&library);
            library.import_game(&metadata("A", r"C:\A", "a.exe")).unwrap();
            {
                let _inner = BufferedUpdate::begin(&library);
                library.import_game(&metadata("B", r"C:\B", "b.exe")).unwrap();
            }
            assert!(events.try_recv().is_err());
        }

        let LibraryEvent::GamesChanged { added, updated } = events.try_recv().unwrap();
        assert_eq!(added.len(), 2);
        assert!(updated.is_empty());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_update_unknown_game_fails() {
        let library = JsonGameLibrary::in_memory();
        let game = Game::from_metadata(&metadata("A", r"C:\A", "a.exe"));
        assert!(matches!(
            library.update_game(&game),
            Err(ImportError::GameNotFound(id)) if id == game.id
        ));
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = create_test_dir();
        let status = Uuid::new_v4();

        let game = {
            let library = JsonGameLibrary::open(dir.path()).unwrap();
            library.set_default_completion_status(Some(status));
            let game = library.import_game(&metadata("A", r"C:\A", "a.exe")).unwrap();
            library.save().unwrap();
            game
        };

        let reopened = JsonGameLibrary::open(dir.path()).unwrap();
        assert_eq!(reopened.game(game.id), Some(game));
        assert_eq!(reopened.default_completion_status(), Some(status));
    }

    #[test]
    fn test_icon_written_under_files_dir() {
        let dir = create_test_dir();
        let library = JsonGameLibrary::open(dir.path()).unwrap();

        let mut meta = metadata("A", r"C:\A", "a.exe");
        meta.icon = Some(MetadataFile {
            file_name: "icon.png".to_string(),
            content: vec![1, 2, 3],
        });
        let game = library.import_game(&meta).unwrap();

        let expected = dir
            .path()
            .join(FILES_DIR)
            .join(game.id.to_string())
            .join("icon.png");
        assert!(expected.exists());
        assert_eq!(library.icon_bytes(&game), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_in_memory_icon_round_trip() {
        let library = JsonGameLibrary::in_memory();
        let mut meta = metadata("A", r"C:\A", "a.exe");
        meta.icon = Some(MetadataFile {
            file_name: "icon.png".to_string(),
            content: vec![9],
        });

        let game = library.import_game(&meta).unwrap();
        assert_eq!(library.icon_bytes(&game), Some(vec![9]));
    }

    #[test]
    fn test_corrupt_library_is_an_error() {
        let dir = create_test_dir();
        std::fs::write(dir.path().join(GAMES_FILE), "{ not json").unwrap();
        assert!(matches!(
            JsonGameLibrary::open(dir.path()),
            Err(ImportError::Json(_))
        ));
    }
}
