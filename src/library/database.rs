//! Database collaborator seam and batch import

use super::models::{Game, GameMetadata};
use crate::error::Result;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

/// Game database the import workflow reads from and inserts into
///
/// Methods take `&self`; implementations synchronize internally.
pub trait GameDatabase {
    /// Paths of executables already referenced by library games
    fn imported_executable_paths(&self) -> HashSet<String>;

    /// Completion status assigned to new games, if configured
    fn default_completion_status(&self) -> Option<Uuid>;

    /// Insert a game built from `metadata`
    fn import_game(&self, metadata: &GameMetadata) -> Result<Game>;

    /// Persist changes to an existing game
    fn update_game(&self, game: &Game) -> Result<()>;

    /// Start coalescing change notifications
    ///
    /// Calls nest; notifications are released when the matching number of
    /// `end_buffered_update` calls has been made. Prefer `BufferedUpdate`.
    fn begin_buffered_update(&self);

    /// Release one level of notification buffering
    fn end_buffered_update(&self);
}

/// Scope guard coalescing database change notifications
///
/// The buffer is released when the guard is dropped, on every exit path.
pub struct BufferedUpdate<'a, D: GameDatabase + ?Sized> {
    database: &'a D,
}

impl<'a, D: GameDatabase + ?Sized> BufferedUpdate<'a, D> {
    /// Begin a buffered update on `database`
    pub fn begin(database: &'a D) -> Self {
        database.begin_buffered_update();
        Self { database }
    }
}

impl<D: GameDatabase + ?Sized> Drop for BufferedUpdate<'_, D> {
    fn drop(&mut self) {
        self.database.end_buffered_update();
    }
}

/// Insert imported games, applying the library's default completion status
///
/// All insertions run in one buffered update so observers receive a single
/// change notification. Returns the inserted games in input order. On error
/// the games inserted so far stay in the library and the buffer is released.
pub fn add_importable_games<D: GameDatabase + ?Sized>(
    games: &[GameMetadata],
    database: &D,
) -> Result<Vec<Game>> {
    let default_status = database.default_completion_status();
    let _buffer = BufferedUpdate::begin(database);

    let mut added_games = Vec::with_capacity(games.len());
    for metadata in games {
        let mut added = database.import_game(metadata)?;
        if let Some(status) = default_status {
            added.completion_status_id = Some(status);
            database.update_game(&added)?;
        }

        debug!("Imported {} as {}", added.name, added.id);
        added_games.push(added);
    }

    info!("Imported {} games into the library", added_games.len());
    Ok(added_games)
}
