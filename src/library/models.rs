//! Library data models
//!
//! `GameMetadata` is what the import workflow produces, `Game` is what the
//! database stores after insertion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Placeholder expanded to a game's install directory at launch time
pub const INSTALLATION_DIRECTORY: &str = "{InstallDir}";

/// Platform spec id of Windows PC games
pub const PC_WINDOWS_PLATFORM: &str = "pc_windows";

/// Source name of store applications
pub const MICROSOFT_STORE_SOURCE: &str = "Microsoft Store";

/// Reference to a library property (platform, source, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetadataProperty {
    /// Matched or created by display name
    Name(String),
    /// Well-known property identified by spec id
    Spec(String),
}

/// How a game action is started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameActionType {
    /// Start an executable or document
    #[default]
    File,
    /// Open a URL
    Url,
}

/// Launch action of a game
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameAction {
    /// Display name
    pub name: String,
    /// Action type
    pub action_type: GameActionType,
    /// Path to start, may contain `{InstallDir}`
    pub path: String,
    /// Launch arguments
    pub arguments: Option<String>,
    /// Working directory, may be `{InstallDir}` or empty
    pub working_dir: String,
    /// Whether this action starts the game itself
    pub is_play_action: bool,
}

impl GameAction {
    /// Path with the install directory placeholder expanded
    pub fn expanded_path(&self, install_directory: Option<&str>) -> String {
        match install_directory {
            Some(dir) if !dir.is_empty() => {
                let dir = dir.trim_end_matches(['\\', '/']);
                self.path.replace(INSTALLATION_DIRECTORY, dir)
            }
            _ => self.path.clone(),
        }
    }
}

/// In-memory file attached to metadata
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFile {
    /// File name, unique per import
    pub file_name: String,
    /// File contents
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl std::fmt::Debug for MetadataFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataFile")
            .field("file_name", &self.file_name)
            .field("content_len", &self.content.len())
            .finish()
    }
}

/// Game description produced by an import, ready for insertion
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameMetadata {
    /// Display name
    pub name: String,
    /// External id (package family name for store apps)
    pub game_id: Option<String>,
    /// Install directory
    pub install_directory: Option<String>,
    /// Whether the game is installed
    pub is_installed: bool,
    /// Platforms
    pub platforms: BTreeSet<MetadataProperty>,
    /// Library source
    pub source: Option<MetadataProperty>,
    /// Launch actions
    pub game_actions: Vec<GameAction>,
    /// Icon payload
    pub icon: Option<MetadataFile>,
}

/// Game stored in the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Database id
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// External id
    pub game_id: Option<String>,
    /// Install directory
    pub install_directory: Option<String>,
    /// Whether the game is installed
    pub is_installed: bool,
    /// Platforms
    pub platforms: BTreeSet<MetadataProperty>,
    /// Library source
    pub source: Option<MetadataProperty>,
    /// Launch actions
    pub game_actions: Vec<GameAction>,
    /// Stored icon path, relative to the library's file directory
    pub icon: Option<String>,
    /// Completion status id
    pub completion_status_id: Option<Uuid>,
}

impl Game {
    /// Create a game from imported metadata; the icon is stored separately
    pub fn from_metadata(metadata: &GameMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: metadata.name.clone(),
            game_id: metadata.game_id.clone(),
            install_directory: metadata.install_directory.clone(),
            is_installed: metadata.is_installed,
            platforms: metadata.platforms.clone(),
            source: metadata.source.clone(),
            game_actions: metadata.game_actions.clone(),
            icon: None,
            completion_status_id: None,
        }
    }

    /// Expanded paths of the game's file actions
    pub fn executable_paths(&self) -> impl Iterator<Item = String> + '_ {
        self.game_actions
            .iter()
            .filter(|action| action.action_type == GameActionType::File && !action.path.is_empty())
            .map(|action| action.expanded_path(self.install_directory.as_deref()))
    }
}

/// Completion status configuration of the library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionStatusSettings {
    /// Status assigned to newly imported games
    pub default_status: Option<Uuid>,
}
