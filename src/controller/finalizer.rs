//! Conversion of confirmed items into library game metadata

use super::importable::ImportableProgram;
use crate::library::{
    GameAction, GameActionType, GameMetadata, INSTALLATION_DIRECTORY, MICROSOFT_STORE_SOURCE,
    MetadataFile, MetadataProperty, PC_WINDOWS_PLATFORM,
};
use crate::programs::ProgramKind;
use crate::utils::remove_trademarks;
use crate::utils::strings::replace_dir_prefix;
use std::collections::BTreeSet;
use tracing::{debug, warn};
use uuid::Uuid;

/// Build metadata for every item marked for import, in list order
///
/// Icons of the selected items are resolved if that has not happened yet.
pub fn finalize(items: &mut [ImportableProgram]) -> Vec<GameMetadata> {
    let games: Vec<_> = items
        .iter_mut()
        .filter(|item| item.import())
        .map(build_game_metadata)
        .collect();

    debug!("Finalized {} of {} items", games.len(), items.len());
    games
}

/// Build the library record for one item
pub fn build_game_metadata(item: &mut ImportableProgram) -> GameMetadata {
    let program = item.program();
    let name = remove_trademarks(&program.name);
    let kind = item.kind();

    let work_dir = program.work_dir.as_deref().filter(|dir| !dir.is_empty());
    let (path, working_dir) = match (kind, work_dir) {
        (ProgramKind::Win32, Some(dir)) => {
            let path = replace_dir_prefix(&program.path, dir, INSTALLATION_DIRECTORY)
                .unwrap_or_else(|| program.path.clone());
            (path, INSTALLATION_DIRECTORY.to_string())
        }
        _ => (program.path.clone(), String::new()),
    };

    let action = GameAction {
        name: name.clone(),
        action_type: GameActionType::File,
        path,
        arguments: program.arguments.clone(),
        working_dir,
        is_play_action: true,
    };

    let source = (kind == ProgramKind::StoreApp)
        .then(|| MetadataProperty::Name(MICROSOFT_STORE_SOURCE.to_string()));

    let mut metadata = GameMetadata {
        name,
        game_id: program.app_id.clone(),
        install_directory: program.work_dir.clone(),
        is_installed: true,
        platforms: BTreeSet::from([MetadataProperty::Spec(PC_WINDOWS_PLATFORM.to_string())]),
        source,
        game_actions: vec![action],
        icon: None,
    };

    metadata.icon = icon_file(item);
    metadata
}

/// Encode the item's icon as a uniquely named PNG, skipping the empty sentinel
fn icon_file(item: &mut ImportableProgram) -> Option<MetadataFile> {
    let icon = item.icon().filter(|icon| !icon.is_empty_sentinel())?;
    match icon.to_png() {
        Ok(content) => Some(MetadataFile {
            file_name: format!("{}.png", Uuid::new_v4()),
            content,
        }),
        Err(e) => {
            warn!("Failed to encode icon of {}: {}", item.name(), e);
            None
        }
    }
}
