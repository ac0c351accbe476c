//! Importable item: a discovered program plus its selection and icon state

use crate::icon::{IconImage, IconState};
use crate::library::MICROSOFT_STORE_SOURCE;
use crate::programs::{Program, ProgramKind};

/// Display path shown for store applications
pub const STORE_DISPLAY_PATH: &str = MICROSOFT_STORE_SOURCE;

/// A discovered program offered for import
#[derive(Debug, Clone)]
pub struct ImportableProgram {
    program: Program,
    kind: ProgramKind,
    display_path: String,
    import: bool,
    icon: IconState,
}

impl ImportableProgram {
    /// Wrap a program; the item starts unselected with an unresolved icon
    pub fn new(program: Program, kind: ProgramKind) -> Self {
        let display_path = match kind {
            ProgramKind::Win32 => program.path.clone(),
            ProgramKind::StoreApp => STORE_DISPLAY_PATH.to_string(),
        };

        Self {
            program,
            kind,
            display_path,
            import: false,
            icon: IconState::default(),
        }
    }

    /// Wrapped program
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Platform kind
    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.program.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.program.name = name.into();
    }

    /// Executable path used for dedup
    pub fn path(&self) -> &str {
        &self.program.path
    }

    /// Path shown to the user, a fixed label for store apps
    pub fn display_path(&self) -> &str {
        &self.display_path
    }

    /// Whether the item is marked for import
    pub fn import(&self) -> bool {
        self.import
    }

    /// Mark or unmark the item for import
    pub fn set_import(&mut self, import: bool) {
        self.import = import;
    }

    /// Icon of the item, resolved on first access
    pub fn icon(&mut self) -> Option<IconImage> {
        self.icon.get_or_resolve(self.kind, &self.program)
    }

    /// Icon if already resolved
    pub fn cached_icon(&self) -> Option<IconImage> {
        self.icon.cached()
    }
}
