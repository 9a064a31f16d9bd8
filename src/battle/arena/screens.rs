use crate::battle::arena::tags::{ArenaTagBehavior, TagCore};
use crate::{ArenaTagType, MoveCategory};

/// Side screens that weaken incoming damage of one or both categories.
pub trait ScreenTag {
    fn screens(&self, category: MoveCategory) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WallTag {
    core: TagCore,
}

impl WallTag {
    pub fn new(core: TagCore) -> Self {
        Self { core }
    }
}

impl ScreenTag for WallTag {
    fn screens(&self, category: MoveCategory) -> bool {
        match self.core.tag_type {
            ArenaTagType::Reflect => category == MoveCategory::Physical,
            ArenaTagType::LightScreen => category == MoveCategory::Special,
            ArenaTagType::AuroraVeil => category != MoveCategory::Status,
            _ => false,
        }
    }
}

impl ArenaTagBehavior for WallTag {
    fn core(&self) -> &TagCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TagCore {
        &mut self.core
    }
}
