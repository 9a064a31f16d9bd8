use crate::battle::arena::tags::{ArenaTagBehavior, TagCore};
use crate::move_data::{MoveData, MoveFlags};
use crate::{ArenaTagType, MoveCategory, MoveTarget};

/// Side-wide guards that stop a class of incoming moves for one turn.
pub trait ProtectionTag {
    fn protects_against(&self, move_data: &MoveData) -> bool;

    /// Guards that still block moves flagged to go through protection.
    fn ignores_bypass(&self) -> bool {
        false
    }

    fn blocks(&self, move_data: &MoveData) -> bool {
        if move_data.has_flag(MoveFlags::IGNORE_PROTECT) && !self.ignores_bypass() {
            return false;
        }
        self.protects_against(move_data)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuardTag {
    core: TagCore,
}

impl GuardTag {
    pub fn new(core: TagCore) -> Self {
        Self { core }
    }
}

impl ProtectionTag for GuardTag {
    fn protects_against(&self, move_data: &MoveData) -> bool {
        match self.core.tag_type {
            ArenaTagType::QuickGuard => move_data.priority > 0,
            ArenaTagType::WideGuard => move_data.target.is_multi_target(),
            ArenaTagType::MatBlock => move_data.is_damaging(),
            ArenaTagType::CraftyShield => {
                move_data.category == MoveCategory::Status
                    && !move_data.target.is_field_target()
                    && move_data.target != MoveTarget::User
            }
            _ => false,
        }
    }

    fn ignores_bypass(&self) -> bool {
        self.core.tag_type == ArenaTagType::CraftyShield
    }
}

impl ArenaTagBehavior for GuardTag {
    fn core(&self) -> &TagCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TagCore {
        &mut self.core
    }
}
