use crate::battle::arena::field::{DelayedAttackTag, FieldEffectTag, RoomEffectTag, RoomTag};
use crate::battle::arena::hazards::{EntryHazard, HazardTag};
use crate::battle::arena::protection::{GuardTag, ProtectionTag};
use crate::battle::arena::screens::{ScreenTag, WallTag};
use crate::battle::arena::{TagApply, TagEnv, TagFamily};
use crate::battle::combatant::{BattlerIndex, CombatantId};
use crate::battle::events::BattleEvent;
use crate::{ArenaTagSide, ArenaTagType, Move, Species};

/// State every arena tag carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCore {
    pub tag_type: ArenaTagType,
    /// Turns remaining; a value below 1 never expires.
    pub turn_count: i32,
    pub source_move: Option<Move>,
    pub source_id: Option<CombatantId>,
    pub side: ArenaTagSide,
}

/// Lifecycle hooks shared by every arena tag.
pub trait ArenaTagBehavior {
    fn core(&self) -> &TagCore;
    fn core_mut(&mut self) -> &mut TagCore;

    fn on_add(&self, env: &mut TagEnv<'_>, quiet: bool) {
        if !quiet {
            let core = self.core();
            env.events.push(BattleEvent::ArenaTagAdded {
                tag: core.tag_type,
                side: core.side,
                layers: None,
            });
        }
    }

    fn on_remove(&self, env: &mut TagEnv<'_>, quiet: bool) {
        if !quiet {
            let core = self.core();
            env.events.push(BattleEvent::ArenaTagRemoved {
                tag: core.tag_type,
                side: core.side,
            });
        }
    }

    /// Called when the same kind is added again on this side by `source`.
    /// Returns whether the existing tag stays.
    fn on_overlap(&mut self, _env: &mut TagEnv<'_>, _source: Option<CombatantId>) -> bool {
        true
    }

    /// Returns whether the tag handled `args`.
    fn apply(&mut self, _env: &mut TagEnv<'_>, _args: &mut TagApply<'_>) -> bool {
        false
    }

    /// End-of-turn tick. Returns whether the tag stays.
    fn lapse(&mut self, _env: &mut TagEnv<'_>) -> bool {
        let core = self.core_mut();
        if core.turn_count < 1 {
            return true;
        }
        core.turn_count -= 1;
        core.turn_count > 0
    }

    /// A neutralised tag is removed right after the call that neutralised it.
    fn is_neutralized(&self) -> bool {
        false
    }
}

/// Factory input for `ArenaTag::create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub tag_type: ArenaTagType,
    pub turn_count: i32,
    pub side: ArenaTagSide,
    pub source_move: Option<Move>,
    pub source_id: Option<CombatantId>,
    pub source_battler: Option<(BattlerIndex, Species)>,
    pub target: Option<BattlerIndex>,
}

impl NewTag {
    pub fn new(tag_type: ArenaTagType, turn_count: i32, side: ArenaTagSide) -> Self {
        Self {
            tag_type,
            turn_count,
            side,
            source_move: None,
            source_id: None,
            source_battler: None,
            target: None,
        }
    }

    pub fn with_source(mut self, move_: Move, id: CombatantId) -> Self {
        self.source_move = Some(move_);
        self.source_id = Some(id);
        self
    }

    pub fn with_source_battler(mut self, battler: BattlerIndex, species: Species) -> Self {
        self.source_battler = Some((battler, species));
        self
    }

    pub fn with_target(mut self, target: BattlerIndex) -> Self {
        self.target = Some(target);
        self
    }

    fn core(&self) -> TagCore {
        TagCore {
            tag_type: self.tag_type,
            turn_count: self.turn_count,
            source_move: self.source_move,
            source_id: self.source_id,
            side: self.side,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArenaTag {
    Field(FieldEffectTag),
    Protection(GuardTag),
    Screen(WallTag),
    Hazard(HazardTag),
    Room(RoomEffectTag),
    DelayedAttack(DelayedAttackTag),
}

impl ArenaTag {
    /// Builds a tag for `new_tag`, or `None` when the input cannot describe one
    /// (a delayed attack without a target, source move or source battler).
    pub fn create(new_tag: &NewTag) -> Option<ArenaTag> {
        let core = new_tag.core();
        let tag = match TagFamily::of(new_tag.tag_type) {
            TagFamily::Field => ArenaTag::Field(FieldEffectTag::new(core)),
            TagFamily::Protection => ArenaTag::Protection(GuardTag::new(core)),
            TagFamily::Screen => ArenaTag::Screen(WallTag::new(core)),
            TagFamily::Hazard => ArenaTag::Hazard(HazardTag::new(core)),
            TagFamily::Room => ArenaTag::Room(RoomEffectTag::new(core)),
            TagFamily::DelayedAttack => {
                let target = new_tag.target?;
                let move_ = new_tag.source_move?;
                let (source, source_species) = new_tag.source_battler?;
                ArenaTag::DelayedAttack(DelayedAttackTag::new(
                    core,
                    source,
                    source_species,
                    target,
                    move_,
                ))
            }
        };
        Some(tag)
    }

    pub fn behavior(&self) -> &dyn ArenaTagBehavior {
        match self {
            ArenaTag::Field(tag) => tag,
            ArenaTag::Protection(tag) => tag,
            ArenaTag::Screen(tag) => tag,
            ArenaTag::Hazard(tag) => tag,
            ArenaTag::Room(tag) => tag,
            ArenaTag::DelayedAttack(tag) => tag,
        }
    }

    pub fn behavior_mut(&mut self) -> &mut dyn ArenaTagBehavior {
        match self {
            ArenaTag::Field(tag) => tag,
            ArenaTag::Protection(tag) => tag,
            ArenaTag::Screen(tag) => tag,
            ArenaTag::Hazard(tag) => tag,
            ArenaTag::Room(tag) => tag,
            ArenaTag::DelayedAttack(tag) => tag,
        }
    }

    pub fn core(&self) -> &TagCore {
        self.behavior().core()
    }

    pub fn tag_type(&self) -> ArenaTagType {
        self.core().tag_type
    }

    pub fn side(&self) -> ArenaTagSide {
        self.core().side
    }

    pub fn turn_count(&self) -> i32 {
        self.core().turn_count
    }

    pub fn family(&self) -> TagFamily {
        TagFamily::of(self.tag_type())
    }

    pub fn as_hazard(&self) -> Option<&dyn EntryHazard> {
        match self {
            ArenaTag::Hazard(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_protection(&self) -> Option<&dyn ProtectionTag> {
        match self {
            ArenaTag::Protection(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_screen(&self) -> Option<&dyn ScreenTag> {
        match self {
            ArenaTag::Screen(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_room(&self) -> Option<&dyn RoomTag> {
        match self {
            ArenaTag::Room(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_delayed_attack(&self) -> Option<&DelayedAttackTag> {
        match self {
            ArenaTag::DelayedAttack(tag) => Some(tag),
            _ => None,
        }
    }
}
