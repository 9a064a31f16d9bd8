use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::battle::arena::{Arena, TagEnv};
use crate::battle::combatant::{BattlerIndex, Combatant, CombatantId, Side};
use crate::battle::commands::{CommandSource, TurnCommand};
use crate::battle::events::{BattleEvent, EventBus};
use crate::battle::presentation::Presenter;
use crate::battle::rng::BattleRng;
use crate::battle::session::SessionHooks;
use crate::config::BattleConfig;
use crate::data::DataProvider;
use crate::errors::{BattleResult, BattleStateError};
use crate::move_data::MoveData;
use crate::{Move, Species};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    PlayerVictory,
    PlayerDefeat,
    Captured(Species),
    Fled,
    Draw,
    /// The configured turn limit was reached with both sides standing.
    TurnLimit,
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleOutcome::PlayerVictory => write!(f, "you won"),
            BattleOutcome::PlayerDefeat => write!(f, "you lost"),
            BattleOutcome::Captured(species) => write!(f, "{} was captured", species),
            BattleOutcome::Fled => write!(f, "got away"),
            BattleOutcome::Draw => write!(f, "draw"),
            BattleOutcome::TurnLimit => write!(f, "turn limit reached"),
        }
    }
}

/// One side's roster and which members occupy its field slots.
#[derive(Debug)]
pub struct Party {
    members: Vec<Box<dyn Combatant>>,
    active: [Option<usize>; 2],
}

impl Party {
    pub fn new(members: Vec<Box<dyn Combatant>>) -> Self {
        Self {
            members,
            active: [None, None],
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Box<dyn Combatant>] {
        &self.members
    }

    pub fn member(&self, index: usize) -> Option<&dyn Combatant> {
        self.members.get(index).map(|member| &**member)
    }

    pub fn member_mut(&mut self, index: usize) -> Option<&mut (dyn Combatant + 'static)> {
        self.members.get_mut(index).map(|member| &mut **member)
    }

    pub fn active_index(&self, slot: usize) -> Option<usize> {
        self.active.get(slot).copied().flatten()
    }

    pub fn is_on_field(&self, member_index: usize) -> bool {
        self.active.contains(&Some(member_index))
    }

    /// Puts a member into a field slot. Any previous occupant is recalled.
    pub fn place(&mut self, slot: usize, member_index: usize, battler: BattlerIndex) -> bool {
        if slot >= self.active.len() || member_index >= self.members.len() {
            return false;
        }
        self.clear_slot(slot);
        self.active[slot] = Some(member_index);
        if let Some(member) = self.members.get_mut(member_index) {
            member.set_battler_index(Some(battler));
        }
        true
    }

    /// Empties a field slot and returns the member that held it.
    pub fn clear_slot(&mut self, slot: usize) -> Option<usize> {
        let previous = self.active.get_mut(slot)?.take()?;
        if let Some(member) = self.members.get_mut(previous) {
            member.set_battler_index(None);
        }
        Some(previous)
    }

    /// Members that could be sent out: standing and not already on the field.
    pub fn bench_candidates(&self) -> Vec<usize> {
        self.members
            .iter()
            .enumerate()
            .filter(|(index, member)| !member.is_fainted() && !self.is_on_field(*index))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn all_fainted(&self) -> bool {
        self.members.iter().all(|member| member.is_fainted())
    }
}

#[derive(Debug)]
pub struct Field {
    parties: [Party; 2],
}

impl Field {
    pub fn new(player: Party, enemy: Party) -> Self {
        Self {
            parties: [player, enemy],
        }
    }

    pub fn party(&self, side: Side) -> &Party {
        &self.parties[side.index()]
    }

    pub fn party_mut(&mut self, side: Side) -> &mut Party {
        &mut self.parties[side.index()]
    }

    /// The combatant occupying a slot, fainted or not.
    pub fn combatant(&self, index: BattlerIndex) -> Option<&dyn Combatant> {
        let party = self.party(index.side());
        party
            .active_index(index.slot())
            .and_then(|member| party.member(member))
    }

    pub fn combatant_mut(&mut self, index: BattlerIndex) -> Option<&mut (dyn Combatant + 'static)> {
        let party = self.party_mut(index.side());
        let member = party.active_index(index.slot())?;
        party.member_mut(member)
    }

    pub fn is_active(&self, index: BattlerIndex) -> bool {
        self.combatant(index).is_some_and(|c| c.is_active())
    }

    /// Standing combatants in slot order.
    pub fn active_battlers(&self) -> Vec<BattlerIndex> {
        BattlerIndex::ALL
            .into_iter()
            .filter(|index| self.is_active(*index))
            .collect()
    }

    pub fn active_on_side(&self, side: Side) -> Vec<BattlerIndex> {
        self.active_battlers()
            .into_iter()
            .filter(|index| index.side() == side)
            .collect()
    }

    pub fn opponents_of(&self, index: BattlerIndex) -> Vec<BattlerIndex> {
        self.active_on_side(index.side().opponent())
    }

    pub fn ally_of(&self, index: BattlerIndex) -> Option<BattlerIndex> {
        let ally = BattlerIndex::from_side_slot(index.side(), 1 - index.slot())?;
        self.is_active(ally).then_some(ally)
    }

    pub fn species_at(&self, index: BattlerIndex) -> Option<Species> {
        self.combatant(index).map(|c| c.species())
    }

    pub fn id_at(&self, index: BattlerIndex) -> Option<CombatantId> {
        self.combatant(index).map(|c| c.id())
    }
}

/// Everything a phase may read or change. Passed by `&mut` to every phase.
pub struct BattleContext {
    pub config: BattleConfig,
    pub data: Rc<dyn DataProvider>,
    pub field: Field,
    pub arena: Arena,
    pub rng: BattleRng,
    pub events: EventBus,
    pub presenter: Box<dyn Presenter>,
    pub hooks: Box<dyn SessionHooks>,
    /// Indexed by `Side::index`.
    pub command_sources: [Box<dyn CommandSource>; 2],
    pub commands: BTreeMap<BattlerIndex, TurnCommand>,
    /// Speed order computed at the start of the current turn.
    pub speed_order: Vec<BattlerIndex>,
    pub turn: u32,
    pub outcome: Option<BattleOutcome>,
    pub poke_balls: u8,
    pub escape_attempts: u32,
    /// Slots that already have a `Faint` phase queued.
    pub faint_pending: BTreeSet<BattlerIndex>,
}

impl BattleContext {
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_double(&self) -> bool {
        self.config.is_double()
    }

    pub fn emit(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    /// A shared handle to the content tables that does not borrow the context.
    pub fn data(&self) -> Rc<dyn DataProvider> {
        Rc::clone(&self.data)
    }

    pub fn move_data(&self, move_: Move) -> BattleResult<MoveData> {
        Ok(self.data.require_move(move_)?.clone())
    }

    pub fn combatant(&self, index: BattlerIndex) -> Option<&dyn Combatant> {
        self.field.combatant(index)
    }

    pub fn combatant_mut(&mut self, index: BattlerIndex) -> Option<&mut (dyn Combatant + 'static)> {
        self.field.combatant_mut(index)
    }

    pub fn require_combatant(&self, index: BattlerIndex) -> BattleResult<&dyn Combatant> {
        self.field.combatant(index).ok_or_else(|| {
            warn!(battler = %index, "no combatant in slot");
            BattleStateError::MissingCombatant(index).into()
        })
    }

    pub fn require_combatant_mut(
        &mut self,
        index: BattlerIndex,
    ) -> BattleResult<&mut (dyn Combatant + 'static)> {
        match self.field.combatant_mut(index) {
            Some(combatant) => Ok(combatant),
            None => {
                warn!(battler = %index, "no combatant in slot");
                Err(BattleStateError::MissingCombatant(index).into())
            }
        }
    }

    /// Checks that the slot still holds the combatant with `id` and that it can act.
    pub fn is_same_active(&self, index: BattlerIndex, id: CombatantId) -> bool {
        self.field
            .combatant(index)
            .is_some_and(|c| c.id() == id && c.is_active())
    }

    /// The arena plus the environment its tags act through.
    pub fn split_arena(&mut self) -> (&mut Arena, TagEnv<'_>) {
        (
            &mut self.arena,
            TagEnv {
                events: &mut self.events,
                rng: &mut self.rng,
            },
        )
    }

    /// As `split_arena`, with the field alongside for tags that touch combatants.
    pub fn split_field_arena(&mut self) -> (&mut Field, &mut Arena, TagEnv<'_>) {
        (
            &mut self.field,
            &mut self.arena,
            TagEnv {
                events: &mut self.events,
                rng: &mut self.rng,
            },
        )
    }
}

impl fmt::Debug for BattleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattleContext")
            .field("turn", &self.turn)
            .field("field", &self.field)
            .field("arena", &self.arena)
            .field("commands", &self.commands)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}
