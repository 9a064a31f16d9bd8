//! Field-wide state: weather and arena tags.
//!
//! Tags are a closed enumeration (`ArenaTag`) whose variants implement
//! `ArenaTagBehavior`. Families with shared semantics get a capability trait on
//! top (`ProtectionTag`, `ScreenTag`, `EntryHazard`, `RoomTag`) so callers can
//! query a family without matching on every kind.

pub mod field;
pub mod hazards;
pub mod protection;
pub mod screens;
pub mod tags;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use field::{DelayedAttackTag, FieldEffectTag, RoomEffectTag, RoomTag};
pub use hazards::{EntryHazard, HazardTag};
pub use protection::{GuardTag, ProtectionTag};
pub use screens::{ScreenTag, WallTag};
pub use tags::{ArenaTag, ArenaTagBehavior, NewTag, TagCore};

use crate::battle::combatant::Combatant;
use crate::battle::events::{BattleEvent, EventBus};
use crate::battle::rng::BattleRng;
use crate::move_data::MoveData;
use crate::{ArenaTagSide, ArenaTagType, Biome, MoveCategory, PokemonType, WeatherType};

/// What a tag may touch while it runs a hook.
pub struct TagEnv<'a> {
    pub events: &'a mut EventBus,
    pub rng: &'a mut BattleRng,
}

/// The situation a tag is applied to, with the values it may modify.
pub enum TagApply<'a> {
    MovePower {
        move_type: PokemonType,
        multiplier: &'a mut f64,
    },
    MoveType {
        move_type: &'a mut PokemonType,
    },
    /// A combatant was just sent out on the tag's side.
    Summon {
        target: &'a mut (dyn Combatant + 'static),
        grounded: bool,
    },
    TurnEnd {
        target: &'a mut (dyn Combatant + 'static),
    },
    /// An opponent is about to lower a stat.
    StatDrop {
        cancelled: &'a mut bool,
    },
    /// An opponent is about to inflict a status.
    Status {
        cancelled: &'a mut bool,
    },
    Crit {
        blocked: &'a mut bool,
    },
    Accuracy {
        multiplier: &'a mut f64,
    },
    Speed {
        multiplier: &'a mut f64,
    },
    SecondaryChance {
        multiplier: &'a mut f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagFamily {
    Protection,
    Screen,
    Hazard,
    Room,
    Field,
    DelayedAttack,
}

impl TagFamily {
    pub fn of(tag_type: ArenaTagType) -> TagFamily {
        use ArenaTagType::*;
        match tag_type {
            QuickGuard | WideGuard | MatBlock | CraftyShield => TagFamily::Protection,
            Reflect | LightScreen | AuroraVeil => TagFamily::Screen,
            Spikes | ToxicSpikes | StealthRock | StickyWeb => TagFamily::Hazard,
            TrickRoom | WonderRoom | MagicRoom => TagFamily::Room,
            DelayedAttack => TagFamily::DelayedAttack,
            Mist | Safeguard | NoCrit | MudSport | WaterSport | IonDeluge | Gravity | Tailwind
            | FireGrassPledge | WaterFirePledge | GrassWaterPledge => TagFamily::Field,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weather {
    pub weather_type: WeatherType,
    /// Turns remaining; 0 means it lasts until replaced.
    pub turns_left: u8,
}

impl Weather {
    pub fn is_permanent(&self) -> bool {
        self.turns_left == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Arena {
    pub biome: Biome,
    weather: Option<Weather>,
    tags: Vec<ArenaTag>,
}

impl Arena {
    pub fn new(biome: Biome) -> Self {
        Self {
            biome,
            weather: None,
            tags: Vec::new(),
        }
    }

    pub fn tags(&self) -> &[ArenaTag] {
        &self.tags
    }

    // --- Tags ---

    /// Active rooms; rooms always cover both sides.
    pub fn rooms(&self) -> impl Iterator<Item = &dyn RoomTag> + '_ {
        self.tags.iter().filter_map(ArenaTag::as_room)
    }

    /// Trick Room is up.
    pub fn is_order_reversed(&self) -> bool {
        self.rooms().any(|room| room.reverses_order())
    }

    pub fn defenses_swapped(&self) -> bool {
        self.rooms().any(|room| room.swaps_defenses())
    }

    pub fn items_suppressed(&self) -> bool {
        self.rooms().any(|room| room.suppresses_items())
    }

    /// Adds a tag through the factory. If a tag of the same kind already covers
    /// the side, that tag's overlap hook runs instead and this returns false.
    pub fn add_tag(&mut self, new_tag: NewTag, quiet: bool, env: &mut TagEnv<'_>) -> bool {
        if let Some(position) = self.position_on_side(new_tag.tag_type, new_tag.side) {
            let keep = self.tags[position]
                .behavior_mut()
                .on_overlap(env, new_tag.source_id);
            if !keep {
                let removed = self.tags.remove(position);
                removed.behavior().on_remove(env, false);
                debug!(tag = ?new_tag.tag_type, "overlap removed arena tag");
            }
            return false;
        }

        let Some(tag) = ArenaTag::create(&new_tag) else {
            debug!(tag = ?new_tag.tag_type, "arena tag factory produced no tag");
            return false;
        };
        tag.behavior().on_add(env, quiet);
        debug!(tag = ?new_tag.tag_type, side = ?new_tag.side, turns = new_tag.turn_count, "arena tag added");
        self.tags.push(tag);
        true
    }

    pub fn get_tag(&self, tag_type: ArenaTagType) -> Option<&ArenaTag> {
        self.tags.iter().find(|tag| tag.tag_type() == tag_type)
    }

    pub fn get_tag_on_side(&self, tag_type: ArenaTagType, side: ArenaTagSide) -> Option<&ArenaTag> {
        self.tags
            .iter()
            .find(|tag| tag.tag_type() == tag_type && tag.side().overlaps(side))
    }

    pub fn has_tag(&self, tag_type: ArenaTagType) -> bool {
        self.get_tag(tag_type).is_some()
    }

    pub fn has_tag_on_side(&self, tag_type: ArenaTagType, side: ArenaTagSide) -> bool {
        self.get_tag_on_side(tag_type, side).is_some()
    }

    pub fn find_tags_on_side(&self, family: TagFamily, side: ArenaTagSide) -> Vec<&ArenaTag> {
        self.tags
            .iter()
            .filter(|tag| tag.family() == family && tag.side().overlaps(side))
            .collect()
    }

    /// Runs `apply` on every tag of a family covering `side`. Hazards that were
    /// neutralised along the way are removed afterwards. Returns whether any
    /// tag handled the call.
    pub fn apply_tags_for_side(
        &mut self,
        family: TagFamily,
        side: ArenaTagSide,
        env: &mut TagEnv<'_>,
        args: &mut TagApply<'_>,
    ) -> bool {
        let mut handled = false;
        for tag in self
            .tags
            .iter_mut()
            .filter(|tag| tag.family() == family && tag.side().overlaps(side))
        {
            handled |= tag.behavior_mut().apply(env, args);
        }
        self.remove_neutralized(env);
        handled
    }

    /// Whether a guard covering `side` stops `move_data`.
    pub fn guards_block(&self, side: ArenaTagSide, move_data: &MoveData) -> bool {
        self.find_tags_on_side(TagFamily::Protection, side)
            .into_iter()
            .filter_map(ArenaTag::as_protection)
            .any(|guard| guard.blocks(move_data))
    }

    /// Damage multiplier from screens covering `side`. Screens do not stack
    /// and critical hits ignore them.
    pub fn screen_multiplier(
        &self,
        side: ArenaTagSide,
        category: MoveCategory,
        critical: bool,
        multiplier: f64,
    ) -> f64 {
        if critical {
            return 1.0;
        }
        let screened = self
            .find_tags_on_side(TagFamily::Screen, side)
            .into_iter()
            .filter_map(ArenaTag::as_screen)
            .any(|screen| screen.screens(category));
        if screened {
            multiplier
        } else {
            1.0
        }
    }

    /// Ticks every tag. Expired tags run `on_remove` and are returned.
    pub fn lapse_tags(&mut self, env: &mut TagEnv<'_>) -> Vec<ArenaTag> {
        let mut expired = Vec::new();
        let mut kept = Vec::with_capacity(self.tags.len());
        for mut tag in self.tags.drain(..) {
            if tag.behavior_mut().lapse(env) {
                kept.push(tag);
            } else {
                expired.push(tag);
            }
        }
        self.tags = kept;
        for tag in &expired {
            tag.behavior().on_remove(env, false);
            debug!(tag = ?tag.tag_type(), side = ?tag.side(), "arena tag expired");
        }
        expired
    }

    /// Removes every tag of a kind regardless of side.
    pub fn remove_tag(&mut self, tag_type: ArenaTagType, env: &mut TagEnv<'_>) -> bool {
        let removed = self.take_matching(|tag| tag.tag_type() == tag_type);
        for tag in &removed {
            tag.behavior().on_remove(env, false);
        }
        !removed.is_empty()
    }

    pub fn remove_tag_on_side(
        &mut self,
        tag_type: ArenaTagType,
        side: ArenaTagSide,
        quiet: bool,
        env: &mut TagEnv<'_>,
    ) -> bool {
        let removed =
            self.take_matching(|tag| tag.tag_type() == tag_type && tag.side().overlaps(side));
        for tag in &removed {
            tag.behavior().on_remove(env, quiet);
        }
        !removed.is_empty()
    }

    pub fn remove_all_tags(&mut self, quiet: bool, env: &mut TagEnv<'_>) {
        for tag in std::mem::take(&mut self.tags) {
            tag.behavior().on_remove(env, quiet);
        }
    }

    fn position_on_side(&self, tag_type: ArenaTagType, side: ArenaTagSide) -> Option<usize> {
        self.tags
            .iter()
            .position(|tag| tag.tag_type() == tag_type && tag.side().overlaps(side))
    }

    fn take_matching(&mut self, predicate: impl Fn(&ArenaTag) -> bool) -> Vec<ArenaTag> {
        let (removed, kept): (Vec<ArenaTag>, Vec<ArenaTag>) = std::mem::take(&mut self.tags)
            .into_iter()
            .partition(|tag| predicate(tag));
        self.tags = kept;
        removed
    }

    fn remove_neutralized(&mut self, env: &mut TagEnv<'_>) {
        for tag in self.take_matching(|tag| tag.behavior().is_neutralized()) {
            tag.behavior().on_remove(env, false);
        }
    }

    // --- Weather ---

    pub fn weather(&self) -> Option<Weather> {
        self.weather
    }

    pub fn weather_type(&self) -> Option<WeatherType> {
        self.weather.map(|weather| weather.weather_type)
    }

    pub fn is_weather(&self, weather_type: WeatherType) -> bool {
        self.weather_type() == Some(weather_type)
    }

    /// Starts a weather. Refuses when the same weather is already active.
    pub fn try_set_weather(
        &mut self,
        weather_type: WeatherType,
        turns: u8,
        env: &mut TagEnv<'_>,
    ) -> bool {
        if self.is_weather(weather_type) {
            return false;
        }
        self.weather = Some(Weather {
            weather_type,
            turns_left: turns,
        });
        env.events.push(BattleEvent::WeatherStarted {
            weather: weather_type,
        });
        true
    }

    /// Ticks the weather down. Returns whether weather is still active.
    pub fn lapse_weather(&mut self, env: &mut TagEnv<'_>) -> bool {
        let Some(weather) = self.weather.as_mut() else {
            return false;
        };
        if !weather.is_permanent() {
            weather.turns_left -= 1;
            if weather.turns_left == 0 {
                let ended = weather.weather_type;
                self.weather = None;
                env.events.push(BattleEvent::WeatherEnded { weather: ended });
                return false;
            }
        }
        env.events.push(BattleEvent::WeatherContinues {
            weather: weather.weather_type,
        });
        true
    }

    pub fn clear_weather(&mut self, env: &mut TagEnv<'_>) {
        if let Some(weather) = self.weather.take() {
            env.events.push(BattleEvent::WeatherEnded {
                weather: weather.weather_type,
            });
        }
    }

    /// Clears non-permanent weather and every tag.
    pub fn reset_effects(&mut self, env: &mut TagEnv<'_>) {
        if self.weather.is_some_and(|weather| !weather.is_permanent()) {
            self.clear_weather(env);
        }
        self.remove_all_tags(true, env);
    }
}

/// Duration weather-setting moves give. Primal weathers never lapse.
pub fn weather_duration(weather_type: WeatherType) -> u8 {
    match weather_type {
        WeatherType::HarshSun | WeatherType::HeavyRain => 0,
        _ => 5,
    }
}

#[cfg(test)]
mod tests;
