use crate::battle::combatant::{Combatant, Status};
use crate::battle::rng::BattleRng;
use crate::StatusEffect;

/// Standard Poke Ball.
pub const POKE_BALL_MULTIPLIER: f64 = 1.0;

/// Gen 1 style catch rate.
/// Formula: catch_rate = min(255, (species_catch_rate * status_multiplier * ball_multiplier * hp_multiplier) / 3)
pub fn calculate_catch_rate(
    target: &dyn Combatant,
    species_catch_rate: u8,
    ball_multiplier: f64,
) -> f64 {
    let status_multiplier = status_multiplier(target.status());

    // HP-based multiplier: (max_hp * 3 - current_hp * 2) / (max_hp * 3)
    let max_hp = f64::from(target.max_hp().max(1));
    let current_hp = f64::from(target.hp());
    let hp_multiplier = (max_hp * 3.0 - current_hp * 2.0) / (max_hp * 3.0);

    let catch_rate =
        (f64::from(species_catch_rate) * status_multiplier * ball_multiplier * hp_multiplier) / 3.0;
    catch_rate.min(255.0)
}

fn status_multiplier(status: Option<Status>) -> f64 {
    match status.map(|status| status.effect) {
        Some(StatusEffect::Sleep | StatusEffect::Freeze) => 2.0,
        Some(_) => 1.5,
        None => 1.0,
    }
}

/// Rolls `rand_int(256)` against the catch rate.
pub fn roll_catch_success(catch_rate: f64, rng: &mut BattleRng) -> bool {
    f64::from(rng.rand_int(256, "catch roll")) < catch_rate
}

/// Escape odds out of 256 for a combatant slower than its foe.
/// `speed * 128 / foe_speed + 30 * attempts`, wrapped at 256.
pub fn escape_odds(speed: u32, foe_speed: u32, attempts: u32) -> u32 {
    (speed * 128 / foe_speed.max(1) + 30 * attempts) % 256
}

/// Faster (or equal) combatants always get away; otherwise the odds are rolled.
pub fn roll_escape(speed: u32, foe_speed: u32, attempts: u32, rng: &mut BattleRng) -> bool {
    if speed >= foe_speed {
        return true;
    }
    rng.rand_int(256, "escape roll") < escape_odds(speed, foe_speed, attempts)
}
