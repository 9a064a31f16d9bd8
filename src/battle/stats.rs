use crate::battle::combatant::Combatant;
use crate::StatType;

/// Stat stage multiplier: `(2 + s) / 2` above zero, `2 / (2 - s)` below.
pub fn stat_stage_multiplier(stage: i8) -> f64 {
    let stage = f64::from(stage.clamp(-6, 6));
    if stage >= 0.0 {
        (2.0 + stage) / 2.0
    } else {
        2.0 / (2.0 - stage)
    }
}

/// Accuracy and evasion use a gentler curve: `(3 + s) / 3` above zero,
/// `3 / (3 - s)` at or below.
pub fn accuracy_stage_multiplier(stage: i8) -> f64 {
    let stage = f64::from(stage.clamp(-6, 6));
    if stage > 0.0 {
        (3.0 + stage) / 3.0
    } else {
        3.0 / (3.0 - stage)
    }
}

/// Apply stat stage multipliers according to the stage table.
pub fn apply_stat_stage(base_stat: u16, stage: i8) -> u16 {
    if stage == 0 {
        return base_stat;
    }
    (f64::from(base_stat) * stat_stage_multiplier(stage)).round() as u16
}

/// A combatant's stat after its own stage, before any field or status modifier.
pub fn staged_stat(combatant: &dyn Combatant, stat: StatType) -> u16 {
    apply_stat_stage(combatant.stat(stat), combatant.stat_stage(stat))
}
