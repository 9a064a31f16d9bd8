use crate::battle::arena::{TagApply, TagFamily};
use crate::battle::battler_tags::BattlerTagType;
use crate::battle::combatant::BattlerIndex;
use crate::battle::rng::BattleRng;
use crate::battle::state::BattleContext;
use crate::battle::stats::accuracy_stage_multiplier;
use crate::errors::BattleResult;
use crate::move_data::{MoveData, MoveFlags, MultiHitKind};
use crate::{ArenaTagSide, MoveTarget, StatType};

/// Percent threshold a `rand_int(100)` roll must stay under.
pub fn hit_threshold(
    accuracy: u8,
    field_multiplier: f64,
    accuracy_stage: i8,
    evasion_stage: i8,
) -> f64 {
    let stage = (accuracy_stage - evasion_stage).clamp(-6, 6);
    f64::from(accuracy) * field_multiplier * accuracy_stage_multiplier(stage)
}

pub fn roll_hit(threshold: f64, rng: &mut BattleRng) -> bool {
    f64::from(rng.rand_int(100, "accuracy")) < threshold
}

/// Number of strikes for one action. Rolled once, before the first strike.
pub fn roll_hit_count(kind: Option<MultiHitKind>, rng: &mut BattleRng) -> u8 {
    match kind {
        None => 1,
        Some(MultiHitKind::Fixed(hits)) => hits.max(1),
        Some(MultiHitKind::TwoToFive) => match rng.rand_int(16, "multi-hit count") {
            10.. => 2,
            4.. => 3,
            2.. => 4,
            _ => 5,
        },
    }
}

/// Whether strike number `strike` (zero-based) of `move_data` lands on `target`.
pub fn check_hit(
    ctx: &mut BattleContext,
    user: BattlerIndex,
    target: BattlerIndex,
    move_data: &MoveData,
    strike: u8,
) -> BattleResult<bool> {
    if move_data.target == MoveTarget::User || move_data.target.is_field_target() {
        return Ok(true);
    }
    if strike > 0 && !move_data.has_flag(MoveFlags::CHECK_ALL_HITS) {
        return Ok(true);
    }

    let attacker = ctx.require_combatant(user)?;
    // Lock-On only remembers the single most recent move.
    let locked_on = attacker.tags().has(BattlerTagType::IgnoreAccuracy)
        && attacker
            .move_history()
            .last()
            .is_some_and(|entry| entry.targets.contains(&target));
    if locked_on {
        return Ok(true);
    }
    let accuracy_stage = attacker.stat_stage(StatType::Accuracy);

    let defender = ctx.require_combatant(target)?;
    if defender.tags().has(BattlerTagType::SemiInvulnerable) {
        return Ok(false);
    }
    let Some(accuracy) = move_data.accuracy else {
        return Ok(true);
    };
    let evasion_stage = defender.stat_stage(StatType::Evasion);

    let mut field_multiplier = 1.0;
    let (arena, mut env) = ctx.split_arena();
    arena.apply_tags_for_side(
        TagFamily::Field,
        ArenaTagSide::Both,
        &mut env,
        &mut TagApply::Accuracy {
            multiplier: &mut field_multiplier,
        },
    );

    let threshold = hit_threshold(accuracy, field_multiplier, accuracy_stage, evasion_stage);
    Ok(roll_hit(threshold, &mut ctx.rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(15, 2)]
    #[case(10, 2)]
    #[case(9, 3)]
    #[case(4, 3)]
    #[case(3, 4)]
    #[case(2, 4)]
    #[case(1, 5)]
    #[case(0, 5)]
    fn two_to_five_table(#[case] raw: u32, #[case] expected: u8) {
        let mut rng = BattleRng::new_for_test(vec![raw]);
        assert_eq!(roll_hit_count(Some(MultiHitKind::TwoToFive), &mut rng), expected);
    }

    #[test]
    fn fixed_counts_do_not_draw() {
        let mut rng = BattleRng::new_for_test(vec![]);
        assert_eq!(roll_hit_count(Some(MultiHitKind::Fixed(2)), &mut rng), 2);
        assert_eq!(roll_hit_count(None, &mut rng), 1);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn stage_difference_is_clamped() {
        assert_eq!(hit_threshold(90, 1.0, 6, -6), hit_threshold(90, 1.0, 6, 0));
        assert_eq!(hit_threshold(90, 1.0, 0, 0), 90.0);
        assert!((hit_threshold(90, 5.0 / 3.0, 0, 0) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn roll_compares_strictly() {
        let mut rng = BattleRng::new_for_test(vec![89, 90]);
        assert!(roll_hit(90.0, &mut rng));
        assert!(!roll_hit(90.0, &mut rng));
    }

    proptest! {
        // Exactly `accuracy` of the 100 possible rolls hit at parity.
        #[test]
        fn parity_hit_chance_is_accuracy(accuracy in 1u8..=100) {
            let threshold = hit_threshold(accuracy, 1.0, 0, 0);
            let hits = (0u32..100)
                .filter(|raw| roll_hit(threshold, &mut BattleRng::new_for_test(vec![*raw])))
                .count();
            prop_assert_eq!(hits, usize::from(accuracy));
        }
    }
}
