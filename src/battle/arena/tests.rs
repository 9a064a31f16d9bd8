use super::*;
use crate::battle::combatant::BattlerIndex;
use crate::battle::events::DamageSource;
use crate::battle::tests::common::{game_data, TestPokemonBuilder};
use crate::{Move, Species};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

struct Harness {
    events: EventBus,
    rng: BattleRng,
}

impl Harness {
    fn new() -> Self {
        Self {
            events: EventBus::new(),
            rng: BattleRng::new_for_test(vec![50; 16]),
        }
    }

    fn env(&mut self) -> TagEnv<'_> {
        TagEnv {
            events: &mut self.events,
            rng: &mut self.rng,
        }
    }
}

fn enemy_tag(tag_type: ArenaTagType, turns: i32) -> NewTag {
    NewTag::new(tag_type, turns, ArenaTagSide::Enemy)
}

fn move_data(move_: Move) -> MoveData {
    game_data().require_move(move_).expect("move in table").clone()
}

fn screen_multiplier(arena: &Arena, category: MoveCategory, critical: bool) -> f64 {
    arena.screen_multiplier(ArenaTagSide::Enemy, category, critical, 0.5)
}

fn blocks(arena: &Arena, move_: Move) -> bool {
    arena.guards_block(ArenaTagSide::Enemy, &move_data(move_))
}

#[test]
fn spikes_cap_at_three_layers_and_announce_every_use() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();

    assert!(arena.add_tag(enemy_tag(ArenaTagType::Spikes, 0), false, &mut harness.env()));
    for _ in 0..4 {
        assert!(!arena.add_tag(enemy_tag(ArenaTagType::Spikes, 0), false, &mut harness.env()));
    }

    let layers = arena
        .get_tag(ArenaTagType::Spikes)
        .and_then(ArenaTag::as_hazard)
        .map(|hazard| hazard.layers());
    assert_eq!(layers, Some(3));
    assert_eq!(arena.tags().len(), 1);

    let announced: Vec<Option<u8>> = harness
        .events
        .events()
        .iter()
        .filter_map(|event| match event {
            BattleEvent::ArenaTagAdded { layers, .. } => Some(*layers),
            _ => None,
        })
        .collect();
    assert_eq!(announced, vec![Some(1), Some(2), Some(3), Some(3), Some(3)]);
}

#[rstest]
#[case(1, 15)]
#[case(2, 20)]
#[case(3, 30)]
fn spikes_damage_scales_with_layers(#[case] layers: usize, #[case] expected: u16) {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    for _ in 0..layers {
        arena.add_tag(enemy_tag(ArenaTagType::Spikes, 0), true, &mut harness.env());
    }
    let mut snorlax = TestPokemonBuilder::new(Species::Snorlax, 50)
        .with_stats([120, 100, 100, 100, 100, 50])
        .build();
    snorlax.set_battler_index(Some(BattlerIndex::Enemy));

    arena.apply_tags_for_side(
        TagFamily::Hazard,
        ArenaTagSide::Enemy,
        &mut harness.env(),
        &mut TagApply::Summon {
            target: &mut snorlax,
            grounded: true,
        },
    );

    assert_eq!(snorlax.hp(), 120 - expected);
    assert_eq!(
        harness.events.events().last(),
        Some(&BattleEvent::IndirectDamage {
            battler: BattlerIndex::Enemy,
            species: Species::Snorlax,
            source: DamageSource::Hazard(ArenaTagType::Spikes),
            damage: expected,
        })
    );
}

#[test]
fn airborne_targets_skip_spikes() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    arena.add_tag(enemy_tag(ArenaTagType::Spikes, 0), true, &mut harness.env());
    let mut skarmory = TestPokemonBuilder::new(Species::Skarmory, 50).build();
    skarmory.set_battler_index(Some(BattlerIndex::Enemy));
    let full = skarmory.hp();

    let handled = arena.apply_tags_for_side(
        TagFamily::Hazard,
        ArenaTagSide::Enemy,
        &mut harness.env(),
        &mut TagApply::Summon {
            target: &mut skarmory,
            grounded: false,
        },
    );

    assert!(!handled);
    assert_eq!(skarmory.hp(), full);
}

#[test]
fn grounded_poison_type_absorbs_toxic_spikes() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    arena.add_tag(enemy_tag(ArenaTagType::ToxicSpikes, 0), true, &mut harness.env());
    let mut muk = TestPokemonBuilder::new(Species::Muk, 40).build();
    muk.set_battler_index(Some(BattlerIndex::Enemy));

    arena.apply_tags_for_side(
        TagFamily::Hazard,
        ArenaTagSide::Enemy,
        &mut harness.env(),
        &mut TagApply::Summon {
            target: &mut muk,
            grounded: true,
        },
    );

    assert!(muk.status().is_none());
    assert!(!arena.has_tag(ArenaTagType::ToxicSpikes));
    assert!(harness.events.events().iter().any(|event| matches!(
        event,
        BattleEvent::ArenaTagRemoved {
            tag: ArenaTagType::ToxicSpikes,
            ..
        }
    )));
}

#[test]
fn reusing_a_room_ends_it() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    let trick_room = || NewTag::new(ArenaTagType::TrickRoom, 5, ArenaTagSide::Both);

    assert!(arena.add_tag(trick_room(), false, &mut harness.env()));
    assert!(arena.is_order_reversed());
    assert!(!arena.add_tag(trick_room(), false, &mut harness.env()));
    assert!(!arena.is_order_reversed());
    assert!(arena.tags().is_empty());
}

#[test]
fn room_on_both_sides_is_seen_from_either_side() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    arena.add_tag(
        NewTag::new(ArenaTagType::MagicRoom, 5, ArenaTagSide::Both),
        false,
        &mut harness.env(),
    );
    assert!(arena.has_tag_on_side(ArenaTagType::MagicRoom, ArenaTagSide::Player));
    assert!(arena.has_tag_on_side(ArenaTagType::MagicRoom, ArenaTagSide::Enemy));
    assert!(arena.items_suppressed());
    assert!(!arena.defenses_swapped());
}

#[test]
fn screens_do_not_stack_and_crits_ignore_them() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    arena.add_tag(enemy_tag(ArenaTagType::Reflect, 5), false, &mut harness.env());
    arena.add_tag(enemy_tag(ArenaTagType::AuroraVeil, 5), false, &mut harness.env());

    assert_eq!(screen_multiplier(&arena, MoveCategory::Physical, false), 0.5);
    assert_eq!(screen_multiplier(&arena, MoveCategory::Special, false), 0.5);
    assert_eq!(screen_multiplier(&arena, MoveCategory::Physical, true), 1.0);
    assert_eq!(screen_multiplier(&arena, MoveCategory::Status, false), 1.0);
}

#[test]
fn screens_only_cover_their_own_side() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    arena.add_tag(
        NewTag::new(ArenaTagType::LightScreen, 5, ArenaTagSide::Player),
        false,
        &mut harness.env(),
    );
    assert_eq!(screen_multiplier(&arena, MoveCategory::Special, false), 1.0);
}

#[rstest]
#[case(ArenaTagType::QuickGuard, Move::QuickAttack, true)]
#[case(ArenaTagType::QuickGuard, Move::Tackle, false)]
#[case(ArenaTagType::WideGuard, Move::Earthquake, true)]
#[case(ArenaTagType::WideGuard, Move::RockSlide, true)]
#[case(ArenaTagType::WideGuard, Move::Tackle, false)]
#[case(ArenaTagType::MatBlock, Move::Tackle, true)]
#[case(ArenaTagType::MatBlock, Move::Growl, false)]
#[case(ArenaTagType::MatBlock, Move::FutureSight, false)]
#[case(ArenaTagType::CraftyShield, Move::ThunderWave, true)]
#[case(ArenaTagType::CraftyShield, Move::Tackle, false)]
fn guards_block_their_class_of_moves(#[case] guard: ArenaTagType, #[case] move_: Move, #[case] expected: bool) {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    arena.add_tag(enemy_tag(guard, 1), false, &mut harness.env());
    assert_eq!(blocks(&arena, move_), expected);
}

#[test]
fn family_query_finds_only_tags_covering_the_side() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    arena.add_tag(enemy_tag(ArenaTagType::QuickGuard, 1), false, &mut harness.env());
    arena.add_tag(enemy_tag(ArenaTagType::Reflect, 5), false, &mut harness.env());
    arena.add_tag(
        NewTag::new(ArenaTagType::WideGuard, 1, ArenaTagSide::Player),
        false,
        &mut harness.env(),
    );

    let enemy_guards: Vec<ArenaTagType> = arena
        .find_tags_on_side(TagFamily::Protection, ArenaTagSide::Enemy)
        .into_iter()
        .map(ArenaTag::tag_type)
        .collect();
    assert_eq!(enemy_guards, vec![ArenaTagType::QuickGuard]);

    let both: Vec<ArenaTagType> = arena
        .find_tags_on_side(TagFamily::Protection, ArenaTagSide::Both)
        .into_iter()
        .map(ArenaTag::tag_type)
        .collect();
    assert_eq!(both, vec![ArenaTagType::QuickGuard, ArenaTagType::WideGuard]);

    let reflect = arena.get_tag(ArenaTagType::Reflect).expect("reflect added");
    assert!(reflect.as_screen().is_some());
    assert!(reflect.as_protection().is_none());
    let screens = reflect.as_screen().expect("screen cast");
    assert!(screens.screens(MoveCategory::Physical));
    assert!(!screens.screens(MoveCategory::Special));
}

#[test]
fn guards_expire_after_one_turn() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    arena.add_tag(enemy_tag(ArenaTagType::QuickGuard, 1), false, &mut harness.env());

    let expired = arena.lapse_tags(&mut harness.env());
    assert_eq!(expired.len(), 1);
    assert!(!blocks(&arena, Move::QuickAttack));
}

#[test]
fn delayed_attack_needs_a_target() {
    let untargeted = NewTag::new(ArenaTagType::DelayedAttack, 3, ArenaTagSide::Enemy)
        .with_source(Move::FutureSight, 1)
        .with_source_battler(BattlerIndex::Player, Species::Alakazam);
    assert!(ArenaTag::create(&untargeted).is_none());

    let targeted = untargeted.with_target(BattlerIndex::Enemy);
    let tag = ArenaTag::create(&targeted).expect("targeted delayed attack");
    let delayed = tag.as_delayed_attack().expect("delayed attack variant");
    assert_eq!(delayed.target(), BattlerIndex::Enemy);
    assert_eq!(delayed.source(), BattlerIndex::Player);
    assert_eq!(tag.core().source_id, Some(1));
}

#[test]
fn delayed_attack_is_announced_on_add_and_silent_on_expiry() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    let tag = NewTag::new(ArenaTagType::DelayedAttack, 1, ArenaTagSide::Enemy)
        .with_source(Move::FutureSight, 1)
        .with_source_battler(BattlerIndex::Player, Species::Alakazam)
        .with_target(BattlerIndex::Enemy);
    arena.add_tag(tag, false, &mut harness.env());

    let expired = arena.lapse_tags(&mut harness.env());
    assert_eq!(expired.len(), 1);
    assert_eq!(
        harness.events.events(),
        &[BattleEvent::DelayedAttackForeseen {
            battler: BattlerIndex::Player,
            species: Species::Alakazam,
            move_: Move::FutureSight,
        }]
    );
}

#[test]
fn same_weather_is_refused() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    assert!(arena.try_set_weather(WeatherType::Rain, 5, &mut harness.env()));
    assert!(!arena.try_set_weather(WeatherType::Rain, 5, &mut harness.env()));
    assert!(arena.try_set_weather(WeatherType::Sandstorm, 5, &mut harness.env()));
    assert!(arena.is_weather(WeatherType::Sandstorm));
}

#[test]
fn weather_runs_out() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    arena.try_set_weather(WeatherType::Sunny, 2, &mut harness.env());

    assert!(arena.lapse_weather(&mut harness.env()));
    assert!(!arena.lapse_weather(&mut harness.env()));
    assert_eq!(arena.weather(), None);
    assert_eq!(
        harness.events.events().last(),
        Some(&BattleEvent::WeatherEnded {
            weather: WeatherType::Sunny
        })
    );
}

#[test]
fn primal_weather_survives_lapse_and_reset() {
    let mut arena = Arena::default();
    let mut harness = Harness::new();
    let turns = weather_duration(WeatherType::HeavyRain);
    arena.try_set_weather(WeatherType::HeavyRain, turns, &mut harness.env());
    arena.add_tag(enemy_tag(ArenaTagType::Spikes, 0), true, &mut harness.env());

    for _ in 0..10 {
        assert!(arena.lapse_weather(&mut harness.env()));
    }
    arena.reset_effects(&mut harness.env());
    assert!(arena.is_weather(WeatherType::HeavyRain));
    assert!(arena.tags().is_empty());
}

proptest! {
    #[test]
    fn timed_tags_expire_on_their_last_turn(turns in 1i32..20) {
        let mut arena = Arena::default();
        let mut harness = Harness::new();
        arena.add_tag(enemy_tag(ArenaTagType::Mist, turns), true, &mut harness.env());

        for _ in 1..turns {
            prop_assert!(arena.lapse_tags(&mut harness.env()).is_empty());
        }
        let expired = arena.lapse_tags(&mut harness.env());
        prop_assert_eq!(expired.len(), 1);
        prop_assert!(!arena.has_tag(ArenaTagType::Mist));
    }

    #[test]
    fn untimed_tags_never_expire(turns in -5i32..=0, lapses in 1usize..50) {
        let mut arena = Arena::default();
        let mut harness = Harness::new();
        arena.add_tag(enemy_tag(ArenaTagType::StealthRock, turns), true, &mut harness.env());

        for _ in 0..lapses {
            prop_assert!(arena.lapse_tags(&mut harness.env()).is_empty());
        }
        prop_assert!(arena.has_tag_on_side(ArenaTagType::StealthRock, ArenaTagSide::Enemy));
    }
}
