use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
    /// Used by Struggle and confusion self-hits; neutral against everything.
    Typeless,
}

impl PokemonType {
    /// Single-type matchup multiplier: 2.0, 1.0, 0.5 or 0.0.
    pub fn type_effectiveness(attacking: PokemonType, defending: PokemonType) -> f64 {
        use PokemonType::*;

        match (attacking, defending) {
            (Typeless, _) | (_, Typeless) => 1.0,

            (Normal, Ghost) => 0.0,
            (Normal, Rock | Steel) => 0.5,

            (Fire, Grass | Ice | Bug | Steel) => 2.0,
            (Fire, Fire | Water | Rock | Dragon) => 0.5,

            (Water, Fire | Ground | Rock) => 2.0,
            (Water, Water | Grass | Dragon) => 0.5,

            (Electric, Ground) => 0.0,
            (Electric, Water | Flying) => 2.0,
            (Electric, Electric | Grass | Dragon) => 0.5,

            (Grass, Water | Ground | Rock) => 2.0,
            (Grass, Fire | Grass | Poison | Flying | Bug | Dragon | Steel) => 0.5,

            (Ice, Grass | Ground | Flying | Dragon) => 2.0,
            (Ice, Fire | Water | Ice | Steel) => 0.5,

            (Fighting, Ghost) => 0.0,
            (Fighting, Normal | Ice | Rock | Dark | Steel) => 2.0,
            (Fighting, Poison | Flying | Psychic | Bug | Fairy) => 0.5,

            (Poison, Steel) => 0.0,
            (Poison, Grass | Fairy) => 2.0,
            (Poison, Poison | Ground | Rock | Ghost) => 0.5,

            (Ground, Flying) => 0.0,
            (Ground, Fire | Electric | Poison | Rock | Steel) => 2.0,
            (Ground, Grass | Bug) => 0.5,

            (Flying, Grass | Fighting | Bug) => 2.0,
            (Flying, Electric | Rock | Steel) => 0.5,

            (Psychic, Dark) => 0.0,
            (Psychic, Fighting | Poison) => 2.0,
            (Psychic, Psychic | Steel) => 0.5,

            (Bug, Grass | Psychic | Dark) => 2.0,
            (Bug, Fire | Fighting | Poison | Flying | Ghost | Steel | Fairy) => 0.5,

            (Rock, Fire | Ice | Flying | Bug) => 2.0,
            (Rock, Fighting | Ground | Steel) => 0.5,

            (Ghost, Normal) => 0.0,
            (Ghost, Psychic | Ghost) => 2.0,
            (Ghost, Dark) => 0.5,

            (Dragon, Fairy) => 0.0,
            (Dragon, Dragon) => 2.0,
            (Dragon, Steel) => 0.5,

            (Dark, Psychic | Ghost) => 2.0,
            (Dark, Fighting | Dark | Fairy) => 0.5,

            (Steel, Ice | Rock | Fairy) => 2.0,
            (Steel, Fire | Water | Electric | Steel) => 0.5,

            (Fairy, Fighting | Dragon | Dark) => 2.0,
            (Fairy, Fire | Poison | Steel) => 0.5,

            _ => 1.0,
        }
    }

    /// Combined multiplier of an attacking type against every type of the defender.
    pub fn effectiveness_against(attacking: PokemonType, defending: &[PokemonType]) -> f64 {
        defending
            .iter()
            .map(|defender| Self::type_effectiveness(attacking, *defender))
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn typeless_is_neutral_against_everything() {
        for defender in PokemonType::iter() {
            assert_eq!(
                PokemonType::type_effectiveness(PokemonType::Typeless, defender),
                1.0
            );
        }
    }

    #[test]
    fn dual_types_multiply() {
        use PokemonType::*;
        // Rock into Fire/Flying is a 4x hit, Electric into Ground/Rock is immune.
        assert_eq!(PokemonType::effectiveness_against(Rock, &[Fire, Flying]), 4.0);
        assert_eq!(PokemonType::effectiveness_against(Electric, &[Rock, Ground]), 0.0);
        assert_eq!(PokemonType::effectiveness_against(Rock, &[Steel, Flying]), 1.0);
    }
}
