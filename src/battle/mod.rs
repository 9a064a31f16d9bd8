pub mod arena;
pub mod battler_tags;
pub mod calculators;
pub mod catch;
pub mod combatant;
pub mod commands;
pub mod events;
pub mod hit_check;
pub mod move_effects;
pub mod phases;
pub mod presentation;
pub mod rng;
pub mod runner;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod stats;
pub mod turn_order;

#[cfg(test)]
pub mod tests;
