use crate::actions::ActionType;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Stronger actions a participant unlocks by level, limited by cooldowns
/// and sometimes by charges.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    Display,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum SpecialAbilityType {
    CriticalStrike,
    LightningBolt,
    BerserkerRage,
    LifeSteal,
    PerfectGuard,
    Sanctuary,
    Cleanse,
    TimeFreeze,
}

impl SpecialAbilityType {
    pub fn name(self) -> &'static str {
        match self {
            SpecialAbilityType::CriticalStrike => "Critical Strike",
            SpecialAbilityType::LightningBolt => "Lightning Bolt",
            SpecialAbilityType::BerserkerRage => "Berserker Rage",
            SpecialAbilityType::LifeSteal => "Life Steal",
            SpecialAbilityType::PerfectGuard => "Perfect Guard",
            SpecialAbilityType::Sanctuary => "Sanctuary",
            SpecialAbilityType::Cleanse => "Cleanse",
            SpecialAbilityType::TimeFreeze => "Time Freeze",
        }
    }

    pub fn required_level(self) -> u32 {
        match self {
            SpecialAbilityType::CriticalStrike => 1,
            SpecialAbilityType::LightningBolt
            | SpecialAbilityType::LifeSteal
            | SpecialAbilityType::Cleanse => 2,
            SpecialAbilityType::BerserkerRage | SpecialAbilityType::PerfectGuard => 3,
            SpecialAbilityType::Sanctuary => 4,
            SpecialAbilityType::TimeFreeze => 5,
        }
    }

    /// Owner turns the ability stays unavailable after use.
    pub fn cooldown(self) -> u32 {
        match self {
            SpecialAbilityType::CriticalStrike => 4,
            SpecialAbilityType::LightningBolt => 3,
            SpecialAbilityType::BerserkerRage => 6,
            SpecialAbilityType::LifeSteal | SpecialAbilityType::Cleanse => 5,
            SpecialAbilityType::PerfectGuard => 8,
            SpecialAbilityType::Sanctuary => 7,
            SpecialAbilityType::TimeFreeze => 10,
        }
    }

    /// Uses per battle, or `None` when only the cooldown limits it.
    pub fn max_charges(self) -> Option<u32> {
        match self {
            SpecialAbilityType::PerfectGuard => Some(2),
            SpecialAbilityType::TimeFreeze => Some(1),
            _ => None,
        }
    }

    /// The ordinary action whose stat category and targeting the ability borrows.
    pub fn base_action(self) -> ActionType {
        match self {
            SpecialAbilityType::CriticalStrike | SpecialAbilityType::LightningBolt => {
                ActionType::Attack
            }
            SpecialAbilityType::BerserkerRage => ActionType::Boost,
            SpecialAbilityType::LifeSteal => ActionType::Drain,
            SpecialAbilityType::PerfectGuard => ActionType::Defend,
            SpecialAbilityType::Sanctuary => ActionType::Heal,
            SpecialAbilityType::Cleanse => ActionType::Counter,
            SpecialAbilityType::TimeFreeze => ActionType::Stun,
        }
    }

    /// Extra multiplier the ability adds before the fairness cap is applied.
    pub fn power(self) -> f64 {
        match self {
            SpecialAbilityType::CriticalStrike | SpecialAbilityType::BerserkerRage => 1.2,
            SpecialAbilityType::LightningBolt | SpecialAbilityType::PerfectGuard => 1.15,
            SpecialAbilityType::Sanctuary => 1.25,
            SpecialAbilityType::LifeSteal
            | SpecialAbilityType::Cleanse
            | SpecialAbilityType::TimeFreeze => 1.0,
        }
    }

    pub fn response_text(self) -> &'static str {
        match self {
            SpecialAbilityType::CriticalStrike => "delivers a devastating critical strike!",
            SpecialAbilityType::LightningBolt => "unleashes a bolt of lightning!",
            SpecialAbilityType::BerserkerRage => "enters a berserker rage!",
            SpecialAbilityType::LifeSteal => "drains life force from the enemy!",
            SpecialAbilityType::PerfectGuard => "assumes a perfect defensive stance!",
            SpecialAbilityType::Sanctuary => "creates a healing sanctuary!",
            SpecialAbilityType::Cleanse => "purifies all negative effects!",
            SpecialAbilityType::TimeFreeze => "freezes time itself!",
        }
    }
}

/// Sequences of ordinary actions that earn a bonus on the final step.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    Display,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ComboType {
    StunAttack,
    BoostStrike,
    DrainHeal,
    ChargeBoostAttack,
    ShieldCounterStun,
    BerserkerFury,
    DefensiveMastery,
}

impl ComboType {
    pub fn name(self) -> &'static str {
        match self {
            ComboType::StunAttack => "Stunning Strike",
            ComboType::BoostStrike => "Power Strike",
            ComboType::DrainHeal => "Vampiric Recovery",
            ComboType::ChargeBoostAttack => "Overwhelming Assault",
            ComboType::ShieldCounterStun => "Defensive Mastery",
            ComboType::BerserkerFury => "Berserker's Fury",
            ComboType::DefensiveMastery => "Guardian's Resolve",
        }
    }

    pub fn sequence(self) -> &'static [ActionType] {
        use ActionType::*;
        match self {
            ComboType::StunAttack => &[Stun, Attack],
            ComboType::BoostStrike => &[Boost, Attack],
            ComboType::DrainHeal => &[Drain, Heal],
            ComboType::ChargeBoostAttack => &[Charge, Boost, Attack],
            ComboType::ShieldCounterStun => &[Shield, Counter, Stun],
            ComboType::BerserkerFury => &[Boost, Charge, Attack, Attack],
            ComboType::DefensiveMastery => &[Shield, Heal, Counter, Boost],
        }
    }

    pub fn damage_multiplier(self) -> f64 {
        match self {
            ComboType::StunAttack
            | ComboType::BoostStrike
            | ComboType::ChargeBoostAttack
            | ComboType::BerserkerFury => 1.2,
            ComboType::DrainHeal | ComboType::ShieldCounterStun | ComboType::DefensiveMastery => 1.0,
        }
    }

    /// Multiplier on every category other than damage.
    pub fn effect_multiplier(self) -> f64 {
        match self {
            ComboType::BoostStrike
            | ComboType::DrainHeal
            | ComboType::ShieldCounterStun
            | ComboType::DefensiveMastery => 1.2,
            ComboType::StunAttack | ComboType::ChargeBoostAttack | ComboType::BerserkerFury => 1.0,
        }
    }

    pub fn bonus_effects(self) -> &'static [&'static str] {
        match self {
            ComboType::StunAttack => &["guaranteed_hit"],
            ComboType::BoostStrike => &["armor_piercing"],
            ComboType::DrainHeal => &["poison_resist"],
            ComboType::ChargeBoostAttack => &["area_damage", "knockback"],
            ComboType::ShieldCounterStun => &["damage_immunity", "reflect_stun"],
            ComboType::BerserkerFury => &["frenzy_mode", "lifesteal", "crit_chance"],
            ComboType::DefensiveMastery => &["perfect_defense", "auto_heal", "damage_reflection"],
        }
    }
}
