use crate::battle::abilities::AbilitySlot;
use crate::battle::state::{BattleAction, BattleResult};
use schema::{ActionType, ModifierType, SpecialAbilityType};
use serde::{Deserialize, Serialize};

/// A named adjustment to a stat.
///
/// A `duration` of zero marks an instantaneous modifier that was folded into
/// a single result and only exists for the audit trail. Lasting modifiers
/// live on a participant and count down once per turn that participant takes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleModifier {
    pub modifier_type: ModifierType,
    pub value: f64,
    pub duration: u32,
    pub source: String,
}

impl BattleModifier {
    pub fn new(
        modifier_type: ModifierType,
        value: f64,
        duration: u32,
        source: impl Into<String>,
    ) -> Self {
        Self {
            modifier_type,
            value,
            duration,
            source: source.into(),
        }
    }

    /// An audit-only record of a value that was folded into a result.
    pub fn instant(modifier_type: ModifierType, value: f64, source: impl Into<String>) -> Self {
        Self::new(modifier_type, value, 0, source)
    }

    pub fn is_lasting(&self) -> bool {
        self.duration > 0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleStats {
    pub hp: f64,
    pub max_hp: f64,
    pub attack: f64,
    pub defense: f64,
    pub speed: f64,
    pub modifiers: Vec<BattleModifier>,
}

impl BattleStats {
    /// Fresh stats at full health with no modifiers.
    pub fn new(max_hp: f64, attack: f64, defense: f64, speed: f64) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            attack,
            defense,
            speed,
            modifiers: Vec::new(),
        }
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp > 0.0 {
            self.hp / self.max_hp
        } else {
            0.0
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0.0
    }

    /// Remove up to `amount` HP. Returns the HP actually lost.
    pub fn take_damage(&mut self, amount: f64) -> f64 {
        let dealt = amount.max(0.0).min(self.hp.max(0.0));
        self.hp = (self.hp - dealt).max(0.0);
        dealt
    }

    /// Restore up to `amount` HP without exceeding max. Returns the HP actually restored.
    pub fn heal(&mut self, amount: f64) -> f64 {
        let missing = (self.max_hp - self.hp).max(0.0);
        let restored = amount.max(0.0).min(missing);
        self.hp += restored;
        restored
    }

    pub fn has_modifier(&self, modifier_type: ModifierType) -> bool {
        self.modifiers
            .iter()
            .any(|m| m.modifier_type == modifier_type && m.is_lasting())
    }

    pub fn modifiers_of(&self, modifier_type: ModifierType) -> impl Iterator<Item = &BattleModifier> {
        self.modifiers
            .iter()
            .filter(move |m| m.modifier_type == modifier_type && m.is_lasting())
    }

    /// Fraction of incoming damage that gets through all active Defense modifiers.
    pub fn damage_taken_factor(&self) -> f64 {
        self.modifiers_of(ModifierType::Defense)
            .map(|m| 1.0 - m.value.clamp(0.0, 1.0))
            .product()
    }

    /// Let Shield modifiers soak up damage, spending their value. Returns what gets through.
    pub fn absorb_with_shields(&mut self, amount: f64) -> f64 {
        let mut remaining = amount.max(0.0);
        for shield in self
            .modifiers
            .iter_mut()
            .filter(|m| m.modifier_type == ModifierType::Shield && m.is_lasting())
        {
            if remaining <= 0.0 {
                break;
            }
            let absorbed = remaining.min(shield.value.max(0.0));
            shield.value -= absorbed;
            remaining -= absorbed;
        }
        self.modifiers
            .retain(|m| m.modifier_type != ModifierType::Shield || m.value > 0.0);
        remaining
    }

    /// Register a lasting modifier.
    ///
    /// A modifier with the same type and source is replaced, so re-casting a
    /// buff refreshes it instead of stacking. Returns false if the participant
    /// already carries `max_stacking` modifiers and the new one was dropped.
    pub fn add_modifier(&mut self, modifier: BattleModifier, max_stacking: usize) -> bool {
        if let Some(existing) = self
            .modifiers
            .iter_mut()
            .find(|m| m.modifier_type == modifier.modifier_type && m.source == modifier.source)
        {
            *existing = modifier;
            return true;
        }

        if self.modifiers.len() < max_stacking {
            self.modifiers.push(modifier);
            true
        } else {
            false
        }
    }

    /// Strip every modifier `predicate` selects, returning them.
    pub fn remove_modifiers(&mut self, predicate: impl Fn(&BattleModifier) -> bool) -> Vec<BattleModifier> {
        let (removed, kept): (Vec<_>, Vec<_>) = self.modifiers.drain(..).partition(|m| predicate(m));
        self.modifiers = kept;
        removed
    }

    /// Count every modifier down by one turn, returning the ones that ran out.
    pub fn tick_modifiers(&mut self) -> Vec<BattleModifier> {
        let mut expired = Vec::new();
        let mut kept = Vec::with_capacity(self.modifiers.len());
        for mut modifier in self.modifiers.drain(..) {
            modifier.duration = modifier.duration.saturating_sub(1);
            if modifier.duration == 0 {
                expired.push(modifier);
            } else {
                kept.push(modifier);
            }
        }
        self.modifiers = kept;
        expired
    }
}

/// One entry in a participant's action history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub turn: u32,
    pub action: BattleAction,
    pub result: BattleResult,
    /// Set when the turn was a special ability; `action` then holds its base action.
    #[serde(default)]
    pub ability: Option<SpecialAbilityType>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleParticipant {
    pub id: String,
    /// True for the participant driven by the local user, false for remote or AI.
    pub is_local: bool,
    /// Stats as registered, before equipment is applied at battle start.
    pub base_stats: BattleStats,
    /// Live stats mutated by the battle.
    pub stats: BattleStats,
    pub history: Vec<ActionRecord>,
    /// Special abilities unlocked for this battle.
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    /// Actions so far that match the start of at least one combo.
    #[serde(default)]
    pub combo_chain: Vec<ActionType>,
}

impl BattleParticipant {
    pub fn new(id: impl Into<String>, is_local: bool, stats: BattleStats) -> Self {
        Self {
            id: id.into(),
            is_local,
            base_stats: stats.clone(),
            stats,
            history: Vec::new(),
            abilities: Vec::new(),
            combo_chain: Vec::new(),
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.stats.is_defeated()
    }

    pub fn last_action(&self) -> Option<&ActionRecord> {
        self.history.last()
    }

    pub fn ability(&self, ability: SpecialAbilityType) -> Option<&AbilitySlot> {
        self.abilities.iter().find(|slot| slot.ability == ability)
    }

    pub fn ability_mut(&mut self, ability: SpecialAbilityType) -> Option<&mut AbilitySlot> {
        self.abilities.iter_mut().find(|slot| slot.ability == ability)
    }
}
