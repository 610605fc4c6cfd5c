use super::consumables::consumable_result;
use super::{BattleEquipment, EquipmentCatalog, EquipmentStatBonuses};
use crate::battle::state::BattleResult;
use crate::config::EquipmentRules;
use crate::errors::{EquipmentError, EquipmentResult};
use crate::participant::BattleStats;
use schema::{EquipmentSlot, EquipmentType, StatCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use strum::IntoEnumIterator;
use tracing::{debug, info};

/// Sum the bonuses of every intact item and clamp each category into
/// `[bonus_floor, 1 + cap]`. Broken items contribute nothing.
pub fn aggregate_bonuses<'a>(
    items: impl IntoIterator<Item = &'a BattleEquipment>,
    rules: &EquipmentRules,
) -> EquipmentStatBonuses {
    let mut bonuses = EquipmentStatBonuses::default();

    for item in items.into_iter().filter(|item| !item.is_broken) {
        for category in StatCategory::iter() {
            *bonuses.multiplier_mut(category) += item.bonus_for(category);
        }
        bonuses
            .active_effects
            .extend(item.special_effects.iter().cloned());
    }

    for category in StatCategory::iter() {
        let multiplier = bonuses.multiplier_mut(category);
        *multiplier = multiplier.clamp(rules.bonus_floor, rules.ceiling_for(category));
    }

    bonuses
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EquipmentLoadout {
    pub participant_id: String,
    pub equipped: BTreeMap<EquipmentSlot, BattleEquipment>,
    pub inventory: Vec<BattleEquipment>,
    pub bonuses: EquipmentStatBonuses,
}

impl EquipmentLoadout {
    pub fn new(participant_id: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            equipped: BTreeMap::new(),
            inventory: Vec::new(),
            bonuses: EquipmentStatBonuses::default(),
        }
    }

    fn recompute(&mut self, rules: &EquipmentRules) {
        self.bonuses = aggregate_bonuses(self.equipped.values(), rules);
    }

    fn inventory_position(&self, equipment_id: &str) -> Option<usize> {
        self.inventory.iter().position(|item| item.id == equipment_id)
    }

    fn equipped_slot_of(&self, equipment_id: &str) -> Option<EquipmentSlot> {
        self.equipped
            .iter()
            .find(|(_, item)| item.id == equipment_id)
            .map(|(slot, _)| *slot)
    }

    /// Move an inventory item into its slot, returning any displaced item to the inventory.
    fn equip_from_inventory(&mut self, index: usize) {
        let item = self.inventory.remove(index);
        if let Some(previous) = self.equipped.insert(item.slot, item) {
            self.inventory.push(previous);
        }
    }
}

/// Every participant's loadout plus the catalog they are seeded from.
#[derive(Debug, Clone)]
pub struct EquipmentStore {
    catalog: EquipmentCatalog,
    rules: EquipmentRules,
    loadouts: HashMap<String, EquipmentLoadout>,
}

impl EquipmentStore {
    pub fn new(catalog: EquipmentCatalog, rules: EquipmentRules) -> Self {
        Self {
            catalog,
            rules,
            loadouts: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &EquipmentCatalog {
        &self.catalog
    }

    pub fn rules(&self) -> &EquipmentRules {
        &self.rules
    }

    pub fn loadout(&self, participant_id: &str) -> Option<&EquipmentLoadout> {
        self.loadouts.get(participant_id)
    }

    fn loadout_mut(&mut self, participant_id: &str) -> EquipmentResult<&mut EquipmentLoadout> {
        self.loadouts
            .get_mut(participant_id)
            .ok_or_else(|| EquipmentError::LoadoutNotFound(participant_id.to_string()))
    }

    /// Create (or recreate) a loadout seeded with every catalog item the level allows,
    /// then auto-equip the preferred item for each slot.
    pub fn initialize_participant_loadout(
        &mut self,
        participant_id: &str,
        level: u32,
    ) -> &EquipmentLoadout {
        let mut loadout = EquipmentLoadout::new(participant_id);
        loadout.inventory = self.catalog.available_for_level(level).cloned().collect();

        for slot in EquipmentSlot::iter() {
            let choice = EquipmentType::auto_equip_priority(slot)
                .iter()
                .find_map(|wanted| {
                    loadout.inventory.iter().position(|item| {
                        item.equipment_type == *wanted && item.slot == slot && !item.is_broken
                    })
                });
            if let Some(index) = choice {
                loadout.equip_from_inventory(index);
            }
        }

        loadout.recompute(&self.rules);
        info!(
            participant = participant_id,
            level,
            equipped = loadout.equipped.len(),
            inventory = loadout.inventory.len(),
            "Initialized loadout"
        );

        self.loadouts.insert(participant_id.to_string(), loadout);
        &self.loadouts[participant_id]
    }

    pub fn equip_item(&mut self, participant_id: &str, equipment_id: &str) -> EquipmentResult<()> {
        let rules = self.rules.clone();
        let loadout = self.loadout_mut(participant_id)?;

        let index = loadout
            .inventory_position(equipment_id)
            .ok_or_else(|| EquipmentError::EquipmentNotFound(equipment_id.to_string()))?;
        if loadout.inventory[index].is_broken {
            return Err(EquipmentError::BrokenEquipment(equipment_id.to_string()));
        }

        loadout.equip_from_inventory(index);
        loadout.recompute(&rules);
        debug!(participant = participant_id, equipment = equipment_id, "Equipped item");
        Ok(())
    }

    /// Move the item in `slot` back to the inventory and return its id.
    pub fn unequip_item(
        &mut self,
        participant_id: &str,
        slot: EquipmentSlot,
    ) -> EquipmentResult<String> {
        let rules = self.rules.clone();
        let loadout = self.loadout_mut(participant_id)?;

        let item = loadout
            .equipped
            .remove(&slot)
            .ok_or(EquipmentError::EmptySlot(slot))?;
        let id = item.id.clone();
        loadout.inventory.push(item);
        loadout.recompute(&rules);
        debug!(participant = participant_id, equipment = %id, %slot, "Unequipped item");
        Ok(id)
    }

    /// Scale a copy of `base` by the participant's equipment multipliers.
    ///
    /// HP is rescaled to keep the same fraction of max HP when the health
    /// multiplier changes max HP. Participants without a loadout get an
    /// unchanged copy.
    pub fn apply_equipment_bonuses(&self, participant_id: &str, base: &BattleStats) -> BattleStats {
        let mut stats = base.clone();
        let Some(loadout) = self.loadouts.get(participant_id) else {
            return stats;
        };
        let bonuses = &loadout.bonuses;

        stats.attack *= bonuses.attack_multiplier;
        stats.defense *= bonuses.defense_multiplier;
        stats.speed *= bonuses.speed_multiplier;

        if (bonuses.health_multiplier - 1.0).abs() > f64::EPSILON {
            let ratio = base.hp_ratio();
            stats.max_hp *= bonuses.health_multiplier;
            stats.hp = stats.max_hp * ratio;
        }

        stats
    }

    /// Wear down every equipped item after a battle. Returns the ids of items
    /// that broke as a result.
    pub fn damage_equipment(&mut self, participant_id: &str) -> EquipmentResult<Vec<String>> {
        let rules = self.rules.clone();
        let loadout = self.loadout_mut(participant_id)?;

        let mut broken = Vec::new();
        for item in loadout.equipped.values_mut() {
            if item.wear(rules.durability_loss_per_battle) {
                broken.push(item.id.clone());
            }
        }

        loadout.recompute(&rules);
        if !broken.is_empty() {
            info!(participant = participant_id, ?broken, "Equipment broke");
        }
        Ok(broken)
    }

    pub fn repair_equipment(
        &mut self,
        participant_id: &str,
        equipment_id: &str,
    ) -> EquipmentResult<()> {
        let rules = self.rules.clone();
        let loadout = self.loadout_mut(participant_id)?;

        let item = match loadout.equipped_slot_of(equipment_id) {
            Some(slot) => loadout.equipped.get_mut(&slot),
            None => loadout
                .inventory
                .iter_mut()
                .find(|item| item.id == equipment_id),
        }
        .ok_or_else(|| EquipmentError::EquipmentNotFound(equipment_id.to_string()))?;

        item.repair();
        loadout.recompute(&rules);
        Ok(())
    }

    /// Use one charge of a consumable from the consumable slot or the inventory.
    ///
    /// The item loses one durability and disappears entirely at zero.
    pub fn use_consumable(
        &mut self,
        participant_id: &str,
        equipment_id: &str,
    ) -> EquipmentResult<BattleResult> {
        let rules = self.rules.clone();
        let loadout = self.loadout_mut(participant_id)?;

        let in_slot = loadout
            .equipped
            .get(&EquipmentSlot::Consumable)
            .is_some_and(|item| item.id == equipment_id);

        let inventory_index = if in_slot {
            None
        } else {
            loadout.inventory_position(equipment_id)
        };

        let item = if in_slot {
            loadout.equipped.get_mut(&EquipmentSlot::Consumable)
        } else if let Some(index) = inventory_index {
            loadout.inventory.get_mut(index)
        } else if loadout.equipped_slot_of(equipment_id).is_some() {
            return Err(EquipmentError::NotConsumable(equipment_id.to_string()));
        } else {
            None
        }
        .ok_or_else(|| EquipmentError::EquipmentNotFound(equipment_id.to_string()))?;

        if !item.is_consumable() {
            return Err(EquipmentError::NotConsumable(equipment_id.to_string()));
        }

        let result = consumable_result(item, &rules);
        item.durability = item.durability.saturating_sub(1);
        let used_up = item.durability == 0;

        if used_up {
            if in_slot {
                loadout.equipped.remove(&EquipmentSlot::Consumable);
                loadout.recompute(&rules);
            } else if let Some(index) = inventory_index {
                loadout.inventory.remove(index);
            }
        }

        debug!(
            participant = participant_id,
            equipment = equipment_id,
            used_up,
            "Used consumable"
        );
        Ok(result)
    }

    pub fn add_equipment_to_inventory(
        &mut self,
        participant_id: &str,
        equipment_id: &str,
    ) -> EquipmentResult<()> {
        let item = self
            .catalog
            .get(equipment_id)
            .cloned()
            .ok_or_else(|| EquipmentError::EquipmentNotFound(equipment_id.to_string()))?;
        self.loadout_mut(participant_id)?.inventory.push(item);
        Ok(())
    }

    /// Equipped items by slot. Empty for an unknown participant.
    pub fn equipped_items(&self, participant_id: &str) -> Vec<&BattleEquipment> {
        self.loadouts
            .get(participant_id)
            .map(|loadout| loadout.equipped.values().collect())
            .unwrap_or_default()
    }

    pub fn inventory(&self, participant_id: &str) -> &[BattleEquipment] {
        self.loadouts
            .get(participant_id)
            .map(|loadout| loadout.inventory.as_slice())
            .unwrap_or(&[])
    }

    /// Aggregated bonuses; neutral for an unknown participant.
    pub fn stat_bonuses(&self, participant_id: &str) -> EquipmentStatBonuses {
        self.loadouts
            .get(participant_id)
            .map(|loadout| loadout.bonuses.clone())
            .unwrap_or_default()
    }

    pub fn equipment_info(&self, equipment_id: &str) -> EquipmentResult<&BattleEquipment> {
        self.catalog
            .get(equipment_id)
            .ok_or_else(|| EquipmentError::EquipmentNotFound(equipment_id.to_string()))
    }

    pub fn available_equipment(&self) -> &[BattleEquipment] {
        self.catalog.items()
    }
}
