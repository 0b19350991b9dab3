use std::collections::BTreeMap;

/// The hero's collectibles. Missing slots read as zero.
///
/// Removal is not clamped: taking more than is held leaves a negative count.
/// Callers that gate on a balance (doors) check before removing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    hero: BTreeMap<String, i32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_to_hero(&mut self, slot: &str, value: i32) {
        *self.hero.entry(slot.to_string()).or_insert(0) += value;
    }

    pub fn get_from_hero(&self, slot: &str) -> i32 {
        self.hero.get(slot).copied().unwrap_or(0)
    }

    pub fn remove_from_hero(&mut self, slot: &str, value: i32) {
        *self.hero.entry(slot.to_string()).or_insert(0) -= value;
    }

    pub fn slots(&self) -> impl Iterator<Item = (&str, i32)> {
        self.hero.iter().map(|(slot, count)| (slot.as_str(), *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_slot_reads_zero() {
        let inventory = Inventory::new();
        assert_eq!(inventory.get_from_hero("blue_flower"), 0);
    }

    #[test]
    fn add_and_remove_accumulate() {
        let mut inventory = Inventory::new();
        inventory.add_to_hero("blue_flower", 2);
        inventory.add_to_hero("blue_flower", 1);
        inventory.remove_from_hero("blue_flower", 2);
        assert_eq!(inventory.get_from_hero("blue_flower"), 1);
    }

    #[test]
    fn removal_can_go_negative() {
        let mut inventory = Inventory::new();
        inventory.remove_from_hero("key", 3);
        assert_eq!(inventory.get_from_hero("key"), -3);
    }

    #[test]
    fn slots_are_listed_in_name_order() {
        let mut inventory = Inventory::new();
        inventory.add_to_hero("b", 1);
        inventory.add_to_hero("a", 2);
        let slots: Vec<_> = inventory.slots().collect();
        assert_eq!(slots, vec![("a", 2), ("b", 1)]);
    }
}
