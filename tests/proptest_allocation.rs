//! Property-based tests for slot allocation
//!
//! Validates placement invariants over random inventories and annotations:
//! - Locked slots never receive a different item
//! - Reserved slots only take strangers when no Normal empty slot is left
//! - Matching Locked stacks always win
//! - Insertion conserves item counts
//! - Three toggles bring a slot back to Normal

use proptest::prelude::*;
use reserved_slots::inventory::{
    can_accept, find_best_slot, find_placement, AllocationPolicy, InventoryManager, InventoryView,
    PlacementRule,
};
use reserved_slots::slots::{SlotAnnotation, SlotState, SlotStore};
use reserved_slots::sync::{decode_server_message, encode_server_message, ObservedSlots, ServerMessage};
use reserved_slots::types::{ItemId, ItemStack, SlotIndex, MAIN_INVENTORY_SIZE};

const ITEMS: [&str; 4] = ["minecraft:stone", "minecraft:torch", "minecraft:apple", "minecraft:iron_ingot"];

fn item(index: usize) -> ItemId {
    ItemId::parse(ITEMS[index]).unwrap()
}

fn arb_stack() -> impl Strategy<Value = ItemStack> {
    (0..ITEMS.len(), 1u32..=64).prop_map(|(i, count)| ItemStack::new(item(i), count))
}

fn arb_inventory() -> impl Strategy<Value = Vec<Option<ItemStack>>> {
    prop::collection::vec(prop::option::weighted(0.6, arb_stack()), MAIN_INVENTORY_SIZE)
}

fn arb_annotation() -> impl Strategy<Value = SlotAnnotation> {
    prop_oneof![
        3 => Just(SlotAnnotation::normal()),
        1 => (0..ITEMS.len()).prop_map(|i| SlotAnnotation::new(SlotState::Reserved, Some(item(i)))),
        1 => (0..ITEMS.len()).prop_map(|i| SlotAnnotation::new(SlotState::Locked, Some(item(i)))),
    ]
}

fn arb_store() -> impl Strategy<Value = SlotStore> {
    prop::collection::vec(arb_annotation(), MAIN_INVENTORY_SIZE)
        .prop_map(|annotations| annotations.into_iter().enumerate().collect())
}

fn arb_policy() -> impl Strategy<Value = AllocationPolicy> {
    any::<bool>().prop_map(|reserved_fallback| AllocationPolicy { reserved_fallback })
}

fn normal_empty_exists(store: &SlotStore, inventory: &[Option<ItemStack>]) -> bool {
    (0..MAIN_INVENTORY_SIZE).any(|s| inventory.is_slot_empty(s) && store.state(s) == SlotState::Normal)
}

proptest! {
    /// Property: a Locked slot is only ever chosen for its own item
    #[test]
    fn locked_slots_never_take_strangers(
        store in arb_store(),
        inventory in arb_inventory(),
        incoming in arb_stack(),
        policy in arb_policy(),
    ) {
        if let Some(slot) = find_best_slot(&store, &inventory, &incoming, policy) {
            let annotation = store.get(slot);
            if annotation.state() == SlotState::Locked {
                prop_assert_eq!(annotation.reserved_item(), Some(&incoming.item));
            }
        }
    }

    /// Property: a non-matching Reserved slot is a last resort
    ///
    /// It is only chosen when it is empty, no Normal empty slot exists and
    /// the fallback is enabled.
    #[test]
    fn reserved_slots_are_last_resort_for_strangers(
        store in arb_store(),
        inventory in arb_inventory(),
        incoming in arb_stack(),
        policy in arb_policy(),
    ) {
        if let Some(slot) = find_best_slot(&store, &inventory, &incoming, policy) {
            let annotation = store.get(slot);
            if annotation.state() == SlotState::Reserved && !annotation.matches(&incoming) {
                prop_assert!(policy.reserved_fallback);
                prop_assert!(inventory.is_slot_empty(slot));
                prop_assert!(!normal_empty_exists(&store, &inventory));
            }
        }
    }

    /// Property: the chosen slot can actually hold the incoming stack
    #[test]
    fn chosen_slot_is_empty_or_has_room(
        store in arb_store(),
        inventory in arb_inventory(),
        incoming in arb_stack(),
        policy in arb_policy(),
    ) {
        if let Some(slot) = find_best_slot(&store, &inventory, &incoming, policy) {
            let fits = inventory.is_slot_empty(slot)
                || inventory.stack(slot).is_some_and(|existing| existing.has_room_for(&incoming));
            prop_assert!(fits, "slot {} cannot hold {}", slot, incoming.item);
            prop_assert!(can_accept(&store, &inventory, slot, &incoming, policy));
        }
    }

    /// Property: a matching Locked stack with room beats every other rule
    #[test]
    fn matching_locked_stack_wins(
        store in arb_store(),
        inventory in arb_inventory(),
        incoming in arb_stack(),
        policy in arb_policy(),
    ) {
        let expected = (0..MAIN_INVENTORY_SIZE).find(|&s| {
            store.state(s) == SlotState::Locked
                && store.get(s).matches(&incoming)
                && inventory.stack(s).is_some_and(|existing| existing.has_room_for(&incoming))
        });

        if let Some(expected) = expected {
            let placement = find_placement(&store, &inventory, &incoming, policy).unwrap();
            prop_assert_eq!(placement.slot, expected);
            prop_assert_eq!(placement.rule, PlacementRule::StackLocked);
        }
    }

    /// Property: insertion conserves the item count
    #[test]
    fn insert_conserves_items(
        store in arb_store(),
        contents in arb_inventory(),
        incoming in arb_stack(),
        policy in arb_policy(),
    ) {
        let mut inventory = InventoryManager::new();
        for (slot, stack) in contents.into_iter().enumerate() {
            inventory.set_slot(slot, stack);
        }

        let before = inventory.count_of(&incoming.item);
        let original = incoming.count;
        let mut remaining = incoming.clone();
        let inserted = inventory.insert_stack(&store, &mut remaining, policy);

        prop_assert_eq!(inserted + remaining.count, original);
        prop_assert_eq!(inventory.count_of(&incoming.item), before + inserted);
        for slot in 0..MAIN_INVENTORY_SIZE {
            if let Some(stack) = inventory.get_slot(slot) {
                prop_assert!(stack.count <= stack.max_count);
            }
        }
    }

    /// Property: toggling an occupied slot three times is a no-op
    #[test]
    fn toggle_cycle_returns_to_normal(
        slot in 0..MAIN_INVENTORY_SIZE,
        contents in arb_stack(),
    ) {
        let mut store = SlotStore::new();
        let states: Vec<SlotState> = (0..3)
            .map(|_| store.toggle(slot, Some(&contents)).unwrap().state())
            .collect();

        prop_assert_eq!(states, vec![SlotState::Reserved, SlotState::Locked, SlotState::Normal]);
        prop_assert!(store.is_empty());
    }

    /// Property: an observer fed a snapshot holds exactly the sender's store
    #[test]
    fn snapshot_mirrors_store(store in arb_store()) {
        let text = encode_server_message(&ServerMessage::snapshot(&store)).unwrap();
        let mut observed = ObservedSlots::new();
        observed.apply(&decode_server_message(&text).unwrap());

        prop_assert_eq!(observed.slots(), &store);
    }
}

#[test]
fn fallback_disabled_leaves_stranger_unplaced() {
    let inventory: Vec<Option<ItemStack>> = (0..MAIN_INVENTORY_SIZE)
        .map(|s: SlotIndex| (s != 5).then(|| ItemStack::new(item(0), 64)))
        .collect();
    let store: SlotStore = [(5, SlotAnnotation::new(SlotState::Reserved, Some(item(1))))]
        .into_iter()
        .collect();
    let apple = ItemStack::new(item(2), 1);

    let strict = AllocationPolicy { reserved_fallback: false };
    assert_eq!(find_best_slot(&store, &inventory, &apple, strict), None);
    assert_eq!(find_best_slot(&store, &inventory, &apple, AllocationPolicy::default()), Some(5));
}
