//! Placement routing for reserved and locked slots
//!
//! Decides which main-inventory slot absorbs an incoming stack, and whether a
//! given slot may take a stack at all. Everything here is a pure function of
//! the player's slot annotations and a read view of the inventory.

use crate::slots::{SlotAnnotation, SlotState, SlotStore};
use crate::types::{ItemStack, SlotIndex, MAIN_INVENTORY_SIZE};
use tracing::trace;

/// Read access to live slot contents, indexed like the slot store
pub trait InventoryView {
    /// Contents of a slot; `None` for empty or out-of-range slots
    fn stack(&self, slot: SlotIndex) -> Option<&ItemStack>;

    fn is_slot_empty(&self, slot: SlotIndex) -> bool {
        self.stack(slot).map_or(true, ItemStack::is_empty)
    }
}

impl InventoryView for [Option<ItemStack>] {
    fn stack(&self, slot: SlotIndex) -> Option<&ItemStack> {
        self.get(slot)?.as_ref().filter(|stack| !stack.is_empty())
    }
}

impl InventoryView for Vec<Option<ItemStack>> {
    fn stack(&self, slot: SlotIndex) -> Option<&ItemStack> {
        self.as_slice().stack(slot)
    }
}

/// Tunables for the allocation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationPolicy {
    /// Let non-matching items into empty Reserved slots once no Normal empty
    /// slot is left. Locked slots are never relaxed.
    pub reserved_fallback: bool,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            reserved_fallback: true,
        }
    }
}

/// Which rule picked a slot, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PlacementRule {
    StackLocked,
    StackReserved,
    StackNormal,
    EmptyLocked,
    EmptyReserved,
    EmptyNormal,
    ReservedFallback,
}

impl PlacementRule {
    /// True for rules that merge into an existing stack
    pub fn is_stacking(self) -> bool {
        matches!(
            self,
            PlacementRule::StackLocked | PlacementRule::StackReserved | PlacementRule::StackNormal
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub slot: SlotIndex,
    pub rule: PlacementRule,
}

fn first_slot(pred: impl Fn(SlotIndex) -> bool) -> Option<SlotIndex> {
    (0..MAIN_INVENTORY_SIZE).find(|&slot| pred(slot))
}

/// Run the ranked rules and report the winning slot and rule.
///
/// Stacking beats empty slots; within each phase Locked matches beat
/// Reserved matches beat Normal slots; lowest index wins within a rule.
pub fn find_placement<I>(
    store: &SlotStore,
    inventory: &I,
    incoming: &ItemStack,
    policy: AllocationPolicy,
) -> Option<Placement>
where
    I: InventoryView + ?Sized,
{
    if incoming.is_empty() {
        return None;
    }

    let can_stack = |slot: SlotIndex| {
        inventory
            .stack(slot)
            .is_some_and(|existing| existing.has_room_for(incoming))
    };
    let is_empty = |slot: SlotIndex| inventory.is_slot_empty(slot);
    let reserved_for_incoming = |slot: SlotIndex, state: SlotState| {
        let annotation = store.get(slot);
        annotation.state() == state && annotation.matches(incoming)
    };
    let is_normal = |slot: SlotIndex| store.state(slot) == SlotState::Normal;

    let rules: [(PlacementRule, &dyn Fn(SlotIndex) -> bool); 6] = [
        (PlacementRule::StackLocked, &|s: SlotIndex| {
            can_stack(s) && reserved_for_incoming(s, SlotState::Locked)
        }),
        (PlacementRule::StackReserved, &|s: SlotIndex| {
            can_stack(s) && reserved_for_incoming(s, SlotState::Reserved)
        }),
        (PlacementRule::StackNormal, &|s: SlotIndex| can_stack(s) && is_normal(s)),
        (PlacementRule::EmptyLocked, &|s: SlotIndex| {
            is_empty(s) && reserved_for_incoming(s, SlotState::Locked)
        }),
        (PlacementRule::EmptyReserved, &|s: SlotIndex| {
            is_empty(s) && reserved_for_incoming(s, SlotState::Reserved)
        }),
        (PlacementRule::EmptyNormal, &|s: SlotIndex| is_empty(s) && is_normal(s)),
    ];

    for (rule, pred) in rules {
        if let Some(slot) = first_slot(pred) {
            trace!("{} -> slot {} via {:?}", incoming.item, slot, rule);
            return Some(Placement { slot, rule });
        }
    }

    // No Normal empty slot is left at this point
    if policy.reserved_fallback {
        if let Some(slot) =
            first_slot(|s| is_empty(s) && store.state(s) == SlotState::Reserved)
        {
            trace!("{} -> slot {} via reserved fallback", incoming.item, slot);
            return Some(Placement {
                slot,
                rule: PlacementRule::ReservedFallback,
            });
        }
    }

    None
}

/// Best slot for an incoming stack, or `None` to defer to default placement
pub fn find_best_slot<I>(
    store: &SlotStore,
    inventory: &I,
    incoming: &ItemStack,
    policy: AllocationPolicy,
) -> Option<SlotIndex>
where
    I: InventoryView + ?Sized,
{
    find_placement(store, inventory, incoming, policy).map(|placement| placement.slot)
}

/// Annotation-level accept check. `no_normal_space` is the capacity-pressure
/// signal: true when no Normal empty slot remains in the inventory.
pub fn accepts(
    annotation: &SlotAnnotation,
    incoming: &ItemStack,
    no_normal_space: bool,
    policy: AllocationPolicy,
) -> bool {
    match annotation.state() {
        SlotState::Normal => true,
        SlotState::Reserved => {
            annotation.matches(incoming) || (policy.reserved_fallback && no_normal_space)
        }
        SlotState::Locked => annotation.matches(incoming),
    }
}

/// Whether `slot` may take `incoming`, for placements that bypass the search
/// (drag-and-drop, shift-click redistribution).
pub fn can_accept<I>(
    store: &SlotStore,
    inventory: &I,
    slot: SlotIndex,
    incoming: &ItemStack,
    policy: AllocationPolicy,
) -> bool
where
    I: InventoryView + ?Sized,
{
    let annotation = store.get(slot);
    if annotation.state() == SlotState::Reserved && !annotation.matches(incoming) {
        // Only pay for the inventory scan when the answer depends on it
        return accepts(
            annotation,
            incoming,
            !has_normal_empty_slot(store, inventory),
            policy,
        );
    }
    accepts(annotation, incoming, false, policy)
}

/// True if some empty slot is Normal
pub fn has_normal_empty_slot<I>(store: &SlotStore, inventory: &I) -> bool
where
    I: InventoryView + ?Sized,
{
    empty_slot(store, inventory).is_some()
}

/// True iff every empty slot is Locked
pub fn is_full_excluding_locked<I>(store: &SlotStore, inventory: &I) -> bool
where
    I: InventoryView + ?Sized,
{
    first_slot(|s| inventory.is_slot_empty(s) && store.state(s) != SlotState::Locked).is_none()
}

/// First empty slot that counts as generic free capacity (Normal only)
pub fn empty_slot<I>(store: &SlotStore, inventory: &I) -> Option<SlotIndex>
where
    I: InventoryView + ?Sized,
{
    first_slot(|s| inventory.is_slot_empty(s) && store.state(s) == SlotState::Normal)
}

/// First occupied slot with room for `incoming` that also passes `can_accept`
pub fn occupied_slot_with_room<I>(
    store: &SlotStore,
    inventory: &I,
    incoming: &ItemStack,
    policy: AllocationPolicy,
) -> Option<SlotIndex>
where
    I: InventoryView + ?Sized,
{
    first_slot(|s| {
        inventory
            .stack(s)
            .is_some_and(|existing| existing.has_room_for(incoming))
            && can_accept(store, inventory, s, incoming, policy)
    })
}
