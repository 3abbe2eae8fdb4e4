use anyhow::Result;
use parking_lot::Mutex;
use reserved_slots::{
    config::ConfigLoader,
    inventory::InventoryManager,
    logging::init_logger,
    persist::StoreRegistry,
    session::SessionManager,
    sync::{encode_server_message, ObservedSlots},
    types::{ItemId, ItemStack, SlotIndex, MAIN_INVENTORY_SIZE},
    utils::item_display_name,
};
use std::sync::Arc;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The one player driven from the console
struct ConsolePlayer {
    id: Uuid,
    name: String,
    inventory: InventoryManager,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    let _log_guard = init_logger(&config.log_level, config.log_dir.as_deref())?;
    info!("Starting Reserved Slots console v{}", VERSION);
    info!("Reserved slot data: {:?}", config.data_file());
    info!("Reserved fallback: {}", if config.reserved_fallback { "ENABLED" } else { "DISABLED" });

    let registry = StoreRegistry::new(config.data_file_name.clone());
    let store = registry.open(&config.world_dir);
    let (mut sessions, mut outbound) = SessionManager::new(&config, store);

    // Observer side: everything goes through the wire encoding
    let observed = Arc::new(Mutex::new(ObservedSlots::new()));
    let observed_clone = observed.clone();
    tokio::spawn(async move {
        while let Some(out) = outbound.recv().await {
            let text = match encode_server_message(&out.message) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to encode sync message: {}", e);
                    continue;
                }
            };
            debug!("-> {}: {}", out.player, text);
            if let Err(e) = observed_clone.lock().apply_raw(&text) {
                warn!("Observer rejected message: {}", e);
            }
        }
    });

    info!("Console interface ready - type commands and press Enter:");
    info!("  join <name> | leave | toggle <slot> | give <item> [count]");
    info!("  set <slot> <item> [count] | clear <slot> | show | save | quit");

    let mut player: Option<ConsolePlayer> = None;
    let mut lines = BufReader::new(stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            continue;
        };

        match command.to_lowercase().as_str() {
            "quit" | "exit" => break,
            "join" => {
                let Some(name) = args.first() else {
                    info!("Usage: join <name>");
                    continue;
                };
                if let Some(previous) = player.take() {
                    sessions.detach(previous.id);
                }
                let id = Uuid::new_v4();
                let count = sessions.attach(id, name).len();
                info!(
                    "{} joined with {} annotated slots (storage key: {})",
                    name,
                    count,
                    sessions.player_key(id).unwrap_or("?")
                );
                player = Some(ConsolePlayer {
                    id,
                    name: name.to_string(),
                    inventory: InventoryManager::new(),
                });
            }
            "leave" => match player.take() {
                Some(current) => {
                    sessions.detach(current.id);
                    info!("{} left", current.name);
                }
                None => info!("No player - use 'join <name>' first"),
            },
            other => match player.as_mut() {
                Some(current) => handle_command(other, args, current, &mut sessions, &observed),
                None => info!("No player - use 'join <name>' first"),
            },
        }
    }

    sessions.shutdown();
    registry.close_all();
    info!("Shut down cleanly");
    Ok(())
}

fn handle_command(
    command: &str,
    args: &[&str],
    current: &mut ConsolePlayer,
    sessions: &mut SessionManager,
    observed: &Mutex<ObservedSlots>,
) {
    match command {
        "save" => {
            sessions.checkpoint(current.id);
            info!("Checkpoint written for {}", current.name);
        }
        "toggle" => match parse_slot(args.first()) {
            Some(slot) => {
                if let Err(e) = sessions.toggle(current.id, slot, &current.inventory) {
                    info!("Toggle failed: {}", e);
                }
            }
            None => info!("Usage: toggle <slot 0-{}>", MAIN_INVENTORY_SIZE - 1),
        },
        "give" => {
            let Some(mut stack) = parse_stack(args.first(), args.get(1)) else {
                info!("Usage: give <item> [count]");
                return;
            };
            let requested = stack.count;
            let inserted = sessions.insert_stack(current.id, &mut current.inventory, &mut stack);
            info!(
                "Picked up {}/{} {}",
                inserted,
                requested,
                item_display_name(stack.item.as_str())
            );
        }
        "set" => match (parse_slot(args.first()), parse_stack(args.get(1), args.get(2))) {
            (Some(slot), Some(stack)) => {
                let policy = sessions.allocation_policy();
                match current.inventory.place_stack(sessions.slots(current.id), slot, stack, policy) {
                    Ok(Some(rest)) => info!("Placed, {} left over", rest.count),
                    Ok(None) => info!("Placed"),
                    Err(e) => info!("Placement refused: {}", e),
                }
            }
            _ => info!("Usage: set <slot> <item> [count]"),
        },
        "clear" => match parse_slot(args.first()) {
            Some(slot) => current.inventory.set_slot(slot, None),
            None => info!("Usage: clear <slot>"),
        },
        "show" => show(current, &observed.lock()),
        other => info!("Unknown command: {}", other),
    }
}

fn parse_slot(arg: Option<&&str>) -> Option<SlotIndex> {
    arg?.parse::<SlotIndex>().ok().filter(|slot| *slot < MAIN_INVENTORY_SIZE)
}

fn parse_stack(item: Option<&&str>, count: Option<&&str>) -> Option<ItemStack> {
    let item = ItemId::parse(item?).ok()?;
    let count = match count {
        Some(raw) => raw.parse().ok()?,
        None => 1,
    };
    Some(ItemStack::new(item, count))
}

fn show(player: &ConsolePlayer, observed: &ObservedSlots) {
    info!("Inventory of {}:", player.name);
    for slot in 0..MAIN_INVENTORY_SIZE {
        let annotation = observed.get(slot);
        let contents = player.inventory.get_slot(slot);
        if contents.is_none() && annotation.is_normal() {
            continue;
        }

        let contents = contents
            .map(|s| format!("{} x{}", item_display_name(s.item.as_str()), s.count))
            .unwrap_or_else(|| "-".to_string());
        let marker = match annotation.reserved_item() {
            Some(item) => format!(" [{} {}]", annotation.state(), item_display_name(item.as_str())),
            None if annotation.is_normal() => String::new(),
            None => format!(" [{}]", annotation.state()),
        };
        info!("  {:>2}: {}{}", slot, contents, marker);
    }
}
