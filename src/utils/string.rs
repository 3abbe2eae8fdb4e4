//! String utility functions

/// Remove Minecraft color codes from text
/// Format: §x where x is a color code
pub fn remove_minecraft_colors(text: &str) -> String {
    let mut result = String::new();
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch == '§' {
            // Skip the next character (color code)
            chars.next();
        } else {
            result.push(ch);
        }
    }

    result
}

/// Convert string to title case
pub fn to_title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Human-readable name for an item identifier: `minecraft:iron_ingot` -> `Iron Ingot`
pub fn item_display_name(id: &str) -> String {
    let path = id.rsplit(':').next().unwrap_or(id);
    to_title_case(&path.replace('_', " "))
}

/// Display name cleaned up for use as a storage key
pub fn clean_display_name(name: &str) -> String {
    remove_minecraft_colors(name).trim().to_string()
}
