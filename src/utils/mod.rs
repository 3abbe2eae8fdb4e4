pub mod string;

pub use string::{clean_display_name, item_display_name};
