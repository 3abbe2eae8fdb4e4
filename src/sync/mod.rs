pub mod messages;
pub mod observer;

pub use messages::{
    decode_client_message, decode_entries, decode_server_message, encode_client_message,
    encode_server_message, ClientMessage, DecodeError, ServerMessage, WireSlot,
};
pub use observer::ObservedSlots;
