pub mod chunker;
pub mod message;
pub mod traits;
pub mod whatsapp;

pub use message::{InboundMessage, MessageContent};
pub use traits::{ChatSender, OutboundMessage};
pub use whatsapp::WhatsAppChannel;
