//! Serial module - the transport behind macro sends

mod link;

pub use link::SerialLink;
