//! Turns raw event socket lines into metric families.

pub mod translator;

pub use translator::{EventTranslator, MAC_IP_INFO, TranslateError};
