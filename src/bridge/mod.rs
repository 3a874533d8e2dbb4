pub mod accessory;
pub mod characteristics;

pub use accessory::AirAccessory;
pub use characteristics::{characteristic_updates, CharacteristicSink, CharacteristicUpdate, LogSink};
