pub mod evdev_to_keysym;

pub use evdev_to_keysym::EvdevToKeySym;
