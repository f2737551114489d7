//! Decode DualShock 4 USB HID input reports into typed controller state and
//! republish each snapshot to interested subscribers.
//!
//! The [drivers::dualshock4::driver::Driver] owns the HID handle and the
//! connection lifecycle; every report it reads is decoded into a
//! [drivers::dualshock4::state::DualShockState] and published to a
//! [channel::StateChannel] that always holds the latest snapshot.

pub mod channel;
pub mod drivers;
pub mod transport;

pub use channel::{StateChannel, Subscription};
pub use drivers::dualshock4::driver::{ConnectionStatus, Driver, DriverError, DualShockOptions};
pub use drivers::dualshock4::state::DualShockState;
