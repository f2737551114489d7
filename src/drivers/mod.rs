pub mod dualshock4;
