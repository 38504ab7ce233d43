//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Default hotkey combos, one per binding
pub const DEFAULT_RECORD_TOGGLE: &str = "CmdOrCtrl+Shift+R";
pub const DEFAULT_PASTE_LAST: &str = "CmdOrCtrl+Shift+V";
pub const DEFAULT_OPEN_APP: &str = "CmdOrCtrl+Shift+O";

/// Default number of presses buffered per binding before new ones are dropped
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Settings file location, relative to the home directory
pub const DEFAULT_SETTINGS_PATH: &str = "~/.whispr/settings.json";
