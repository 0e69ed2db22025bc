//! Global constants used throughout the exporter.
//!
//! This module contains timeouts, retry parameters, sentinel markers and other
//! fixed values shared by several modules. Defining them centrally keeps the
//! magic numbers discoverable.

use std::time::Duration;

/// Name of the mod every other mod implicitly depends on.
pub const BASE_MOD_NAME: &str = "base";

/// Name of the in-game dump mod which emits the raw data.
pub const DUMP_MOD_NAME: &str = "Dump";

/// Marker opening the JSON payload of the data stage.
pub const DATA_STAGE_BEGIN: &str = ">>>DATA>>>";

/// Marker closing the JSON payload of the data stage.
pub const DATA_STAGE_END: &str = "<<<DATA<<<";

/// Marker opening the JSON payload of the control stage.
pub const CONTROL_STAGE_BEGIN: &str = ">>>CONTROL>>>";

/// Marker closing the JSON payload of the control stage.
pub const CONTROL_STAGE_END: &str = "<<<CONTROL<<<";

/// Pattern of the log lines the game prints for every loaded mod, in load order.
pub const MOD_CHECKSUM_PATTERN: &str = r"(?m)^\s+[0-9.]+ Checksum of (.*): \d+\r?$";

/// Dump entity types which never become icons.
pub const ICON_TYPE_BLACKLIST: &[&str] = &["technology", "tutorial"];

/// Units of the machine energy usage, each 1000 times the previous one.
pub const ENERGY_USAGE_UNITS: &[&str] = &["W", "kW", "MW", "GW", "TW", "PW", "EW", "ZW", "YW"];

/// Locale used for localised strings which are plain text instead of keys.
pub const DEFAULT_LOCALE: &str = "en";

/// Default number of game instances running in parallel.
pub const DEFAULT_NUMBER_OF_INSTANCES: usize = 4;

/// Default number of attempts to export a single combination.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay between two attempts of the same combination, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Default timeout for a single game process (10 minutes).
///
/// Large mod packs need several minutes for the data stage alone, so this is
/// deliberately generous.
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(600);

/// Exit code for lookups of mods or combinations which do not exist.
pub const EXIT_CODE_NOT_FOUND: i32 = 404;

/// Exit code for every other failure of an export command.
pub const EXIT_CODE_EXPORT_FAILED: i32 = 500;

/// Size icons get rendered with, in pixels.
pub const ICON_RENDERED_SIZE: u32 = 64;

/// Dump entity types whose icons belong to their own namespace only.
pub const ICON_OWN_NAMESPACE_TYPES: &[&str] = &["item", "fluid", "recipe", "mod"];
