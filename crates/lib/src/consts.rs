//! File names and defaults shared across the crate.

/// Pack manifest file, relative to the pack directory.
pub const PACK_MANIFEST_FILE: &str = "pack.json";

/// Directory holding one manifest per variant.
pub const VARIANT_DIR: &str = "packs";

/// Working directory root for compiled packwiz packs (`bin/<target>/<variant>`).
pub const BIN_DIR: &str = "bin";

/// Destination root for exported artifacts (`exports/<target>/<variant>`).
pub const EXPORTS_DIR: &str = "exports";

/// Executable used when neither the CLI nor the manifest names one.
pub const DEFAULT_PACKWIZ: &str = "packwiz";

/// Slug of the variant created by `init`.
pub const DEFAULT_VARIANT_SLUG: &str = "main";

/// Display name of the variant created by `init`.
pub const DEFAULT_VARIANT_NAME: &str = "Main";

/// Exit code reported when a process was terminated by a signal.
pub const SIGNAL_EXIT_CODE: i32 = -1;
