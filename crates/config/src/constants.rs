//! Fixed file names and defaults shared across impack crates

/// Manifest file names searched, in order, when a directory is given
pub const MANIFEST_FILES: [&str; 3] = ["impack.json", "impack.yaml", "impack.yml"];

/// Manifest keys that may hold the component tree; first present wins
pub const COMPONENT_KEYS: [&str; 4] = ["comps", "components", "deps", "dependencies"];

/// Output directory created next to the manifest when none is given
pub const DEFAULT_OUTPUT_DIR: &str = ".impack";

pub const STAGE_DIR: &str = "stage";
pub const HOOKS_DIR: &str = "hooks";
pub const LOGS_DIR: &str = "logs";

/// Per-transfer scratch space, kept inside the output directory
pub const SCRATCH_DIR: &str = ".scratch";

/// Parent of the default install prefix (`/opt/<name>`)
pub const PACK_HOME_ROOT: &str = "/opt";

pub const DEFAULT_ARCHITECTURE: &str = "armhf";
pub const DEFAULT_PACKER: &str = "fpm";
pub const DEFAULT_NPM: &str = "npm";
pub const DEFAULT_JOBS: usize = 4;
