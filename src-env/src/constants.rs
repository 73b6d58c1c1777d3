/// Environment variable pointing at the project root
pub const SCEUA_DIR_ENV: &str = "SCEUA_DIR";

/// Directory, relative to the project root, receiving generated files
pub const DATA_GENERATED: &str = "data_generated";

/// Subdirectory of [`DATA_GENERATED`] receiving optimisation records
pub const RECORDS: &str = "records";
