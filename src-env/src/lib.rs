//! Environment helpers shared by the SCE-UA binaries and tests

pub mod constants;
pub mod env_utils;

pub use env_utils::{EnvError, check_sceua_env, get_records_dir, get_sceua_dir};
