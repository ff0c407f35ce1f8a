//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | input            | File I/O and parse failures              |
//! | 10-19   | assist           | Assist provider/keychain codes           |
//! | 20-29   | dataset          | Dataset and reconciliation codes         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use taskgrid_recon::ReconError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Input (3-9)
// =============================================================================

/// Cannot read an input file.
pub const EXIT_IO: u8 = 3;

/// Input file is not valid CSV / JSON / TOML.
pub const EXIT_PARSE: u8 = 4;

// =============================================================================
// Assist (10-19)
// =============================================================================

/// Assist disabled (provider=none). Informational for `assist doctor`.
pub const EXIT_ASSIST_DISABLED: u8 = 10;

/// Assist provider configured but API key missing.
pub const EXIT_ASSIST_MISSING_KEY: u8 = 11;

// =============================================================================
// Dataset (20-29)
// =============================================================================

/// Nothing to reconcile: all three collections are empty.
pub const EXIT_NO_DATASET: u8 = 20;

/// `reconcile --strict` found headers that still need review.
pub const EXIT_NEEDS_REVIEW: u8 = 21;

/// A `--set` override named a bad entity or header index.
pub const EXIT_INVALID_EDIT: u8 = 22;

/// Reconciliation config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 23;

/// Map a reconciliation error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::UnknownEntity(_)
        | ReconError::EntityNotInSession(_)
        | ReconError::HeaderIndexOutOfRange { .. } => EXIT_INVALID_EDIT,
        ReconError::NoDatasetLoaded => EXIT_NO_DATASET,
        ReconError::Assist(_) => EXIT_ERROR,
    }
}
