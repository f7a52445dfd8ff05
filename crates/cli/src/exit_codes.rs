//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: batch scripts chaining the
//! three stages rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Success (also `--help` / `--version`)               |
//! | 1    | Usage error (wrong argument count, unknown flag)    |
//! | 3    | Schema error (required column missing)              |
//! | 4    | I/O error (unreadable input, unwritable output)     |
//! | 5    | Configuration error (bad `--config` file)           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`'s conversions

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - wrong argument count, unknown option.
pub const EXIT_USAGE: u8 = 1;

/// A sheet or file lacks a required column. No output is written for the stage.
pub const EXIT_SCHEMA: u8 = 3;

/// Input could not be read, or output could not be written.
pub const EXIT_IO: u8 = 4;

/// The `--config` file is unreadable, malformed, or fails validation.
pub const EXIT_CONFIG: u8 = 5;
