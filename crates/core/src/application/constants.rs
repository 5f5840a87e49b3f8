// Runner constants (no magic values)

/// Permission bits for capture files: owner rw, group r, other r
pub const DEFAULT_CAPTURE_MODE: u32 = 0o644;

/// Environment override for the capture file mode (octal)
pub const CAPTURE_MODE_ENV: &str = "CMDHARNESS_CAPTURE_MODE";

/// LTP result code: test passed
pub const TPASS: i32 = 0;

/// LTP result code: test broken (fatal)
pub const TBROK: i32 = 2;

/// LTP result code: warning
pub const TWARN: i32 = 4;
