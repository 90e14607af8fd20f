//! Hard caps on operator and file input.

pub const MAX_IDENTITY_LEN: usize = 128;
pub const MAX_RESERVATIONS: usize = 100_000;
pub const MAX_SNAPSHOT_BYTES: usize = 256 * 1024 * 1024;
