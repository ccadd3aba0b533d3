/// Number of hash characters shown in human-readable output.
pub const SHORT_HASH_LEN: usize = 12;

/// Domain tags mixed into combined hashes so that hashes of different kinds
/// of objects never collide.
pub const DIRECTORY_HASH_DOMAIN: &str = "stratum:directory:v1";
pub const FINGERPRINT_HASH_DOMAIN: &str = "stratum:fingerprint:v1";
pub const SNAPSHOT_SIGNATURE_DOMAIN: &str = "stratum:snapshot:v1";
pub const STRATEGY_HASH_DOMAIN: &str = "stratum:strategy:v1";

/// Content standing in for directories and missing files in fingerprints.
pub const DIRECTORY_SIGNATURE: &[u8] = b"stratum:dir";
pub const MISSING_FILE_SIGNATURE: &[u8] = b"stratum:missing";

/// Extension kept by the compile class path normalizer.
pub const CLASS_FILE_EXTENSION: &str = "class";
