mod fingerprint;
mod hash;
mod info;
mod matching;

use std::path::{Path, PathBuf};

use crate::output::print_warning;

pub use fingerprint::cmd_fingerprint;
pub use hash::cmd_hash;
pub use info::cmd_info;
pub use matching::cmd_match;

/// Make `path` absolute, resolving symlinks when it exists.
///
/// Paths that cannot be canonicalized are kept as given (made absolute) so
/// the snapshotter reports them as missing or broken.
fn resolve_path(path: &Path) -> PathBuf {
  match dunce::canonicalize(path) {
    Ok(resolved) => resolved,
    Err(_) => {
      if !path.exists() {
        print_warning(&format!("{} does not exist", path.display()));
      }
      std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    }
  }
}
