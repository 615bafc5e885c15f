//! Process-wide registry of the SQLite extension modules loaded on every connection.
//!
//! The set is fixed once per process: the first registration wins and later
//! calls are no-ops. Opening a geopackage without an explicit registration
//! registers [`DEFAULT_EXTENSIONS`].

use std::sync::OnceLock;

use tracing::{debug, warn};

/// Spatial functions (`ST_MinX`, ...) and UUID functions (`uuid4`, `uuid5`).
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["mod_spatialite", "uuid"];

static REGISTERED: OnceLock<Vec<String>> = OnceLock::new();

/// Register the extension set for this process.
///
/// Returns `true` if this call performed the registration, `false` if a set was
/// already registered (in which case `names` is ignored).
pub fn register_extensions<I, S>(names: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    let mut registered_now = false;
    let current = REGISTERED.get_or_init(|| {
        registered_now = true;
        names.clone()
    });
    if registered_now {
        debug!(extensions = ?current, "registered sqlite extensions");
    } else if *current != names {
        warn!(
            registered = ?current,
            requested = ?names,
            "sqlite extensions already registered, ignoring"
        );
    }
    registered_now
}

/// The registered extension set, registering the defaults if none was set.
pub fn registered_extensions() -> &'static [String] {
    REGISTERED.get_or_init(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_registration_wins() {
        register_extensions(["mod_spatialite", "uuid"]);
        let second = register_extensions(["something_else"]);

        assert!(!second);
        assert_eq!(registered_extensions(), &["mod_spatialite", "uuid"]);
    }
}
