use indexmap::IndexMap;

use crate::api::BatchFormat;

/// Embedded batch files, keyed by id, in listing order.
pub fn builtin_batches() -> IndexMap<&'static str, (BatchFormat, &'static str)> {
    IndexMap::from([
        (
            "goblin_volley",
            (
                BatchFormat::Yaml,
                include_str!("../content/batches/goblin_volley.yaml"),
            ),
        ),
        (
            "skeleton_archers",
            (
                BatchFormat::Json,
                include_str!("../content/batches/skeleton_archers.json"),
            ),
        ),
    ])
}
