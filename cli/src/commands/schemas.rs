use subconf_common::SchemaRegistry;
use tracing::error;

use crate::mprint;
use crate::terminal::{format, print};

pub fn schemas() {
    let registry = SchemaRegistry::builtin();
    let names: Vec<&str> = registry.names().collect();

    for (idx, name) in names.iter().enumerate() {
        match registry.create(name) {
            Ok(settings) => {
                print::tree_head(idx, name);
                print::as_tree_one_level(format::kinds_to_detail(&settings));
            }
            Err(e) => error!("Schema {} failed to build: {}", name, e),
        }
        if idx + 1 != names.len() {
            mprint!();
        }
    }
}
