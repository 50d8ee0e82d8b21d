//! A small set of concrete checks shipped as runnable examples of the
//! check contract (§4.3) and to make the default pipeline non-trivial out
//! of the box. The rule logic itself is explicitly out of scope for the
//! engine; these exist only to exercise it end to end.

mod forbidden_import;
mod merge_conflict;
mod no_barrel_imports;

use crate::check::{Check, Registry};
use std::sync::Arc;

pub fn register_all(registry: &mut Registry) {
    registry.register("merge-conflict-markers", || {
        Arc::new(merge_conflict::MergeConflictMarkers) as Arc<dyn Check>
    });
    registry.register("no-barrel-imports", || {
        Arc::new(no_barrel_imports::NoBarrelImports) as Arc<dyn Check>
    });
    registry.register("forbidden-import", || {
        Arc::new(forbidden_import::ForbiddenImport::default()) as Arc<dyn Check>
    });
}
