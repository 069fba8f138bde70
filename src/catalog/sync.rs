/*!
 * Source → target catalog reconciliation.
 */

use log::debug;

use super::model::Catalog;

/// What a synchronization pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries copied from the source into the target
    pub added: usize,
    /// Pending entries rewritten from `[]` to `[""]`
    pub normalized: usize,
}

impl SyncReport {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.normalized > 0
    }
}

/// Make `target` contain every key of `source`, context by context.
///
/// Missing entries are deep-copied and start pending (the header is copied
/// verbatim). Existing translations are never touched.
pub fn synchronize<'a>(source: &Catalog, target: &'a mut Catalog) -> &'a mut Catalog {
    synchronize_with_report(source, target);
    target
}

/// Same as [`synchronize`], reporting what changed
pub fn synchronize_with_report(source: &Catalog, target: &mut Catalog) -> SyncReport {
    let mut report = SyncReport::default();

    for source_context in source.contexts() {
        let target_context = target.ensure_context(source_context.name());

        for source_entry in source_context.iter() {
            if !target_context.contains_key(source_entry.key()) {
                target_context.insert(source_entry.pending_copy());
                report.added += 1;
            }
        }
    }

    report.normalized = target
        .contexts_mut()
        .flat_map(|context| context.iter_mut())
        .map(|entry| entry.normalize_pending())
        .filter(|changed| *changed)
        .count();

    debug!(
        "Synchronized catalog: {} added, {} normalized",
        report.added, report.normalized
    );
    report
}
