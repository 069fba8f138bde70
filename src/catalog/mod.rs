/*!
 * Message catalogs and the operations that reconcile them.
 *
 * - `model`: in-memory catalog, context and entry types
 * - `po_codec`: reading and writing gettext PO files
 * - `sync`: source → target synchronization
 * - `backlog`: extraction of entries still waiting for a translation
 */

pub use self::backlog::{Backlog, ContextBacklog, extract_backlog};
pub use self::model::{
    Catalog, Context, DEFAULT_CONTEXT, Entry, EntryMetadata, HEADER_KEY, TranslationStatus,
};
pub use self::po_codec::{parse_catalog, serialize_catalog};
pub use self::sync::{SyncReport, synchronize, synchronize_with_report};

pub mod backlog;
pub mod model;
pub mod po_codec;
pub mod sync;
