// ── Reactive stores ──

mod collection;

pub(crate) use collection::KeyedCollection;
