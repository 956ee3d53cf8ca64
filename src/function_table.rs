//! The global registry of named functions, in the same "owns its own
//! identity, clone is pointer-identity" spirit as a shared table would
//! need in a systems language: cloning a `FunctionTable` clones the
//! `Rc` handle, not the map inside it, so every clone observes the same
//! live records and snapshots — this is what lets a snapshot's captured
//! `captured_funs` see a function body that gets swapped in after the
//! snapshot was taken.

use crate::errors::EvalError;
use crate::eval::Evaluator;
use crate::reader::SourceLocation;
use crate::value::FunctionRecord;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Instant;

/// A deep copy of the evaluator tree taken immediately before entering
/// a named function, plus the wall-clock time it was taken.
pub struct Snapshot {
    pub tree: Evaluator,
    pub taken_at: Instant,
}

struct Inner {
    records: FxHashMap<String, Rc<FunctionRecord>>,
    snapshots: FxHashMap<String, Snapshot>,
    /// Non-owning handle to the driver's current root, set by
    /// `Driver::run_step` after every `Child` replacement. Snapshotting
    /// upgrades this to get at "the tree as it stands right now"
    /// without the table itself owning (and thus needing to deep-copy)
    /// the tree.
    driver_root: Weak<RefCell<Evaluator>>,
}

#[derive(Clone)]
pub struct FunctionTable {
    inner: Rc<RefCell<Inner>>,
}

impl FunctionTable {
    pub fn new() -> Self {
        FunctionTable {
            inner: Rc::new(RefCell::new(Inner {
                records: FxHashMap::default(),
                snapshots: FxHashMap::default(),
                driver_root: Weak::new(),
            })),
        }
    }

    pub fn define(&self, record: FunctionRecord, loc: SourceLocation) -> Result<(), EvalError> {
        let mut inner = self.inner.borrow_mut();
        if inner.records.contains_key(&record.name) {
            return Err(EvalError::DuplicateDefinition {
                name: record.name.clone(),
                location: loc,
            });
        }
        inner.records.insert(record.name.clone(), Rc::new(record));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<FunctionRecord>> {
        self.inner.borrow().records.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.inner.borrow().records.keys().cloned().collect()
    }

    /// Replaces a record's params/body, preserving the identity
    /// (captured env/funs) of whatever record previously held the name.
    /// Used only by the reload controller's hot-swap path.
    pub fn replace_body(&self, name: &str, params: Vec<String>, body: crate::reader::Expr) {
        let mut inner = self.inner.borrow_mut();
        if let Some(old) = inner.records.get(name) {
            let new_record = FunctionRecord {
                name: name.to_string(),
                params,
                body,
                captured_env: old.captured_env.clone(),
                captured_funs: old.captured_funs.clone(),
            };
            inner.records.insert(name.to_string(), Rc::new(new_record));
        }
    }

    pub fn publish_root(&self, root: &Rc<RefCell<Evaluator>>) {
        self.inner.borrow_mut().driver_root = Rc::downgrade(root);
    }

    /// Deep-copies the current driver root (if one has been published)
    /// and stores it as `name`'s snapshot, overwriting any prior one.
    pub fn snapshot(&self, name: &str) {
        let root = match self.inner.borrow().driver_root.upgrade() {
            Some(r) => r,
            None => return,
        };
        let copy = root.borrow().deep_copy();
        self.inner.borrow_mut().snapshots.insert(
            name.to_string(),
            Snapshot {
                tree: copy,
                taken_at: Instant::now(),
            },
        );
    }

    pub fn take_snapshot(&self, name: &str) -> Option<Snapshot> {
        self.inner.borrow_mut().snapshots.remove(name)
    }

    pub fn snapshot_exists(&self, name: &str) -> bool {
        self.inner.borrow().snapshots.contains_key(name)
    }

    pub fn snapshot_time(&self, name: &str) -> Option<Instant> {
        self.inner.borrow().snapshots.get(name).map(|s| s.taken_at)
    }

    /// Wipes every snapshot; used on a full reset.
    pub fn clear_snapshots(&self) {
        self.inner.borrow_mut().snapshots.clear();
    }

    /// Wipes every registered function record. Used on a full reset:
    /// the restored tree is the program's original root re-evaluating
    /// its `(fun ...)` forms from scratch, and `define` rejects a name
    /// already present (`DuplicateDefinition`) — so the table has to
    /// forget the previous run's records first, or the very functions
    /// the reset is trying to restore would collide with themselves.
    pub fn clear_records(&self) {
        self.inner.borrow_mut().records.clear();
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}
