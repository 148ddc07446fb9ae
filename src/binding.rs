//! Bindable model
//!
//! A [`Binding`] wraps a `serde_json::Value` and exposes:
//! - `get` / `set` at a [`Path`]
//! - `watch`: listeners keyed by path, fired by the overlap rule
//! - `fieldset`: memoized child bindings scoped to a sub-path, kept in sync
//!   with the parent in both directions
//!
//! # Overlap rule
//!
//! A write at `P` notifies every listener whose registered path is an
//! ancestor of `P`, equal to `P`, or a descendant of `P`. Each listener
//! receives the current value at *its own* path.
//!
//! # Fieldset links
//!
//! Parent and child are connected by two [`Link`] records: `parent[path] →
//! child[root]` and `child[root] → parent[path]`. A link only writes when the
//! target holds a different value, which stops the echo after one hop.
//!
//! `Binding` is a cheap-clone handle (`Rc<RefCell<..>>`), single-threaded.
//! No internal borrow is held while listeners run, so listeners may call
//! back into any binding.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::BindError;
use crate::model;
use crate::options::BindingOptions;
use crate::path::{IntoPath, Path};

type Listener = Rc<dyn Fn(&Value)>;

/// Listeners registered under one path key, in registration order.
struct WatchEntry {
    path: Path,
    listeners: Vec<Listener>,
}

/// One direction of a fieldset synchronization.
#[derive(Clone)]
struct Link {
    /// Path on the owning binding whose changes are forwarded
    local: Path,
    target: Weak<RefCell<BindingInner>>,
    /// Path on the target that receives the value
    remote: Path,
}

struct BindingInner {
    model: Value,
    /// Path → index into `watches` (keeps first-registration order across paths)
    watch_index: FxHashMap<Path, usize>,
    watches: Vec<WatchEntry>,
    fieldsets: FxHashMap<Path, Binding>,
    links: Vec<Link>,
    /// Absolute path from the root binding
    path: Path,
    options: BindingOptions,
    /// Nested `set` depth, shared by the whole binding tree
    depth: Rc<Cell<usize>>,
}

impl BindingInner {
    fn new(model: Value, options: BindingOptions, depth: Rc<Cell<usize>>, path: Path) -> Self {
        Self {
            model,
            watch_index: FxHashMap::default(),
            watches: Vec::new(),
            fieldsets: FxHashMap::default(),
            links: Vec::new(),
            path,
            options,
            depth,
        }
    }
}

/// Counts one nested `set` for as long as it lives.
struct DepthGuard {
    depth: Rc<Cell<usize>>,
}

impl DepthGuard {
    fn enter(depth: Rc<Cell<usize>>, limit: usize, path: &Path) -> Result<Self, BindError> {
        // A top-level set is always allowed
        let limit = limit.max(1);
        let current = depth.get();
        if current >= limit {
            warn!(path = %path, limit, "propagation depth limit reached");
            return Err(BindError::PropagationDepthExceeded {
                path: path.key(),
                limit,
            });
        }
        depth.set(current + 1);
        Ok(Self { depth })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Handle to a bindable model. Clones share the same binding.
#[derive(Clone)]
pub struct Binding {
    inner: Rc<RefCell<BindingInner>>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Binding")
            .field("path", &inner.path)
            .field("model", &inner.model)
            .field("watch_keys", &inner.watches.len())
            .field("fieldsets", &inner.fieldsets.len())
            .finish()
    }
}

impl Binding {
    /// Create a root binding around `model`.
    pub fn new(model: Value) -> Self {
        Self::with_options(model, BindingOptions::default())
    }

    pub fn with_options(model: Value, options: BindingOptions) -> Self {
        Self::from_inner(BindingInner::new(
            model,
            options,
            Rc::new(Cell::new(0)),
            Path::root(),
        ))
    }

    /// Create a root binding from any serializable value.
    pub fn from_serializable<T: Serialize + ?Sized>(model: &T) -> Result<Self, BindError> {
        Ok(Self::new(serde_json::to_value(model)?))
    }

    fn from_inner(inner: BindingInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// True when both handles point at the same binding.
    pub fn ptr_eq(&self, other: &Binding) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn options(&self) -> BindingOptions {
        self.inner.borrow().options
    }

    /// Absolute path of this binding from its root (root for a root binding).
    pub fn path(&self) -> Path {
        self.inner.borrow().path.clone()
    }

    /// Snapshot of the whole model.
    pub fn model(&self) -> Value {
        self.inner.borrow().model.clone()
    }

    /// Value at `path`. The empty path returns the whole model.
    pub fn get(&self, path: impl IntoPath) -> Result<Value, BindError> {
        let path = path.into_path()?;
        let inner = self.inner.borrow();
        model::resolve(&inner.model, &path).cloned()
    }

    /// Deserialize the value at `path` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: impl IntoPath) -> Result<T, BindError> {
        Ok(serde_json::from_value(self.get(path)?)?)
    }

    /// True when `path` parses and resolves.
    pub fn contains(&self, path: impl IntoPath) -> bool {
        self.get(path).is_ok()
    }

    /// Every addressable path below the root of this binding's model.
    pub fn paths(&self) -> Vec<Path> {
        model::addressable_paths(&self.inner.borrow().model)
    }

    /// Write `value` at `path`, then notify overlapping listeners and links.
    ///
    /// Resolution errors fail before anything is mutated. Link failures do not
    /// stop the fan-out; the first one is returned once every listener ran.
    pub fn set(&self, path: impl IntoPath, value: Value) -> Result<(), BindError> {
        let path = path.into_path()?;
        let (depth, limit) = {
            let inner = self.inner.borrow();
            (Rc::clone(&inner.depth), inner.options.max_propagation_depth)
        };
        let _guard = DepthGuard::enter(depth, limit, &path)?;

        model::assign(&mut self.inner.borrow_mut().model, &path, value)?;
        debug!(path = %path, "set");

        self.notify(&path)
    }

    /// Serialize `value` and write it at `path`.
    pub fn set_serialized<T: Serialize + ?Sized>(
        &self,
        path: impl IntoPath,
        value: &T,
    ) -> Result<(), BindError> {
        self.set(path, serde_json::to_value(value)?)
    }

    /// Register `callback` for changes at, above or below `path`.
    ///
    /// Callbacks under the same path fire in registration order. A write that
    /// leaves `path` unresolvable (e.g. an ancestor replaced by a scalar) does
    /// not invoke the callback; watch a resolvable ancestor, or the root, when
    /// every change must be observed.
    pub fn watch<F>(&self, path: impl IntoPath, callback: F) -> Result<(), BindError>
    where
        F: Fn(&Value) + 'static,
    {
        let path = path.into_path()?;
        let mut inner = self.inner.borrow_mut();
        let existing = inner.watch_index.get(&path).copied();
        let index = match existing {
            Some(index) => index,
            None => {
                let index = inner.watches.len();
                inner.watch_index.insert(path.clone(), index);
                inner.watches.push(WatchEntry {
                    path,
                    listeners: Vec::new(),
                });
                index
            }
        };
        inner.watches[index].listeners.push(Rc::new(callback));
        Ok(())
    }

    /// Number of listeners registered across all paths.
    pub fn watcher_count(&self) -> usize {
        self.inner
            .borrow()
            .watches
            .iter()
            .map(|entry| entry.listeners.len())
            .sum()
    }

    /// Child binding scoped to `path`, created on first request.
    ///
    /// The child starts with the parent's value at `path` (which must exist),
    /// inherits the parent's options and stays in sync with it both ways.
    pub fn fieldset(&self, path: impl IntoPath) -> Result<Binding, BindError> {
        let path = path.into_path()?;
        if let Some(existing) = self.inner.borrow().fieldsets.get(&path) {
            return Ok(existing.clone());
        }

        let initial = self.get(&path)?;
        let child = {
            let inner = self.inner.borrow();
            Binding::from_inner(BindingInner::new(
                initial,
                inner.options,
                Rc::clone(&inner.depth),
                inner.path.join(&path),
            ))
        };

        child.inner.borrow_mut().links.push(Link {
            local: Path::root(),
            target: Rc::downgrade(&self.inner),
            remote: path.clone(),
        });

        let mut inner = self.inner.borrow_mut();
        inner.links.push(Link {
            local: path.clone(),
            target: Rc::downgrade(&child.inner),
            remote: Path::root(),
        });
        inner.fieldsets.insert(path.clone(), child.clone());
        debug!(path = %path, "fieldset created");

        Ok(child)
    }

    /// Number of fieldsets derived directly from this binding.
    pub fn fieldset_count(&self) -> usize {
        self.inner.borrow().fieldsets.len()
    }

    /// Run links, then listeners, overlapping the written `path`.
    fn notify(&self, path: &Path) -> Result<(), BindError> {
        // Snapshot so no borrow is held while other bindings/listeners run
        let (links, watches) = {
            let inner = self.inner.borrow();
            let links: Vec<Link> = inner
                .links
                .iter()
                .filter(|link| link.local.overlaps(path))
                .cloned()
                .collect();
            let watches: Vec<(Path, Vec<Listener>)> = inner
                .watches
                .iter()
                .filter(|entry| entry.path.overlaps(path))
                .map(|entry| (entry.path.clone(), entry.listeners.clone()))
                .collect();
            (links, watches)
        };

        let mut first_error = None;

        for link in links {
            if let Err(err) = self.propagate(&link) {
                warn!(error = %err, from = %link.local, to = %link.remote, "fieldset sync failed");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        for (watched, listeners) in watches {
            let current = match self.get(&watched) {
                Ok(value) => value,
                Err(err) => {
                    debug!(path = %watched, error = %err, "watched path no longer resolves");
                    continue;
                }
            };
            for listener in listeners {
                trace!(path = %watched, "listener");
                listener(&current);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Forward the value at `link.local` to the linked binding, unless it
    /// already holds that value.
    fn propagate(&self, link: &Link) -> Result<(), BindError> {
        let Some(target) = link.target.upgrade() else {
            return Ok(());
        };
        let target = Binding { inner: target };

        let value = match self.get(&link.local) {
            Ok(value) => value,
            Err(err) => {
                debug!(path = %link.local, error = %err, "linked path no longer resolves");
                return Ok(());
            }
        };

        if matches!(target.get(&link.remote), Ok(ref existing) if *existing == value) {
            trace!(path = %link.remote, "linked value unchanged");
            return Ok(());
        }

        debug!(from = %link.local, to = %link.remote, "fieldset sync");
        target.set(&link.remote, value)
    }
}
