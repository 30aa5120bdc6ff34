//! Render cycle: template → markup → nodes → patch → rebind.
//!
//! The renderer has two states. Before the first successful render there is
//! no previous node list and the region's children are replaced wholesale.
//! Afterwards every render is patched in position by position.
//!
//! # Invariants
//!
//! 1. A failed template render leaves the region exactly as it was.
//! 2. Renders run synchronously, once per store change, in write order.
//! 3. At most `max_depth` renders are on the stack at once; a render requested
//!    beyond that is skipped and counted.
//! 4. Output from an older snapshot never lands over output from a newer one.
//!    A cycle whose template wrote to the store, and so triggered a nested
//!    render, drops its own markup.

mod reconcile;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, error, warn};

use crate::binding::{BindReport, FormBinder};
use crate::config::RenderConfig;
use crate::dom::{parse_fragment, Node};
use crate::store::{Store, Subscription};
use crate::template::Template;

pub use reconcile::PatchSummary;

/// Result of one call to [`Renderer::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The region was patched and rebound.
    Rendered {
        patch: PatchSummary,
        binding: BindReport,
    },
    /// The template failed; the previous output stays.
    Failed,
    /// Skipped by the re-entrancy guard.
    Suppressed,
    /// A nested render already applied a newer snapshot.
    Superseded,
}

/// Running totals across all render cycles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub renders: u64,
    pub failures: u64,
    pub suppressed: u64,
    pub superseded: u64,
    pub kept: u64,
    pub replaced: u64,
    pub appended: u64,
    pub pruned: u64,
}

impl RenderStats {
    fn record(&mut self, patch: &PatchSummary) {
        self.renders += 1;
        self.kept += patch.kept as u64;
        self.replaced += patch.replaced as u64;
        self.appended += patch.appended as u64;
        self.pruned += patch.pruned as u64;
    }
}

struct RendererInner {
    mount: Node,
    template: Rc<dyn Template>,
    store: Store,
    binder: FormBinder,
    config: RenderConfig,
    previous: RefCell<Option<Vec<Node>>>,
    applied: Cell<Option<u64>>,
    depth: Cell<u32>,
    stats: Cell<RenderStats>,
    subscription: RefCell<Option<Subscription>>,
}

/// Owns the managed region and keeps it in sync with a store.
#[derive(Clone)]
pub struct Renderer {
    inner: Rc<RendererInner>,
}

impl Renderer {
    pub fn new(
        mount: Node,
        template: Rc<dyn Template>,
        store: Store,
        binder: FormBinder,
        config: RenderConfig,
    ) -> Self {
        Self {
            inner: Rc::new(RendererInner {
                mount,
                template,
                store,
                binder,
                config,
                previous: RefCell::new(None),
                applied: Cell::new(None),
                depth: Cell::new(0),
                stats: Cell::new(RenderStats::default()),
                subscription: RefCell::new(None),
            }),
        }
    }

    /// Re-renders on every store change from now on.
    ///
    /// The store only holds a weak reference back, so dropping every clone of
    /// the renderer ends the subscription.
    pub fn attach(&self) {
        let weak: Weak<RendererInner> = Rc::downgrade(&self.inner);
        let subscription = self.inner.store.subscribe(move || {
            if let Some(inner) = weak.upgrade() {
                Renderer { inner }.render();
            }
        });
        *self.inner.subscription.borrow_mut() = Some(subscription);
    }

    /// Stops reacting to store changes. The region keeps its last output.
    pub fn detach(&self) {
        self.inner.subscription.borrow_mut().take();
    }

    pub fn is_attached(&self) -> bool {
        self.inner.subscription.borrow().is_some()
    }

    pub fn mount(&self) -> &Node {
        &self.inner.mount
    }

    /// True once a render has succeeded.
    pub fn is_steady(&self) -> bool {
        self.inner.previous.borrow().is_some()
    }

    pub fn stats(&self) -> RenderStats {
        self.inner.stats.get()
    }

    /// Runs one render cycle.
    pub fn render(&self) -> RenderOutcome {
        let inner = &self.inner;

        if inner.depth.get() >= inner.config.max_depth {
            warn!(
                max_depth = inner.config.max_depth,
                "Render re-entered too deeply, skipping"
            );
            self.update_stats(|stats| stats.suppressed += 1);
            return RenderOutcome::Suppressed;
        }
        let _guard = DepthGuard::enter(&inner.depth);

        let revision = inner.store.revision();
        let context = inner.store.snapshot();
        let markup = match inner.template.render(&context) {
            Ok(markup) => markup,
            Err(err) => {
                error!(error = %err, "Render failed, keeping previous output");
                self.update_stats(|stats| stats.failures += 1);
                return RenderOutcome::Failed;
            }
        };

        if inner.applied.get().is_some_and(|applied| applied > revision) {
            debug!(revision, "Render superseded by a nested render");
            self.update_stats(|stats| stats.superseded += 1);
            return RenderOutcome::Superseded;
        }

        let nodes = parse_fragment(&markup);
        let patch = if self.is_steady() {
            reconcile::patch(&inner.mount, &nodes, inner.config.prune_stale_nodes)
        } else {
            reconcile::replace_all(&inner.mount, &nodes)
        };
        debug!(
            revision,
            depth = inner.depth.get(),
            wholesale = patch.wholesale,
            kept = patch.kept,
            replaced = patch.replaced,
            appended = patch.appended,
            pruned = patch.pruned,
            "Rendered"
        );

        let binding = inner.binder.bind(&inner.mount);
        *inner.previous.borrow_mut() = Some(nodes);
        inner.applied.set(Some(revision));
        self.update_stats(|stats| stats.record(&patch));

        RenderOutcome::Rendered { patch, binding }
    }

    fn update_stats(&self, f: impl FnOnce(&mut RenderStats)) {
        let mut stats = self.inner.stats.get();
        f(&mut stats);
        self.inner.stats.set(stats);
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("steady", &self.is_steady())
            .field("attached", &self.is_attached())
            .field("stats", &self.stats())
            .finish()
    }
}

/// Tracks render nesting; leaving the scope pops one level.
struct DepthGuard<'a> {
    depth: &'a Cell<u32>,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        Self { depth }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
