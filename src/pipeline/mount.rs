//! Mount API - Application lifecycle and the render computation.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use serde_json::json;
//! use spark_vdom::{App, Attrs, MemoryHost, MountOptions};
//!
//! let host = Rc::new(RefCell::new(MemoryHost::with_mount_point("app")));
//! let options = MountOptions::new(json!({ "count": 0 }), |data, h| {
//!     h("p", Attrs::new(), vec![format!("count: {}", data.get("count")).into()])
//! })
//! .el("#app");
//!
//! let app = App::new(options, host.clone())?;
//! app.set("count", 1);
//! assert_eq!(host.borrow().inner_html(host.borrow().root()), "<p>count: 1</p>");
//!
//! app.unmount();
//! # Ok::<(), spark_vdom::Error>(())
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::host::HostTree;
use crate::reactive::{Computation, Proxy, ReactiveObject, Value, observe, proxy_top_level};
use crate::renderer::{PatchReport, ReconcileConfig, mount, patch_with};
use crate::types::NodeId;
use crate::vdom::{CreateElement, VNode, create_element};

/// A render function: reads application data through the proxy and builds one
/// root node with the element helper.
pub type RenderFn = dyn Fn(&Proxy, CreateElement) -> Result<VNode>;

// =============================================================================
// Mount Options
// =============================================================================

/// Everything needed to create an [`App`].
#[derive(Clone)]
pub struct MountOptions {
    /// Plain application data. Must be a JSON object.
    pub data: serde_json::Value,
    /// Selector of the anchor to mount onto. Without one, call [`App::mount`].
    pub el: Option<String>,
    pub render: Rc<RenderFn>,
    pub config: ReconcileConfig,
}

impl MountOptions {
    pub fn new(
        data: serde_json::Value,
        render: impl Fn(&Proxy, CreateElement) -> Result<VNode> + 'static,
    ) -> Self {
        Self {
            data,
            el: None,
            render: Rc::new(render),
            config: ReconcileConfig::default(),
        }
    }

    pub fn el(mut self, selector: impl Into<String>) -> Self {
        self.el = Some(selector.into());
        self
    }

    pub fn config(mut self, config: ReconcileConfig) -> Self {
        self.config = config;
        self
    }
}

impl fmt::Debug for MountOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountOptions")
            .field("data", &self.data)
            .field("el", &self.el)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// App
// =============================================================================

struct AppInner<H: HostTree> {
    data: ReactiveObject,
    proxy: Proxy,
    host: Rc<RefCell<H>>,
    render: Rc<RenderFn>,
    config: ReconcileConfig,
    anchor: Cell<Option<NodeId>>,
    /// Baseline tree, bound to the host.
    vnode: RefCell<Option<VNode>>,
    computation: RefCell<Option<Computation>>,
    last_error: RefCell<Option<Error>>,
    renders: Cell<u64>,
}

impl<H: HostTree> AppInner<H> {
    /// Render, then mount or patch. The baseline only moves on success.
    fn update_component(&self) -> Result<PatchReport> {
        let mut next = (self.render)(&self.proxy, create_element)?;

        let mut baseline = self.vnode.borrow_mut();
        let mut host = self.host.borrow_mut();
        let report = match baseline.as_ref() {
            None => {
                let anchor = self.anchor.get().ok_or(Error::Unrealized)?;
                mount(&mut *host, anchor, &mut next)?
            }
            Some(old) => patch_with(&mut *host, old, &mut next, self.config)?,
        };
        *baseline = Some(next);

        let renders = self.renders.get() + 1;
        self.renders.set(renders);
        debug!(
            renders,
            mutations = report.mutations,
            flags = ?report.flags,
            "render pass"
        );
        Ok(report)
    }
}

/// A mounted (or mountable) application: observed data, one render
/// computation and the retained baseline tree.
///
/// Cloning an `App` creates another handle to the same application.
pub struct App<H: HostTree + 'static> {
    inner: Rc<AppInner<H>>,
}

impl<H: HostTree + 'static> Clone for App<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: HostTree + 'static> App<H> {
    /// Observe `options.data` and mount if `options.el` is set.
    pub fn new(options: MountOptions, host: Rc<RefCell<H>>) -> Result<Self> {
        let data = match observe(options.data) {
            Value::Object(object) => object,
            other => return Err(Error::InvalidData(other.kind())),
        };
        let proxy = proxy_top_level(&data);

        let app = Self {
            inner: Rc::new(AppInner {
                data,
                proxy,
                host,
                render: options.render,
                config: options.config,
                anchor: Cell::new(None),
                vnode: RefCell::new(None),
                computation: RefCell::new(None),
                last_error: RefCell::new(None),
                renders: Cell::new(0),
            }),
        };

        if let Some(selector) = options.el {
            app.mount(&selector)?;
        }
        Ok(app)
    }

    /// Locate the anchor, create the render computation and run the first
    /// render. A failing first render is returned and leaves the app
    /// unmounted.
    ///
    /// Mounting is one-shot: after [`unmount`](Self::unmount) the rendered
    /// tree stays in the host and `mount` reports [`Error::AlreadyMounted`].
    pub fn mount(&self, selector: &str) -> Result<()> {
        if self.inner.computation.borrow().is_some() || self.inner.vnode.borrow().is_some() {
            return Err(Error::AlreadyMounted);
        }
        let anchor = self
            .inner
            .host
            .borrow()
            .query(selector)
            .ok_or_else(|| Error::AnchorNotFound(selector.to_string()))?;
        self.inner.anchor.set(Some(anchor));
        self.inner.last_error.take();

        let weak = Rc::downgrade(&self.inner);
        let computation = Computation::new(format!("render {selector}"), move || {
            let Some(inner) = weak.upgrade() else { return };
            if let Err(err) = inner.update_component() {
                error!(%err, "render failed");
                *inner.last_error.borrow_mut() = Some(err);
            }
        });

        if let Some(err) = self.inner.last_error.take() {
            computation.dispose();
            self.inner.anchor.set(None);
            return Err(err);
        }

        debug!(selector, anchor = %anchor, "app mounted");
        *self.inner.computation.borrow_mut() = Some(computation);
        Ok(())
    }

    /// Dispose the render computation. Later writes no longer re-render.
    pub fn unmount(&self) {
        if let Some(computation) = self.inner.computation.borrow().as_ref() {
            computation.dispose();
            debug!(renders = self.inner.renders.get(), "app unmounted");
        }
    }

    /// Whether the render computation is live.
    pub fn is_mounted(&self) -> bool {
        self.inner
            .computation
            .borrow()
            .as_ref()
            .is_some_and(|c| !c.is_disposed())
    }

    /// Re-run the render computation now, even if nothing changed.
    pub fn force_update(&self) -> Result<()> {
        let computation = self.inner.computation.borrow().clone();
        match computation {
            Some(computation) if !computation.is_disposed() => {
                computation.update();
                match self.inner.last_error.take() {
                    Some(err) => Err(err),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    // =========================================================================
    // Data access
    // =========================================================================

    /// Forwarded top-level read.
    pub fn get(&self, key: &str) -> Value {
        self.inner.proxy.get(key)
    }

    /// Forwarded top-level write. Re-renders synchronously when the value
    /// changed; a failed re-render is kept in [`take_last_error`](Self::take_last_error).
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        self.inner.proxy.set(key, value)
    }

    /// Read through a dotted path, e.g. `"user.name"` or `"items.0"`.
    pub fn get_path(&self, path: &str) -> Value {
        self.inner.proxy.get_path(path)
    }

    /// Write through a dotted path. Missing segments make this a no-op.
    pub fn set_path(&self, path: &str, value: impl Into<Value>) -> bool {
        self.inner.proxy.set_path(path, value)
    }

    pub fn data(&self) -> &ReactiveObject {
        &self.inner.data
    }

    pub fn proxy(&self) -> &Proxy {
        &self.inner.proxy
    }

    pub fn host(&self) -> &Rc<RefCell<H>> {
        &self.inner.host
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Successful render passes so far.
    pub fn render_count(&self) -> u64 {
        self.inner.renders.get()
    }

    /// Take the error of the most recent failed re-render, if any.
    pub fn take_last_error(&self) -> Option<Error> {
        self.inner.last_error.take()
    }

    /// Inspect the current baseline tree.
    pub fn with_vnode<R>(&self, f: impl FnOnce(Option<&VNode>) -> R) -> R {
        f(self.inner.vnode.borrow().as_ref())
    }

    /// The render computation, while mounted or after unmount.
    pub fn computation(&self) -> Option<Computation> {
        self.inner.computation.borrow().clone()
    }
}

impl<H: HostTree + 'static> fmt::Debug for App<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("data", &self.inner.data)
            .field("mounted", &self.is_mounted())
            .field("renders", &self.inner.renders.get())
            .finish_non_exhaustive()
    }
}
