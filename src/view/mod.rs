//! View controller: ties a template, a store and a managed region together.
//!
//! ```ignore
//! let mount = Node::element("div");
//! let view = ViewController::new(
//!     mount.clone(),
//!     ViewOptions::new(
//!         TemplateSource::Inline("{{#each this}}<p>{{title}}</p>{{/each}}".into()),
//!         json!([{"title": "A"}]),
//!     ),
//! )?;
//!
//! view.root().push(json!({"title": "B"}));
//! assert_eq!(mount.inner_html(), "<p>A</p><p>B</p>");
//! ```

mod fetch;
mod navigation;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::binding::FormBinder;
use crate::config::ViewConfig;
use crate::dom::Node;
use crate::error::ViewError;
use crate::render::{RenderOutcome, RenderStats, Renderer};
use crate::store::{kind_name, Observable, Shape, Store};
use crate::template::{HandlebarsEngine, Template};

pub use fetch::{FetchError, HydrationClient};

/// Class marking the element whose markup is the template when the template
/// is read from the mount.
const TEMPLATE_CLASS: &str = "tpl";

/// Where the controller gets its template from.
pub enum TemplateSource {
    /// Template markup, compiled with the options' engine.
    Inline(String),
    /// An already compiled render function.
    Precompiled(Rc<dyn Template>),
    /// The inner markup of the mount's `.tpl` element, or of the mount itself.
    FromMount,
}

impl fmt::Debug for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::Inline(markup) => f.debug_tuple("Inline").field(markup).finish(),
            TemplateSource::Precompiled(_) => f.write_str("Precompiled"),
            TemplateSource::FromMount => f.write_str("FromMount"),
        }
    }
}

/// Construction options for [`ViewController`].
pub struct ViewOptions {
    pub template: TemplateSource,
    pub data: Value,
    pub config: ViewConfig,
    pub engine: HandlebarsEngine,
}

impl ViewOptions {
    pub fn new(template: TemplateSource, data: Value) -> Self {
        Self {
            template,
            data,
            config: ViewConfig::default(),
            engine: HandlebarsEngine::new(),
        }
    }

    pub fn with_config(mut self, config: ViewConfig) -> Self {
        self.config = config;
        self
    }

    /// Compiles inline and mount templates with `engine`, e.g. one carrying
    /// extra helpers.
    pub fn with_engine(mut self, engine: HandlebarsEngine) -> Self {
        self.engine = engine;
        self
    }
}

struct ControllerInner {
    store: Store,
    renderer: Renderer,
    config: ViewConfig,
    client: RefCell<Option<HydrationClient>>,
    active: RefCell<HashMap<String, usize>>,
}

/// Owns one store and the region rendered from it.
///
/// Cloning shares the same view.
#[derive(Clone)]
pub struct ViewController {
    inner: Rc<ControllerInner>,
}

impl ViewController {
    /// Resolves the template, builds the store from `options.data` and
    /// renders once.
    ///
    /// Fails without producing a controller when no template is available,
    /// the template does not compile, the data is not an object or a list,
    /// or the configuration is invalid.
    pub fn new(mount: Node, options: ViewOptions) -> Result<Self, ViewError> {
        let ViewOptions {
            template,
            data,
            config,
            engine,
        } = options;
        config.validate()?;

        let template = resolve_template(&mount, template, &engine)?;
        let store = Store::new(data)?;
        let binder = FormBinder::new(store.clone(), config.binding.attribute.clone());
        let renderer = Renderer::new(mount, template, store.clone(), binder, config.render.clone());
        renderer.attach();

        let controller = Self {
            inner: Rc::new(ControllerInner {
                store,
                renderer,
                config,
                client: RefCell::new(None),
                active: RefCell::new(HashMap::new()),
            }),
        };

        debug!("View created");
        controller.inner.renderer.render();
        Ok(controller)
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Handle on the store root. Writes through it re-render the view.
    pub fn root(&self) -> Observable {
        self.inner.store.root()
    }

    pub fn mount(&self) -> &Node {
        self.inner.renderer.mount()
    }

    pub fn config(&self) -> &ViewConfig {
        &self.inner.config
    }

    /// Forces a render cycle without a store change.
    pub fn render(&self) -> RenderOutcome {
        self.inner.renderer.render()
    }

    pub fn render_stats(&self) -> RenderStats {
        self.inner.renderer.stats()
    }

    /// Replaces the store's contents in place.
    ///
    /// A list root is emptied and refilled (one change each). An object root
    /// is merged key by key; keys missing from `data` are kept. Existing
    /// handles stay valid either way.
    pub fn replace_data(&self, data: Value) -> Result<(), ViewError> {
        let root = self.root();
        match (root.shape(), data) {
            (Some(Shape::List), Value::Array(items)) => {
                debug!(items = items.len(), "Replacing list data");
                root.truncate(0);
                root.extend(items);
            }
            (Some(Shape::Object), Value::Object(map)) => {
                debug!(keys = map.len(), "Merging object data");
                for (key, value) in map {
                    root.set(&key, value);
                }
            }
            (shape, other) => {
                return Err(ViewError::ShapeMismatch {
                    expected: shape.unwrap_or(Shape::Object).name(),
                    found: kind_name(&other),
                });
            }
        }
        Ok(())
    }

    /// Fetches JSON from `url` and replaces the store's data with it.
    ///
    /// `before` is written first (e.g. a loading flag) and `after` once the
    /// data is in. On failure the `before` fields stay, `after` is not
    /// written, and the error is logged and returned.
    pub async fn fetch_and_replace(
        &self,
        url: &str,
        before: Map<String, Value>,
        after: Map<String, Value>,
    ) -> Result<(), ViewError> {
        self.write_fields(before);

        let result = self.hydrate(url).await;
        if let Err(err) = &result {
            error!(url, error = %err, error_type = err.error_type(), "Hydration failed");
            return result;
        }

        self.write_fields(after);
        Ok(())
    }

    /// Runs [`fetch_and_replace`](Self::fetch_and_replace) in the background.
    ///
    /// Must be called from within a `tokio::task::LocalSet`.
    pub fn spawn_fetch_and_replace(
        &self,
        url: impl Into<String>,
        before: Map<String, Value>,
        after: Map<String, Value>,
    ) -> JoinHandle<Result<(), ViewError>> {
        let controller = self.clone();
        let url = url.into();
        tokio::task::spawn_local(async move {
            controller.fetch_and_replace(&url, before, after).await
        })
    }

    async fn hydrate(&self, url: &str) -> Result<(), ViewError> {
        let client = self.client()?;
        let payload = client.fetch_json(url).await?;
        self.replace_data(payload)
    }

    /// The shared HTTP client, built on first use.
    fn client(&self) -> Result<HydrationClient, FetchError> {
        let mut slot = self.inner.client.borrow_mut();
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = HydrationClient::new(&self.inner.config.fetch)?;
        *slot = Some(client.clone());
        Ok(client)
    }

    fn write_fields(&self, fields: Map<String, Value>) {
        let root = self.root();
        for (key, value) in fields {
            if !root.set(&key, value).is_resolved() {
                warn!(key = %key, "Dropped field write on a list root");
            }
        }
    }
}

impl fmt::Debug for ViewController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewController")
            .field("store", &self.inner.store)
            .field("renderer", &self.inner.renderer)
            .finish()
    }
}

fn resolve_template(
    mount: &Node,
    source: TemplateSource,
    engine: &HandlebarsEngine,
) -> Result<Rc<dyn Template>, ViewError> {
    let markup = match source {
        TemplateSource::Precompiled(template) => return Ok(template),
        TemplateSource::Inline(markup) => markup,
        TemplateSource::FromMount => match mount.find(|node| node.has_class(TEMPLATE_CLASS)) {
            Some(holder) => holder.inner_html(),
            None => mount.inner_html(),
        },
    };

    if markup.trim().is_empty() {
        return Err(ViewError::MissingTemplate);
    }
    Ok(Rc::new(engine.compile(&markup)?))
}
