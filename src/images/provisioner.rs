//! Icon provisioning for symbol layers
//!
//! Two strategies share one loader:
//!
//! - **Lazy**: the engine reports an icon it cannot find and
//!   [`ImageProvisioner::on_image_missing`] fetches and registers it; the
//!   engine re-renders on its own.
//! - **Placeholder**: before the engine sees the style,
//!   [`IconSwapPlan::rewrite`] points every layer using a custom icon at a
//!   transparent placeholder (phase 1). Once the style has loaded,
//!   [`ImageProvisioner::complete_swap`] awaits all icon loads and only then
//!   yields the commands that restore the real ids (phase 2).
//!
//! Concurrent requests for one id share a single fetch. An id is registered
//! at most once per map instance, and an id that failed is never fetched
//! again.

use crate::{
    constants::PLACEHOLDER_ICON_ID,
    core::config::StyleLayer,
    images::icon::{IconImage, IconResource},
    input::events::EngineCommand,
    prelude::{HashMap, HashSet},
    traits::{Fetcher, IconRegistry},
    MapError, Result,
};
use futures::future::{join_all, FutureExt, LocalBoxFuture, Shared};
use log::{debug, info, warn};
use std::{cell::RefCell, rc::Rc};

type LoadOutcome = std::result::Result<Rc<IconImage>, String>;
type IconLoad = Shared<LocalBoxFuture<'static, LoadOutcome>>;

pub struct ImageProvisioner<E: IconRegistry + ?Sized, F: Fetcher + ?Sized + 'static> {
    resources: HashMap<String, IconResource>,
    registry: Rc<RefCell<E>>,
    fetcher: Rc<F>,
    in_flight: RefCell<HashMap<String, IconLoad>>,
    /// Failure reason per icon id
    failed: RefCell<HashMap<String, String>>,
}

impl<E: IconRegistry + ?Sized, F: Fetcher + ?Sized + 'static> ImageProvisioner<E, F> {
    pub fn new(resources: &[IconResource], registry: Rc<RefCell<E>>, fetcher: Rc<F>) -> Self {
        Self {
            resources: resources
                .iter()
                .map(|resource| (resource.id.clone(), resource.clone()))
                .collect(),
            registry,
            fetcher,
            in_flight: RefCell::new(HashMap::default()),
            failed: RefCell::new(HashMap::default()),
        }
    }

    pub fn is_custom_icon(&self, id: &str) -> bool {
        self.resources.contains_key(id)
    }

    /// Number of fetches currently outstanding
    pub fn pending_count(&self) -> usize {
        self.in_flight.borrow().len()
    }

    pub fn has_failed(&self, id: &str) -> bool {
        self.failed.borrow().contains_key(id)
    }

    /// Loads and registers a custom icon unless it is already registered.
    ///
    /// A call for an id that is already loading waits on the existing fetch.
    /// An id whose load failed reports the recorded failure without fetching.
    pub async fn ensure_loaded(&self, id: &str) -> Result<()> {
        if self.registry.borrow().has_image(id) {
            return Ok(());
        }
        if let Some(reason) = self.failed.borrow().get(id) {
            return Err(MapError::IconLoadFailed {
                id: id.to_string(),
                reason: reason.clone(),
            });
        }
        let resource = self
            .resources
            .get(id)
            .ok_or_else(|| MapError::UnknownIcon(id.to_string()))?;

        let load = {
            let mut in_flight = self.in_flight.borrow_mut();
            match in_flight.get(id) {
                Some(load) => {
                    debug!("icon '{id}' already loading, joining");
                    load.clone()
                }
                None => {
                    let load = self.start_load(resource);
                    in_flight.insert(id.to_string(), load.clone());
                    load
                }
            }
        };

        let outcome = load.await;
        self.in_flight.borrow_mut().remove(id);

        match outcome {
            Ok(image) => self.register(id, &image),
            Err(reason) => {
                self.failed
                    .borrow_mut()
                    .insert(id.to_string(), reason.clone());
                Err(MapError::IconLoadFailed {
                    id: id.to_string(),
                    reason,
                })
            }
        }
    }

    /// Starts loading `ids` without waiting for them.
    ///
    /// Each load is polled once and then stays in the in-flight table, where
    /// the next [`Self::ensure_loaded`] for the id picks it up.
    pub fn begin_loading<'a>(&self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            match self.ensure_loaded(id).now_or_never() {
                Some(Ok(())) => debug!("icon '{id}' ready immediately"),
                Some(Err(e)) => debug!("icon '{id}' not loaded: {e}"),
                None => debug!("icon '{id}' loading"),
            }
        }
    }

    /// Handles the engine's missing-image notification.
    ///
    /// Ids outside the resource table belong to the style's sprite and are
    /// left to the engine.
    pub async fn on_image_missing(&self, id: &str) -> Result<()> {
        if !self.is_custom_icon(id) {
            debug!("missing image '{id}' is not a custom icon, ignored");
            return Ok(());
        }
        self.ensure_loaded(id).await
    }

    /// Loads several icons concurrently; one failure never aborts the others
    pub async fn provision_all<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> Vec<(String, Result<()>)> {
        let unique: Vec<&str> = {
            let mut seen = HashSet::default();
            ids.into_iter().filter(|id| seen.insert(*id)).collect()
        };
        join_all(
            unique
                .into_iter()
                .map(|id| async move { (id.to_string(), self.ensure_loaded(id).await) }),
        )
        .await
    }

    /// Registers the transparent placeholder used during phase 1
    pub fn register_placeholder(&self) -> Result<()> {
        self.register(PLACEHOLDER_ICON_ID, &IconImage::placeholder())
    }

    /// Phase 2 of the placeholder protocol.
    ///
    /// Resolves only after every icon in the plan has settled, then returns
    /// the commands restoring layers whose icon is now registered. Layers
    /// whose icon failed keep the placeholder.
    pub async fn complete_swap(&self, plan: &IconSwapPlan) -> Vec<EngineCommand> {
        let outcomes = self.provision_all(plan.icon_ids()).await;
        let failed = outcomes.iter().filter(|(_, result)| result.is_err()).count();
        if failed > 0 {
            warn!("{failed} of {} icons failed, their layers keep the placeholder", outcomes.len());
        }

        let registry = self.registry.borrow();
        let commands = plan.restore_commands(|id| registry.has_image(id));
        info!("restoring {} icon references", commands.len());
        commands
    }

    fn start_load(&self, resource: &IconResource) -> IconLoad {
        let fetcher = Rc::clone(&self.fetcher);
        let resource = resource.clone();
        async move {
            let decoded = async {
                let bytes = fetcher.fetch_bytes(&resource.source_url).await?;
                IconImage::decode(&bytes, resource.pixel_ratio)
            }
            .await;

            decoded.map(Rc::new).map_err(|e| {
                warn!("icon '{}' from {} failed: {e}", resource.id, resource.source_url);
                e.to_string()
            })
        }
        .boxed_local()
        .shared()
    }

    fn register(&self, id: &str, image: &IconImage) -> Result<()> {
        let mut registry = self.registry.borrow_mut();
        if registry.has_image(id) {
            return Ok(());
        }
        registry.add_image(id, image)?;
        debug!("registered icon '{id}' ({}x{})", image.width, image.height);
        Ok(())
    }
}

/// A symbol layer whose icon was replaced by the placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSwap {
    pub layer_id: String,
    pub icon_id: String,
}

/// The layers rewritten in phase 1, to be restored in phase 2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconSwapPlan {
    swaps: Vec<IconSwap>,
}

impl IconSwapPlan {
    /// Phase 1: points every layer that uses a custom icon at the placeholder.
    ///
    /// Must run before the style reaches the engine.
    pub fn rewrite(layers: &mut [StyleLayer], resources: &[IconResource]) -> Self {
        let custom: HashSet<&str> = resources.iter().map(|r| r.id.as_str()).collect();
        let mut swaps = Vec::new();

        for layer in layers.iter_mut() {
            let Some(icon_id) = layer.icon_image().filter(|id| custom.contains(id)) else {
                continue;
            };
            swaps.push(IconSwap {
                layer_id: layer.id.clone(),
                icon_id: icon_id.to_string(),
            });
            layer.set_icon_image(PLACEHOLDER_ICON_ID);
        }

        Self { swaps }
    }

    pub fn swaps(&self) -> &[IconSwap] {
        &self.swaps
    }

    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty()
    }

    /// Distinct icon ids referenced by the plan
    pub fn icon_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::default();
        self.swaps
            .iter()
            .map(|swap| swap.icon_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Restore commands for every swap whose icon passes `is_registered`
    pub fn restore_commands(&self, is_registered: impl Fn(&str) -> bool) -> Vec<EngineCommand> {
        self.swaps
            .iter()
            .filter(|swap| is_registered(&swap.icon_id))
            .map(|swap| EngineCommand::SetIconImage {
                layer_id: swap.layer_id.clone(),
                icon_id: swap.icon_id.clone(),
            })
            .collect()
    }
}
