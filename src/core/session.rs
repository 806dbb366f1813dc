//! The controller object of one embedded map
//!
//! A session is built in two steps. [`PreparedMap`] validates the
//! configuration and, with the placeholder icon strategy, rewrites icon
//! references before anything reaches the engine. [`PreparedMap::attach`]
//! then binds the style to a live engine and returns the [`MapSession`]
//! that owns every piece of controller state.
//!
//! The decision components never touch the engine. They return
//! [`EngineCommand`] and [`UiCommand`] lists, and the session applies each
//! list under a single engine borrow.

use crate::{
    core::config::{ConfigModel, IconStrategy, InitialView, ValidatedConfig},
    core::geo::ScreenPoint,
    data::bounds::{BoundsFitter, GeometrySource},
    images::provisioner::{IconSwapPlan, ImageProvisioner},
    input::{
        events::{EngineCommand, InputEvent, RenderedFeature, UiCommand},
        picker::{FeaturePicker, FeatureRecord},
    },
    layers::{
        manager::{VisibilityController, VisibilityState},
        zoom::EffectiveZoomRange,
    },
    traits::{Fetcher, RenderEngine},
    ui::{controls::ControlSet, panel::InfoPanel, UiState},
    Result,
};
use futures::future::join;
use log::{debug, info, warn};
use serde_json::Value;
use std::{cell::RefCell, rc::Rc};

/// A validated configuration whose style is ready to hand to the engine
#[derive(Debug, Clone)]
pub struct PreparedMap {
    config: ValidatedConfig,
    swap_plan: IconSwapPlan,
}

impl PreparedMap {
    pub fn new(config: ConfigModel) -> Self {
        let mut config = config.validate();
        let swap_plan = match config.custom_ui().icon_strategy {
            IconStrategy::Placeholder => {
                let icons = config.icons().to_vec();
                IconSwapPlan::rewrite(config.layers_mut(), &icons)
            }
            IconStrategy::Lazy => IconSwapPlan::default(),
        };
        if !swap_plan.is_empty() {
            debug!("{} layers start on the placeholder icon", swap_plan.swaps().len());
        }
        Self { config, swap_plan }
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn swap_plan(&self) -> &IconSwapPlan {
        &self.swap_plan
    }

    /// The style document the engine should be created with
    pub fn style(&self) -> Result<Value> {
        self.config.config().style_document()
    }

    /// Binds the prepared map to an engine that has been given [`Self::style`].
    ///
    /// Registers the placeholder and starts the real icon loads when the
    /// style references it, syncs layer visibility and zoom limits, and
    /// applies an explicit `bounds` view.
    pub fn attach<E, F>(self, engine: Rc<RefCell<E>>, fetcher: Rc<F>) -> Result<MapSession<E, F>>
    where
        E: RenderEngine + ?Sized,
        F: Fetcher + ?Sized + 'static,
    {
        let Self { config, swap_plan } = self;

        let images = ImageProvisioner::new(config.icons(), Rc::clone(&engine), Rc::clone(&fetcher));
        if !swap_plan.is_empty() {
            images.register_placeholder()?;
            images.begin_loading(swap_plan.icon_ids());
        }

        let custom_ui = config.custom_ui();
        let controls = ControlSet::from_config(
            &custom_ui.controls,
            config.backgrounds().len(),
            config.data_layers().len(),
        );
        let ui = UiState::new(InfoPanel::new(custom_ui.panel.clone()), controls);

        let mut session = MapSession {
            visibility: VisibilityController::new(&config),
            picker: FeaturePicker::new(&config),
            bounds_plan: BoundsFitter::plan(&config),
            config,
            engine,
            fetcher,
            images,
            ui,
            swap_plan,
        };

        let zoom = session.engine.borrow().zoom();
        let mut commands = session.visibility.initialize(zoom);
        if let InitialView::Bounds(envelope) = session.config.initial_view() {
            commands.extend(BoundsFitter::fit(envelope, session.fit_padding()));
        }
        session.execute(&commands)?;

        info!(
            "map session started: {} backgrounds, {} data layers, {} icons",
            session.config.backgrounds().len(),
            session.config.data_layers().len(),
            session.config.icons().len()
        );
        Ok(session)
    }
}

/// Controller state of one map instance
pub struct MapSession<E: RenderEngine + ?Sized, F: Fetcher + ?Sized + 'static> {
    config: ValidatedConfig,
    engine: Rc<RefCell<E>>,
    fetcher: Rc<F>,
    visibility: VisibilityController,
    picker: FeaturePicker,
    images: ImageProvisioner<E, F>,
    ui: UiState,
    swap_plan: IconSwapPlan,
    bounds_plan: Vec<GeometrySource>,
}

impl<E: RenderEngine + ?Sized, F: Fetcher + ?Sized + 'static> MapSession<E, F> {
    /// Runs the work that waits for the engine's style to load.
    ///
    /// Auto-fit (only when the configuration gives no explicit view) and
    /// the placeholder icon swap proceed concurrently; each applies its own
    /// commands as soon as it settles.
    pub async fn on_style_loaded(&self) -> Result<()> {
        let auto_fit = async {
            if self.config.initial_view() != InitialView::AutoFit {
                return Ok(());
            }
            let envelope = BoundsFitter::compute_envelope(
                &self.bounds_plan,
                self.engine.as_ref(),
                self.fetcher.as_ref(),
            )
            .await;
            match BoundsFitter::fit(envelope, self.fit_padding()) {
                Some(command) => self.execute(std::slice::from_ref(&command)),
                None => Ok(()),
            }
        };

        let icon_swap = async {
            if self.swap_plan.is_empty() {
                return Ok(());
            }
            let restores = self.images.complete_swap(&self.swap_plan).await;
            self.execute(&restores)
        };

        let (fit, swap) = join(auto_fit, icon_swap).await;
        fit.and(swap)
    }

    /// Handles the engine's missing-image notification
    pub async fn on_image_missing(&self, id: &str) -> Result<()> {
        self.images.on_image_missing(id).await
    }

    /// Routes pointer input. Returns the selected feature for clicks.
    pub fn handle_input(&mut self, event: InputEvent) -> Option<FeatureRecord> {
        match event {
            InputEvent::Click { position } => self.on_click(position),
            InputEvent::MouseMove { position } => {
                self.on_pointer_move(position);
                None
            }
            InputEvent::DragStart { .. } | InputEvent::DoubleClick { .. } => {
                self.ui.apply(UiCommand::CloseLayerChooser);
                None
            }
        }
    }

    /// Updates the pointer affordance; returns whether it is now on
    pub fn on_pointer_move(&mut self, point: ScreenPoint) -> bool {
        let hits = self.hit_test(point);
        self.ui.apply(self.picker.on_pointer_move(&hits));
        self.ui.pointer_cursor
    }

    pub fn on_click(&mut self, point: ScreenPoint) -> Option<FeatureRecord> {
        let hits = self.hit_test(point);
        let (record, commands) = self.picker.on_click(&hits);
        for command in commands {
            self.ui.apply(command);
        }
        record
    }

    pub fn toggle_layer_chooser(&mut self) {
        self.ui.layer_chooser.toggle();
    }

    pub fn set_active_background(&mut self, id: &str) -> Result<()> {
        let zoom = self.engine.borrow().zoom();
        self.transition(|visibility| visibility.set_active_background(id, zoom))
    }

    pub fn set_data_layer_visible(&mut self, id: &str, visible: bool) -> Result<()> {
        self.transition(|visibility| visibility.set_data_layer_visible(id, visible))
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn visibility_state(&self) -> &VisibilityState {
        self.visibility.state()
    }

    pub fn zoom_range(&self) -> EffectiveZoomRange {
        self.visibility.zoom_range()
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui
    }

    pub fn images(&self) -> &ImageProvisioner<E, F> {
        &self.images
    }

    fn hit_test(&self, point: ScreenPoint) -> Vec<RenderedFeature> {
        if !self.picker.has_interactive_layers() {
            return Vec::new();
        }
        self.engine
            .borrow()
            .query_rendered_features(point, self.picker.interactive_layers())
    }

    fn fit_padding(&self) -> f64 {
        let viewport = self.engine.borrow().viewport_size();
        BoundsFitter::padding(viewport, self.config.custom_ui().fit_padding)
    }

    /// Runs one visibility transition. If the engine rejects any of its
    /// commands, the previous state is restored on both sides.
    fn transition(
        &mut self,
        change: impl FnOnce(&mut VisibilityController) -> Result<Vec<EngineCommand>>,
    ) -> Result<()> {
        let previous = self.visibility.clone();
        let commands = change(&mut self.visibility)?;
        if let Err(e) = self.execute(&commands) {
            warn!("layer change failed, restoring previous layer state");
            self.visibility = previous;
            if let Err(resync) = self.execute(&self.visibility.sync_commands()) {
                warn!("engine still out of sync: {resync}");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Applies a command list back to back. Every command is attempted; the
    /// first engine error is returned.
    fn execute(&self, commands: &[EngineCommand]) -> Result<()> {
        let mut engine = self.engine.borrow_mut();
        let mut first_error = None;
        for command in commands {
            if let Err(e) = engine.apply(command) {
                warn!("engine rejected {command:?}: {e}");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
