//! Prelude module for common mapframe types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapframe::prelude::*;`

pub use crate::core::{
    config::{
        BackgroundEntry, ConfigModel, CustomUi, DataLayerEntry, IconStrategy, InitialView,
        InteractiveRule, ValidatedConfig, ValidationReport,
    },
    geo::{GeometryEnvelope, LngLat, ScreenPoint},
    session::{MapSession, PreparedMap},
};

pub use crate::layers::{
    manager::{VisibilityController, VisibilityState},
    zoom::{EffectiveZoomRange, GlobalZoomClamp, LayerZoomBounds, ZoomConstraintResolver},
};

pub use crate::data::{
    bounds::{BoundsFitter, GeometryData, GeometrySource},
    geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry},
};

pub use crate::input::{
    events::{EngineCommand, InputEvent, RenderedFeature, UiCommand},
    picker::{FeaturePicker, FeatureRecord},
};

pub use crate::images::{
    icon::{IconImage, IconResource},
    provisioner::{IconSwap, IconSwapPlan, ImageProvisioner},
};

pub use crate::ui::{
    controls::{ControlSet, LayerChooser},
    panel::{InfoPanel, PanelStyle},
    UiState,
};

pub use crate::fetch::{load_config, ConfigReference, HttpFetcher};

pub use crate::traits::{Fetcher, IconRegistry, RenderEngine};

pub use crate::{Error as MapError, Result};

pub use std::{cell::RefCell, rc::Rc};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
