//! Core constants shared by the controller, mostly web-map style conventions.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Layout property controlling layer visibility.
pub const VISIBILITY_PROPERTY: &str = "visibility";

/// Layout value for a hidden layer.
pub const HIDDEN: &str = "none";

/// Layout property holding a symbol layer's icon id.
pub const ICON_IMAGE_PROPERTY: &str = "icon-image";

/// Id under which the transparent placeholder icon is registered.
pub const PLACEHOLDER_ICON_ID: &str = "mapframe-placeholder";

/// Auto-fit padding as a fraction of the viewport's shorter side.
pub const FIT_PADDING_FRACTION: f64 = 0.1;

/// Fixed auto-fit padding used when the viewport size is unknown.
pub const DEFAULT_FIT_PADDING_PX: f64 = 40.0;

/// Query parameter of the embed page that names the configuration document.
pub const CONFIG_QUERY_PARAM: &str = "config";

/// Feature attribute carrying the `"W,H"` image size.
pub const IMAGE_SIZE_ATTRIBUTE: &str = "imageSize";
