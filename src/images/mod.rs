pub mod icon;
pub mod provisioner;

pub use icon::{IconImage, IconResource};
pub use provisioner::{IconSwap, IconSwapPlan, ImageProvisioner};
