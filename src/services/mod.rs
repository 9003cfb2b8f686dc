//! Typed access to the ZPA management collections, one service per entity.

pub mod inspection_custom_controls;
pub mod inspection_profile;
pub mod microtenants;
pub mod policy_set_controller;

pub use inspection_custom_controls::{
    ControlRule, InspectionCustomControl, InspectionCustomControlService,
    RuleCondition,
};
pub use inspection_profile::{
    ControlInfoResource, InspectionProfile, InspectionProfileService, PredefinedControl,
    ProfileCustomControl,
};
pub use microtenants::{MicroTenant, MicroTenantService, UserResource};
pub use policy_set_controller::{
    Condition, Operand, PolicyRule, PolicySetControllerService,
};

/// `omitempty` for booleans
pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}
