//! Annotation keys and defaults shared by extraction and rendering.

/// Per-resource wait timeout, in seconds.
pub const TIMEOUT_ANNOTATION: &str = "uptest.upbound.io/timeout";
/// Comma-separated list of conditions to wait for.
pub const CONDITIONS_ANNOTATION: &str = "uptest.upbound.io/conditions";
/// Script run before a resource's conditions are awaited.
pub const PRE_ASSERT_HOOK_ANNOTATION: &str = "uptest.upbound.io/pre-assert-hook";
/// Script run after a resource's conditions are awaited.
pub const POST_ASSERT_HOOK_ANNOTATION: &str = "uptest.upbound.io/post-assert-hook";
/// Script run before a resource is deleted.
pub const PRE_DELETE_HOOK_ANNOTATION: &str = "uptest.upbound.io/pre-delete-hook";
/// Script run after a resource is deleted.
pub const POST_DELETE_HOOK_ANNOTATION: &str = "uptest.upbound.io/post-delete-hook";
/// JSON object merged into the resource during the update phase.
pub const UPDATE_PARAMETER_ANNOTATION: &str = "uptest.upbound.io/update-parameter";
/// `true` excludes the resource from the import phase.
pub const DISABLE_IMPORT_ANNOTATION: &str = "uptest.upbound.io/disable-import";
/// Resources needing a human in the loop are not tested.
pub const MANUAL_INTERVENTION_ANNOTATION: &str = "upjet.upbound.io/manual-intervention";
/// Example identifier, used to recognise the root of a composite example.
pub const EXAMPLE_ID_ANNOTATION: &str = "meta.upbound.io/example-id";

/// Marker set on every managed resource during the apply assertion.
pub const TEST_MARKER_ANNOTATION: &str = "upjet.upbound.io/test";
/// Annotation holding the external identifier observed before import.
pub const OLD_ID_ANNOTATION: &str = "uptest-old-id";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 1200;
pub const DEFAULT_CONDITION: &str = "Ready";

/// The annotation keys consulted while extracting resource metadata.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AnnotationKeys {
    pub timeout: String,
    pub conditions: String,
    pub pre_assert_hook: String,
    pub post_assert_hook: String,
    pub pre_delete_hook: String,
    pub post_delete_hook: String,
    pub update_parameter: String,
    pub disable_import: String,
    pub manual_intervention: String,
    pub example_id: String,
}

impl Default for AnnotationKeys {
    fn default() -> Self {
        Self {
            timeout: TIMEOUT_ANNOTATION.to_owned(),
            conditions: CONDITIONS_ANNOTATION.to_owned(),
            pre_assert_hook: PRE_ASSERT_HOOK_ANNOTATION.to_owned(),
            post_assert_hook: POST_ASSERT_HOOK_ANNOTATION.to_owned(),
            pre_delete_hook: PRE_DELETE_HOOK_ANNOTATION.to_owned(),
            post_delete_hook: POST_DELETE_HOOK_ANNOTATION.to_owned(),
            update_parameter: UPDATE_PARAMETER_ANNOTATION.to_owned(),
            disable_import: DISABLE_IMPORT_ANNOTATION.to_owned(),
            manual_intervention: MANUAL_INTERVENTION_ANNOTATION.to_owned(),
            example_id: EXAMPLE_ID_ANNOTATION.to_owned(),
        }
    }
}
