use heck::ToKebabCase;

/// Canonical lookup name of a component type.
///
/// Metadata is addressed by kebab case, so `ImageKeyboardResponse`,
/// `image_keyboard_response` and `image-keyboard-response` are the same type.
pub fn kebab_name(component_type: &str) -> String {
    component_type.trim().to_kebab_case()
}
