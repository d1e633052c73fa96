//! Case conversion for model names derived from file names.

/// Convert a kebab-case or snake_case identifier to PascalCase.
/// e.g. "no-entity" -> "NoEntity", "order_item" -> "OrderItem", "product" -> "Product"
pub fn to_pascal_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '-' || c == '_' || c == '.' || c == ' ' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
