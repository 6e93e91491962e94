//! Display-name derivation

/// Split a camel-case or snake-case identifier into words
///
/// `CustomerOrder` becomes `Customer Order`, `HTTPServer` becomes
/// `HTTP Server`, `order_line` becomes `Order line`.
pub(crate) fn humanize(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            continue;
        }

        if i > 0 && c.is_uppercase() && !out.is_empty() && !out.ends_with(' ') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push(' ');
            }
        }

        if out.is_empty() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// English plural of a singular noun
pub(crate) fn pluralize(singular: &str) -> String {
    if singular.is_empty() {
        return String::new();
    }
    let lower = singular.to_lowercase();

    if let Some(stem) = lower.strip_suffix('y') {
        let vowel_before = stem.ends_with(['a', 'e', 'i', 'o', 'u']);
        if !vowel_before {
            return format!("{}ies", &singular[..singular.len() - 1]);
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{singular}es");
    }
    format!("{singular}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("Customer"), "Customer");
        assert_eq!(humanize("CustomerOrder"), "Customer Order");
        assert_eq!(humanize("HTTPServer"), "HTTP Server");
        assert_eq!(humanize("order_line"), "Order line");
        assert_eq!(humanize("Address2Line"), "Address2 Line");
        assert_eq!(humanize("string"), "String");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("Dog"), "Dogs");
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("Address"), "Addresses");
        assert_eq!(pluralize("Batch"), "Batches");
        assert_eq!(pluralize("Customer Order"), "Customer Orders");
        assert_eq!(pluralize(""), "");
    }
}
