//! Shared utility functions.

/// Title-case a group name or front matter key.
///
/// Capitalizes the first letter of each whitespace-separated word,
/// leaving the rest of the word untouched.
/// "posts" -> "Posts", "my key" -> "My Key"
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
