/// Trim and collapse every run of whitespace (including newlines from markup) to one space
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Upper-case the first letter of each word, leaving the rest of the word as written.
/// Keeps mixed-case tokens such as "McAllister" or "NYC" intact.
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical project types the keyword table maps onto
const CANONICAL_TYPES: [&str; 8] = [
    "Web Development",
    "Mobile App",
    "Software Development",
    "Design",
    "Graphic Design",
    "UI/UX Design",
    "Automotive",
    "Portfolio",
];

/// Keyword table, checked in order against the words of the type
const TYPE_KEYWORDS: [(&str, &str); 16] = [
    ("web", "Web Development"),
    ("website", "Web Development"),
    ("app", "Mobile App"),
    ("application", "Software Development"),
    ("software", "Software Development"),
    ("mobile", "Mobile App"),
    ("android", "Mobile App"),
    ("ios", "Mobile App"),
    ("graphic", "Graphic Design"),
    ("ui", "UI/UX Design"),
    ("ux", "UI/UX Design"),
    ("design", "Design"),
    ("car", "Automotive"),
    ("auto", "Automotive"),
    ("vehicle", "Automotive"),
    ("portfolio", "Portfolio"),
];

/// Map free-form project types onto a small canonical vocabulary.
/// Unrecognised types are title-cased; canonical values map to themselves.
pub fn standardize_project_type(input: &str) -> String {
    let collapsed = collapse_whitespace(input);
    if let Some(canonical) = CANONICAL_TYPES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(&collapsed))
    {
        return canonical.to_string();
    }

    let lowered = collapsed.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    for (keyword, canonical) in TYPE_KEYWORDS {
        let hit = words.iter().any(|w| {
            *w == keyword || w.strip_suffix('s').is_some_and(|stem| stem == keyword)
        });
        if hit {
            return canonical.to_string();
        }
    }

    title_case(&lowered)
}
