//! English singularization for XML element names.
//!
//! Only what element naming needs: a handful of irregular plurals, the
//! common uncountable nouns and the regular suffix rules. Case of the input is
//! preserved where the stem is kept.

const UNCOUNTABLE: &[&str] = &[
    "access",
    "advice",
    "baggage",
    "data",
    "equipment",
    "feedback",
    "fish",
    "furniture",
    "information",
    "knowledge",
    "luggage",
    "metadata",
    "money",
    "music",
    "news",
    "progress",
    "research",
    "rice",
    "series",
    "sheep",
    "species",
    "staff",
    "status",
    "traffic",
    "weather",
    "work",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("men", "man"),
    ("mice", "mouse"),
    ("oxen", "ox"),
    ("people", "person"),
    ("teeth", "tooth"),
    ("women", "woman"),
    ("criteria", "criterion"),
];

/// Singular form of `word`. Words that already look singular are returned unchanged.
#[must_use]
pub fn singular(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, single)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return (*single).to_string();
    }

    let stem = |n: usize| word[..word.len() - n].to_string();

    if lower.ends_with("ies") && lower.len() > 4 {
        return stem(3) + "y";
    }
    if lower.ends_with("lves") || lower.ends_with("rves") {
        return stem(3) + "f";
    }
    if (lower.ends_with("uses") && !lower.ends_with("ouses")) || lower.ends_with("sses") {
        return stem(2);
    }
    for suffix in ["xes", "zes", "ches", "shes"] {
        if lower.ends_with(suffix) {
            return stem(2);
        }
    }
    if lower.ends_with('s')
        && !lower.ends_with("ss")
        && !lower.ends_with("us")
        && !lower.ends_with("is")
        && lower.len() > 1
    {
        return stem(1);
    }
    word.to_string()
}
