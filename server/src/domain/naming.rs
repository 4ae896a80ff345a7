//! Resource naming helpers: English pluralisation and JSON key casing.
//!
//! Resource type names are derived from Rust type names (`Post` becomes
//! `posts`) and relationship cardinality is inferred from the plurality of
//! the relation name.

/// Irregular singular and plural pairs, compared case-insensitively.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("mouse", "mice"),
    ("tooth", "teeth"),
    ("foot", "feet"),
];

/// Words whose plural equals their singular.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "metadata",
];

/// Return the plural form of `word`.
///
/// Words already in plural form come back unchanged, which is what
/// [`is_plural`] relies on.
///
/// # Examples
/// ```
/// use jsonapi_server::domain::naming::pluralize;
///
/// assert_eq!(pluralize("Post"), "Posts");
/// assert_eq!(pluralize("category"), "categories");
/// assert_eq!(pluralize("comments"), "comments");
/// ```
#[must_use]
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();
    let last_word = lower.rsplit(['-', '_']).next().unwrap_or(&lower);
    if UNCOUNTABLE.contains(&last_word) {
        return word.to_owned();
    }
    for (singular, plural) in IRREGULAR {
        if lower.ends_with(plural) {
            return word.to_owned();
        }
        if let Some(stem) = strip_suffix_ignore_case(word, singular) {
            return format!("{stem}{}", match_case(word, singular, plural));
        }
    }
    if ["x", "ch", "ss", "sh", "zz"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{word}es");
    }
    if lower.ends_with('s') {
        return word.to_owned();
    }
    if let Some(stem) = lower.strip_suffix('y') {
        let before = stem.chars().last();
        let vowel = before.is_some_and(|c| "aeiou".contains(c));
        let qu = stem.ends_with("qu");
        if !vowel || qu {
            let keep = word.len().saturating_sub(1);
            return format!("{}ies", word.get(..keep).unwrap_or(word));
        }
    }
    format!("{word}s")
}

/// Report whether a relation name denotes a to-many relationship.
#[must_use]
pub fn is_plural(name: &str) -> bool {
    pluralize(name) == name
}

/// Lower-case the leading segment of a Rust identifier for use as a JSON key.
///
/// A name written entirely in capitals is an initialism and is lower-cased
/// whole; otherwise only the first character changes.
///
/// # Examples
/// ```
/// use jsonapi_server::domain::naming::jsonify;
///
/// assert_eq!(jsonify("BlogPosts"), "blogPosts");
/// assert_eq!(jsonify("ID"), "id");
/// ```
#[must_use]
pub fn jsonify(name: &str) -> String {
    if name.chars().all(|c| !c.is_lowercase()) {
        return name.to_lowercase();
    }
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

/// Derive the default resource name for a Rust type name.
///
/// Module paths and generic arguments are discarded before pluralising.
#[must_use]
pub fn resource_name_for(type_name: &str) -> String {
    jsonify(&pluralize(short_type_name(type_name)))
}

/// Strip module path and generic arguments from a type name.
#[must_use]
pub fn short_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

fn strip_suffix_ignore_case<'a>(word: &'a str, suffix: &str) -> Option<&'a str> {
    let split = word.len().checked_sub(suffix.len())?;
    let (stem, tail) = (word.get(..split)?, word.get(split..)?);
    tail.eq_ignore_ascii_case(suffix).then_some(stem)
}

fn match_case(word: &str, singular: &str, plural: &str) -> String {
    let tail_start = word.len().saturating_sub(singular.len());
    let starts_upper = word
        .get(tail_start..)
        .and_then(|tail| tail.chars().next())
        .is_some_and(char::is_uppercase);
    if !starts_upper {
        return plural.to_owned();
    }
    let mut chars = plural.chars();
    chars
        .next()
        .map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}
