//! Naming helpers shared by normalization and emission.

/// Split a name into words.
///
/// Boundaries are any non-alphanumeric character, a lower-to-upper case
/// change (`fooBar`), the end of an acronym (`HTTPServer` -> `HTTP`,
/// `Server`) and letter/digit changes (`file2name` -> `file`, `2`, `name`).
pub fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            flush(&mut current, &mut words);
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_alphabetic() && c.is_numeric())
                || (prev.is_numeric() && c.is_alphabetic())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.is_some_and(char::is_lowercase));
            if boundary {
                flush(&mut current, &mut words);
            }
        }
        current.push(c);
    }
    flush(&mut current, &mut words);
    words
}

fn flush(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Convert a string to camelCase.
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    for (i, word) in split_words(s).iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            result.push_str(&lower);
        } else {
            result.push_str(&capitalize_first(&lower));
        }
    }
    result
}

/// Convert a string to PascalCase (method identifiers).
pub fn to_pascal_case(s: &str) -> String {
    capitalize_first(&to_camel_case(s))
}

/// Convert a string to snake_case (field identifiers).
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Check whether a name is a valid proto identifier.
pub fn is_proto_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip the common leading indentation of a text block and drop leading
/// and trailing blank lines.
pub fn dedent(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(start), Some(end)) = (start, end) else {
        return Vec::new();
    };
    let body = &lines[start..=end];

    let indent = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    body.iter()
        .map(|&l| {
            if l.trim().is_empty() {
                ""
            } else {
                l.get(indent..).unwrap_or_else(|| l.trim_start())
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("list_files"), ["list", "files"]);
        assert_eq!(split_words("listFiles"), ["list", "Files"]);
        assert_eq!(split_words("HTTPServer"), ["HTTP", "Server"]);
        assert_eq!(split_words("file2name"), ["file", "2", "name"]);
        assert_eq!(split_words("--foo  bar--"), ["foo", "bar"]);
        assert!(split_words("__").is_empty());
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("foo"), "Foo");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("a"), "A");
        assert_eq!(capitalize_first("file_info"), "File_info");
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("list_files"), "ListFiles");
        assert_eq!(to_pascal_case("list-files"), "ListFiles");
        assert_eq!(to_pascal_case("listFiles"), "ListFiles");
        assert_eq!(to_pascal_case("LIST_FILES"), "ListFiles");
        assert_eq!(to_pascal_case("get HTTPStatus"), "GetHttpStatus");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("fooBar"), "foo_bar");
        assert_eq!(to_snake_case("FooBar"), "foo_bar");
        assert_eq!(to_snake_case("foo"), "foo");
        assert_eq!(to_snake_case("itemId"), "item_id");
        assert_eq!(to_snake_case("item-id"), "item_id");
        assert_eq!(to_snake_case("Config"), "config");
    }

    #[test]
    fn test_is_proto_identifier() {
        assert!(is_proto_identifier("ListFiles"));
        assert!(is_proto_identifier("file_2"));
        assert!(!is_proto_identifier(""));
        assert!(!is_proto_identifier("2_fa"));
        assert!(!is_proto_identifier("_hidden"));
        assert!(!is_proto_identifier("my service"));
    }

    #[test]
    fn test_dedent() {
        let text = "\n    string name = 1;\n      int64 size = 2;\n\n    bool dir = 3;\n  \n";
        assert_eq!(
            dedent(text),
            ["string name = 1;", "  int64 size = 2;", "", "bool dir = 3;"]
        );
        assert!(dedent("  \n ").is_empty());
    }
}
