#![forbid(unsafe_code)]

/// Turn free-form text into a lowercase, hyphen-separated identifier.
///
/// Every run of characters outside `[a-z0-9]` (after lowercasing) becomes a
/// single `-`, and leading/trailing separators are dropped. Input made only
/// of punctuation yields an empty string.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    collapse_separators(out.trim_matches('-'))
}

/// Collapse any run of two or more `-` into one.
#[must_use]
pub fn collapse_separators(input: &str) -> String {
    let mut out = input.to_owned();
    while out.contains("--") {
        out = out.replace("--", "-");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugifies_titles() {
        assert_eq!(slugify("Build login form"), "build-login-form");
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  --hello--  "), "hello");
        assert_eq!(slugify("a   b---c"), "a-b-c");
        assert_eq!(slugify("Step 1: Do thing"), "step-1-do-thing");
        assert_eq!(slugify("my-task"), "my-task");
    }

    #[test]
    fn punctuation_only_is_empty() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn non_ascii_letters_become_separators() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("ÜBER/path\\thing"), "ber-path-thing");
    }

    #[test]
    fn slugify_is_idempotent_and_well_formed() {
        let inputs = [
            "Build login form",
            "--x--",
            "a__b..c",
            "Tab\tand\nnewline",
            "100% done?!",
            "UPPER lower 42",
            "---",
            "é-é-é",
        ];
        for input in inputs {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "not idempotent for {input:?}");
            assert!(!once.starts_with('-'), "leading separator for {input:?}");
            assert!(!once.ends_with('-'), "trailing separator for {input:?}");
            assert!(!once.contains("--"), "double separator for {input:?}");
        }
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(collapse_separators("a--b"), "a-b");
        assert_eq!(collapse_separators("a-----b--c"), "a-b-c");
        assert_eq!(collapse_separators("plain"), "plain");
        assert_eq!(collapse_separators("--"), "-");
    }
}
