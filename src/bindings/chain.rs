//! Locale and platform specificity chains.

/// Most-specific-first expansion of a locale or platform string.
///
/// `"en_GB_POSIX"` split on `_` becomes
/// `["en_GB_POSIX", "en_GB", "en", "", <wildcard>]`, where the wildcard is
/// `None`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpecificityChain {
    entries: Vec<Option<String>>,
}

impl SpecificityChain {
    pub fn expand(value: Option<&str>, separator: Option<&str>) -> Self {
        let mut entries: Vec<Option<String>> = Vec::new();
        let value = value.map(str::trim).unwrap_or_default();

        if !value.is_empty() {
            let segments: Vec<&str> = match separator {
                Some(sep) if !sep.is_empty() => value
                    .split(sep)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect(),
                _ => vec![value],
            };
            let sep = separator.unwrap_or_default();
            for end in (1..=segments.len()).rev() {
                entries.push(Some(segments[..end].join(sep)));
            }
        }

        entries.push(Some(String::new()));
        entries.push(None);
        Self { entries }
    }

    /// Whether a binding restricted to `value` applies. `None` always applies.
    pub fn matches(&self, value: Option<&str>) -> bool {
        match value {
            None => true,
            Some(value) => self.entries.iter().any(|e| e.as_deref() == Some(value)),
        }
    }

    pub fn entries(&self) -> &[Option<String>] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(chain: &SpecificityChain) -> Vec<Option<&str>> {
        chain.entries().iter().map(|e| e.as_deref()).collect()
    }

    #[test]
    fn expands_most_specific_first() {
        let chain = SpecificityChain::expand(Some("en_GB_POSIX"), Some("_"));
        assert_eq!(
            strings(&chain),
            vec![
                Some("en_GB_POSIX"),
                Some("en_GB"),
                Some("en"),
                Some(""),
                None
            ]
        );
    }

    #[test]
    fn empty_or_missing_value_keeps_only_terminators() {
        for value in [None, Some(""), Some("   ")] {
            let chain = SpecificityChain::expand(value, Some("_"));
            assert_eq!(strings(&chain), vec![Some(""), None]);
        }
    }

    #[test]
    fn no_separator_keeps_the_whole_value() {
        let chain = SpecificityChain::expand(Some(" linux_gtk "), None);
        assert_eq!(strings(&chain), vec![Some("linux_gtk"), Some(""), None]);
    }

    #[test]
    fn segments_are_trimmed() {
        let chain = SpecificityChain::expand(Some("en _ US"), Some("_"));
        assert_eq!(strings(&chain), vec![Some("en_US"), Some("en"), Some(""), None]);
    }

    #[test]
    fn locale_matching() {
        let en_us = SpecificityChain::expand(Some("en_US"), Some("_"));
        assert!(en_us.matches(Some("en")));
        assert!(en_us.matches(Some("en_US")));
        assert!(en_us.matches(Some("")));
        assert!(en_us.matches(None));
        assert!(!en_us.matches(Some("en_GB")));

        let fr = SpecificityChain::expand(Some("fr"), Some("_"));
        assert!(!fr.matches(Some("en")));
    }
}
