//! Immutable key binding values.

use std::fmt;

use super::types::TriggerSequence;
use crate::error::{BindingError, Result};

/// Binding declared by the application or a plug-in.
pub const SYSTEM: i32 = 0;
/// Binding customized by the user; outranks [`SYSTEM`].
pub const USER: i32 = 1;

/// Association of one trigger, in one scheme and context, to one command.
///
/// A binding without a command is a deletion marker: it retracts the binding
/// with the same trigger, scheme, context, locale and platform.
///
/// Equality, hashing and ordering use every attribute, so a set of bindings
/// never holds two identical declarations.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Binding {
    trigger: TriggerSequence,
    command_id: Option<String>,
    context_id: String,
    scheme_id: String,
    locale: Option<String>,
    platform: Option<String>,
    binding_type: i32,
}

impl Binding {
    pub fn new(
        trigger: impl Into<TriggerSequence>,
        command_id: impl Into<String>,
        context_id: impl Into<String>,
        scheme_id: impl Into<String>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            command_id: Some(command_id.into()),
            context_id: context_id.into(),
            scheme_id: scheme_id.into(),
            locale: None,
            platform: None,
            binding_type: SYSTEM,
        }
    }

    /// A deletion marker for the binding with the same coordinates.
    pub fn deletion(
        trigger: impl Into<TriggerSequence>,
        context_id: impl Into<String>,
        scheme_id: impl Into<String>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            command_id: None,
            context_id: context_id.into(),
            scheme_id: scheme_id.into(),
            locale: None,
            platform: None,
            binding_type: USER,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_type(mut self, binding_type: i32) -> Self {
        self.binding_type = binding_type;
        self
    }

    pub fn trigger(&self) -> &TriggerSequence {
        &self.trigger
    }

    pub fn command_id(&self) -> Option<&str> {
        self.command_id.as_deref()
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn scheme_id(&self) -> &str {
        &self.scheme_id
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    pub fn binding_type(&self) -> i32 {
        self.binding_type
    }

    pub fn is_deletion(&self) -> bool {
        self.command_id.is_none()
    }

    /// Whether this deletion marker retracts `other`.
    pub fn deletes(&self, other: &Binding) -> bool {
        self.is_deletion()
            && !other.is_deletion()
            && self.trigger == other.trigger
            && self.scheme_id == other.scheme_id
            && self.context_id == other.context_id
            && self.locale == other.locale
            && self.platform == other.platform
    }

    /// Reject bindings missing a required coordinate.
    pub fn validate(&self) -> Result<()> {
        if self.context_id.trim().is_empty() {
            return Err(BindingError::invalid_argument(format!(
                "binding for '{}' has an empty context id",
                self.trigger
            )));
        }
        if self.scheme_id.trim().is_empty() {
            return Err(BindingError::invalid_argument(format!(
                "binding for '{}' has an empty scheme id",
                self.trigger
            )));
        }
        if matches!(self.command_id.as_deref(), Some(cmd) if cmd.trim().is_empty()) {
            return Err(BindingError::invalid_argument(format!(
                "binding for '{}' has an empty command id",
                self.trigger
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Binding({} -> {}, context={}, scheme={}, locale={}, platform={}, type={})",
            self.trigger,
            self.command_id.as_deref().unwrap_or("<deleted>"),
            self.context_id,
            self.scheme_id,
            self.locale.as_deref().unwrap_or("*"),
            self.platform.as_deref().unwrap_or("*"),
            self.binding_type
        )
    }
}

/// Selects bindings by attribute. Unset fields match anything.
#[derive(Clone, Debug, Default)]
pub struct BindingFilter {
    pub trigger: Option<TriggerSequence>,
    pub command_id: Option<Option<String>>,
    pub context_id: Option<String>,
    pub scheme_id: Option<String>,
    pub locale: Option<Option<String>>,
    pub platform: Option<Option<String>>,
    pub binding_type: Option<i32>,
}

impl BindingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(mut self, trigger: impl Into<TriggerSequence>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    pub fn command(mut self, command_id: impl Into<String>) -> Self {
        self.command_id = Some(Some(command_id.into()));
        self
    }

    pub fn deletions(mut self) -> Self {
        self.command_id = Some(None);
        self
    }

    pub fn context(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    pub fn scheme(mut self, scheme_id: impl Into<String>) -> Self {
        self.scheme_id = Some(scheme_id.into());
        self
    }

    pub fn locale(mut self, locale: Option<&str>) -> Self {
        self.locale = Some(locale.map(str::to_string));
        self
    }

    pub fn platform(mut self, platform: Option<&str>) -> Self {
        self.platform = Some(platform.map(str::to_string));
        self
    }

    pub fn binding_type(mut self, binding_type: i32) -> Self {
        self.binding_type = Some(binding_type);
        self
    }

    pub fn matches(&self, binding: &Binding) -> bool {
        self.trigger.as_ref().map_or(true, |t| *t == binding.trigger)
            && self
                .command_id
                .as_ref()
                .map_or(true, |c| *c == binding.command_id)
            && self
                .context_id
                .as_ref()
                .map_or(true, |c| *c == binding.context_id)
            && self
                .scheme_id
                .as_ref()
                .map_or(true, |s| *s == binding.scheme_id)
            && self.locale.as_ref().map_or(true, |l| *l == binding.locale)
            && self
                .platform
                .as_ref()
                .map_or(true, |p| *p == binding.platform)
            && self
                .binding_type
                .map_or(true, |t| t == binding.binding_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::types::{KeyStroke, Modifiers};

    fn trigger(key: &str) -> TriggerSequence {
        KeyStroke::new(key, Modifiers::ctrl()).into()
    }

    #[test]
    fn deletion_marker_deletes_matching_binding() {
        let binding = Binding::new(trigger("s"), "save", "editor", "default");
        let marker = Binding::deletion(trigger("s"), "editor", "default");
        assert!(marker.is_deletion());
        assert!(marker.deletes(&binding));
        assert!(!binding.deletes(&marker));
    }

    #[test]
    fn deletion_requires_identical_coordinates() {
        let binding = Binding::new(trigger("s"), "save", "editor", "default").with_locale("en");
        let marker = Binding::deletion(trigger("s"), "editor", "default");
        assert!(!marker.deletes(&binding));

        let other_context = Binding::new(trigger("s"), "save", "window", "default");
        assert!(!marker.deletes(&other_context));

        let other_scheme = Binding::new(trigger("s"), "save", "editor", "emacs");
        assert!(!marker.deletes(&other_scheme));
    }

    #[test]
    fn deletion_marker_does_not_delete_another_marker() {
        let a = Binding::deletion(trigger("s"), "editor", "default");
        let b = Binding::deletion(trigger("s"), "editor", "default").with_type(SYSTEM);
        assert!(!a.deletes(&b));
    }

    #[test]
    fn equality_uses_every_attribute() {
        let a = Binding::new(trigger("s"), "save", "editor", "default");
        assert_eq!(a, a.clone());
        assert_ne!(a, a.clone().with_type(USER));
        assert_ne!(a, a.clone().with_platform("gtk"));
    }

    #[test]
    fn validate_rejects_empty_ids() {
        assert!(Binding::new(trigger("s"), "save", "", "default")
            .validate()
            .is_err());
        assert!(Binding::new(trigger("s"), "save", "editor", " ")
            .validate()
            .is_err());
        assert!(Binding::new(trigger("s"), "", "editor", "default")
            .validate()
            .is_err());
        assert!(Binding::deletion(trigger("s"), "editor", "default")
            .validate()
            .is_ok());
    }

    #[test]
    fn filter_matches_selected_attributes() {
        let binding = Binding::new(trigger("s"), "save", "editor", "default").with_platform("gtk");

        assert!(BindingFilter::new().matches(&binding));
        assert!(BindingFilter::new().command("save").matches(&binding));
        assert!(!BindingFilter::new().deletions().matches(&binding));
        assert!(BindingFilter::new()
            .platform(Some("gtk"))
            .locale(None)
            .matches(&binding));
        assert!(!BindingFilter::new().platform(None).matches(&binding));
        assert!(!BindingFilter::new()
            .scheme("emacs")
            .trigger(trigger("s"))
            .matches(&binding));
    }
}
