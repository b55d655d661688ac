//! Rewrite rules used by the [`Canonicalizer`](crate::Canonicalizer).
//!
//! The two encoders are allowed to differ in known, harmless ways. Each
//! difference is captured as data here so a test harness can extend or
//! narrow it without touching the algorithm:
//!
//! - [`RemovalRule`]: member groups only one encoding emits
//! - member aliases: two names for the same property
//! - [`ValueWrapper`]: runtime wrappers around a textual payload
//! - qualifying types: setter/trigger objects whose `Property` value may be
//!   written as `Owner.Name` by one side and `Name` by the other
//! - color and point members: only their values go through color or point
//!   normalization, so a `Text` of `Red` stays text
//!
//! ```rust
//! use node_stream_diff::{CanonicalRules, RemovalRule, Source};
//!
//! let rules = CanonicalRules::default()
//!     .with_removal(RemovalRule::new("x:Key").for_source(Source::Binary))
//!     .with_alias("Caption", "Title");
//!
//! assert_eq!(rules.canonical_member("xml:lang"), "Language");
//! assert_eq!(rules.canonical_member("Caption"), "Title");
//! assert_eq!(rules.canonical_member("Width"), "Width");
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which encoder produced a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Markup,
    Binary,
}

impl Source {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Source::Markup => "markup",
            Source::Binary => "binary",
        }
    }
}

/// Drops every group opened by a member row whose token is `member`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovalRule {
    /// Member token as written, e.g. `xml:base`.
    pub member: String,
    /// Restricts the rule to one source; `None` applies to both.
    pub source: Option<Source>,
}

impl RemovalRule {
    pub fn new(member: impl Into<String>) -> Self {
        RemovalRule {
            member: member.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn for_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn applies_to(&self, source: Source) -> bool {
        self.source.map_or(true, |s| s == source)
    }
}

/// A wrapper the binary form puts around a plain textual payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueWrapper {
    pub prefix: String,
    pub suffix: String,
}

impl ValueWrapper {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        ValueWrapper {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Returns the trimmed payload when `value` carries this wrapper. Nested
    /// wrappers are peeled by [`CanonicalRules::unwrap_value`].
    #[must_use]
    pub fn unwrap<'a>(&self, value: &'a str) -> Option<&'a str> {
        let inner = value.strip_prefix(self.prefix.as_str())?;
        let inner = inner.strip_suffix(self.suffix.as_str())?;
        let inner = inner.trim();
        (!inner.is_empty()).then_some(inner)
    }
}

#[derive(Clone, Debug)]
pub struct CanonicalRules {
    pub removals: Vec<RemovalRule>,
    /// Alias token -> canonical token.
    pub aliases: IndexMap<String, String>,
    pub wrappers: Vec<ValueWrapper>,
    /// Local type names of setter- and trigger-like objects.
    pub qualifying_types: Vec<String>,
    /// Members of qualifying types whose value names another member.
    pub qualified_members: Vec<String>,
    /// Member local names whose values are colors.
    pub color_members: Vec<String>,
    /// Member local names whose values are point lists.
    pub point_members: Vec<String>,
    pub normalize_booleans: bool,
    pub normalize_colors: bool,
    pub normalize_points: bool,
}

impl Default for CanonicalRules {
    fn default() -> Self {
        let aliases = [
            ("xml:lang", "Language"),
            ("x:Lang", "Language"),
            ("TemplateReference", "Template"),
            ("ResourceKey", "x:Key"),
        ]
        .into_iter()
        .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
        .collect();

        let wrappers = vec![
            ValueWrapper::new("{x:Type ", "}"),
            ValueWrapper::new("RuntimeType:", ""),
            ValueWrapper::new("DependencyProperty:", ""),
            ValueWrapper::new("PointCollection:", ""),
        ];

        CanonicalRules {
            removals: vec![RemovalRule::new("xml:base")],
            aliases,
            wrappers,
            qualifying_types: ["Setter", "Trigger", "DataTrigger", "EventSetter", "Condition"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            qualified_members: vec!["Property".to_string()],
            color_members: [
                "Color",
                "Background",
                "Foreground",
                "Fill",
                "Stroke",
                "BorderBrush",
                "OpacityMask",
                "CaretBrush",
                "SelectionBrush",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            point_members: [
                "Points",
                "Point",
                "Point1",
                "Point2",
                "Point3",
                "StartPoint",
                "EndPoint",
                "Center",
                "Origin",
                "RenderTransformOrigin",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            normalize_booleans: true,
            normalize_colors: true,
            normalize_points: true,
        }
    }
}

impl CanonicalRules {
    /// Rules that rewrite nothing; only reordering remains.
    #[must_use]
    pub fn none() -> Self {
        CanonicalRules {
            removals: Vec::new(),
            aliases: IndexMap::new(),
            wrappers: Vec::new(),
            qualifying_types: Vec::new(),
            qualified_members: Vec::new(),
            color_members: Vec::new(),
            point_members: Vec::new(),
            normalize_booleans: false,
            normalize_colors: false,
            normalize_points: false,
        }
    }

    #[must_use]
    pub fn with_removal(mut self, rule: RemovalRule) -> Self {
        self.removals.push(rule);
        self
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), canonical.into());
        self
    }

    #[must_use]
    pub fn with_wrapper(mut self, wrapper: ValueWrapper) -> Self {
        self.wrappers.push(wrapper);
        self
    }

    #[must_use]
    pub fn with_qualifying_type(mut self, name: impl Into<String>) -> Self {
        self.qualifying_types.push(name.into());
        self
    }

    #[must_use]
    pub fn with_color_member(mut self, name: impl Into<String>) -> Self {
        self.color_members.push(name.into());
        self
    }

    #[must_use]
    pub fn with_point_member(mut self, name: impl Into<String>) -> Self {
        self.point_members.push(name.into());
        self
    }

    /// Canonical spelling of a member token.
    #[must_use]
    pub fn canonical_member<'a>(&'a self, token: &'a str) -> &'a str {
        self.aliases.get(token).map_or(token, String::as_str)
    }

    /// Whether a member group with this token is dropped from `source`.
    #[must_use]
    pub fn removes(&self, token: &str, source: Source) -> bool {
        self.removals
            .iter()
            .any(|rule| rule.member == token && rule.applies_to(source))
    }

    #[must_use]
    pub fn is_qualifying_type(&self, local_name: &str) -> bool {
        self.qualifying_types.iter().any(|t| t == local_name)
    }

    #[must_use]
    pub fn is_qualified_member(&self, local_name: &str) -> bool {
        self.qualified_members.iter().any(|m| m == local_name)
    }

    /// Whether values of the member named `name` are colors. An attachable
    /// `Owner.Name` is matched on `Name`.
    #[must_use]
    pub fn is_color_member(&self, name: &str) -> bool {
        let local = member_local_name(name);
        self.color_members.iter().any(|m| m == local)
    }

    /// Whether values of the member named `name` are point lists.
    #[must_use]
    pub fn is_point_member(&self, name: &str) -> bool {
        let local = member_local_name(name);
        self.point_members.iter().any(|m| m == local)
    }

    /// Peels wrappers off `value` until none matches.
    #[must_use]
    pub fn unwrap_value<'a>(&self, value: &'a str) -> &'a str {
        let mut value = value;
        while let Some(inner) = self.wrappers.iter().find_map(|w| w.unwrap(value)) {
            if inner == value {
                break;
            }
            value = inner;
        }
        value
    }
}

fn member_local_name(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, local)| local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrappers() {
        let rules = CanonicalRules::default();
        let unwrapped: Vec<_> = ["{x:Type Button}", "DependencyProperty:Width", "plain"]
            .iter()
            .map(|v| rules.wrappers.iter().find_map(|w| w.unwrap(v)))
            .collect();
        assert_eq!(unwrapped, vec![Some("Button"), Some("Width"), None]);
    }

    #[test]
    fn test_nested_wrappers() {
        let rules = CanonicalRules::default();
        assert_eq!(rules.unwrap_value("RuntimeType:DependencyProperty:Width"), "Width");
        assert_eq!(rules.unwrap_value("{x:Type RuntimeType:Button}"), "Button");
        assert_eq!(rules.unwrap_value("Width"), "Width");

        // A wrapper with no delimiters only trims once.
        let rules = CanonicalRules::none().with_wrapper(ValueWrapper::new("", ""));
        assert_eq!(rules.unwrap_value(" Width "), "Width");
    }

    #[test]
    fn test_typed_members() {
        let rules = CanonicalRules::default().with_color_member("Tint");
        assert!(rules.is_color_member("Background"));
        assert!(rules.is_color_member("TextElement.Foreground"));
        assert!(rules.is_color_member("Tint"));
        assert!(!rules.is_color_member("Text"));
        assert!(rules.is_point_member("Points"));
        assert!(!rules.is_point_member("Margin"));
        assert!(!CanonicalRules::none().is_color_member("Background"));
    }

    #[test]
    fn test_source_scoped_removal() {
        let rules = CanonicalRules::none().with_removal(RemovalRule::new("x:Key").for_source(Source::Binary));
        assert!(rules.removes("x:Key", Source::Binary));
        assert!(!rules.removes("x:Key", Source::Markup));
        assert!(CanonicalRules::default().removes("xml:base", Source::Markup));
    }
}
