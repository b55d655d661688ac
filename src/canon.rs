//! Canonicalization of captured node streams.
//!
//! Two encoders describing the same graph may emit different text. The
//! [`Canonicalizer`] rewrites one captured stream into a form where those
//! harmless differences are gone:
//!
//! 1. **Scoped removal**: member groups only one encoding emits are dropped
//!    together with their value and closing row.
//! 2. **Content rewriting**: member aliases, boolean case, nested runtime
//!    wrappers, setter/trigger property qualification, and retrieved objects
//!    (`SO T RETRIEVED` becomes `GO`). Colors and point lists are normalized
//!    only under the members [`CanonicalRules`] lists for them.
//! 3. **Member-group reordering**: the direct `SM … EM` groups of every object
//!    scope are stably sorted by their member row, innermost scopes first.
//! 4. **Projection**: only the row content is kept.
//!
//! Reordering is iterative. Start positions are pushed on `SO`/`GO` and popped
//! on `EO`, so the innermost scope is settled first and its rows are marked
//! processed; ancestors skip processed rows when looking for their own
//! members' closing `EM`.
//!
//! ```rust
//! use node_stream_diff::{CanonicalRules, Canonicalizer, Source};
//!
//! let rules = CanonicalRules::default();
//! let canon = Canonicalizer::new(&rules);
//!
//! let rows = canon
//!     .canonicalize_text("SO Button\nSM Width\nV 10\nEM\nSM Height\nV 5\nEM\nEO", Source::Markup)
//!     .unwrap();
//! assert_eq!(
//!     rows,
//!     vec!["SO Button", "SM Height", "V \"5\"", "EM", "SM Width", "V \"10\"", "EM", "EO"]
//! );
//! ```

use crate::color::Color;
use crate::node::Opcode;
use crate::point::PointList;
use crate::rules::{CanonicalRules, Source};
use crate::scanner::{scan, Instruction, RowFlag};
use crate::{Error, Result};

/// A row being canonicalized. `processed` marks rows already settled by an
/// inner scope.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Row {
    opcode: Opcode,
    content: String,
    line: usize,
    processed: bool,
}

/// A member group inside one object scope: the `SM` row and the inclusive
/// span it covers.
#[derive(Clone, Copy, Debug)]
struct Group {
    start: usize,
    end: usize,
}

pub struct Canonicalizer<'r> {
    rules: &'r CanonicalRules,
    reorder: bool,
}

impl<'r> Canonicalizer<'r> {
    pub fn new(rules: &'r CanonicalRules) -> Self {
        Canonicalizer {
            rules,
            reorder: true,
        }
    }

    #[must_use]
    pub fn with_reorder(mut self, reorder: bool) -> Self {
        self.reorder = reorder;
        self
    }

    /// Scans `text` and canonicalizes it.
    pub fn canonicalize_text(&self, text: &str, source: Source) -> Result<Vec<String>> {
        self.canonicalize(scan(text)?, source)
    }

    /// Canonicalizes captured rows, one row per element.
    pub fn canonicalize_rows<S: AsRef<str>>(&self, rows: &[S], source: Source) -> Result<Vec<String>> {
        let text = rows.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n");
        self.canonicalize_text(&text, source)
    }

    pub fn canonicalize(&self, instructions: Vec<Instruction>, source: Source) -> Result<Vec<String>> {
        let scanned = instructions.len();
        let kept = self.remove_groups(instructions, source)?;
        let removed = scanned - kept.len();

        let mut rows: Vec<Row> = self
            .rewrite(kept)
            .into_iter()
            .map(|ins| Row {
                opcode: ins.opcode,
                content: ins.to_string(),
                line: ins.line,
                processed: false,
            })
            .collect();

        let scopes = if self.reorder {
            reorder_members(&mut rows)?
        } else {
            0
        };

        tracing::debug!(
            source = source.as_str(),
            rows = rows.len(),
            removed,
            scopes,
            "canonicalized node stream"
        );
        Ok(rows.into_iter().map(|row| row.content).collect())
    }

    /// Drops every member group a removal rule names for `source`.
    fn remove_groups(&self, instructions: Vec<Instruction>, source: Source) -> Result<Vec<Instruction>> {
        if self.rules.removals.is_empty() {
            return Ok(instructions);
        }

        let mut kept = Vec::with_capacity(instructions.len());
        let mut skip_until: Option<usize> = None;
        for (i, ins) in instructions.iter().enumerate() {
            if let Some(end) = skip_until {
                if i <= end {
                    continue;
                }
                skip_until = None;
            }
            let removable = ins.opcode == Opcode::StartMember
                && ins
                    .qualified_token()
                    .map_or(false, |token| self.rules.removes(&token, source));
            if removable {
                let end = matching_end_member(&instructions, i)?;
                tracing::trace!(line = ins.line, rows = end - i + 1, "removing member group");
                skip_until = Some(end);
                continue;
            }
            kept.push(ins.clone());
        }
        Ok(kept)
    }

    fn rewrite(&self, instructions: Vec<Instruction>) -> Vec<Instruction> {
        // Local type names of open objects and local names of open members.
        let mut objects: Vec<Option<String>> = Vec::new();
        let mut members: Vec<String> = Vec::new();

        instructions
            .into_iter()
            .map(|mut ins| {
                match ins.opcode {
                    Opcode::StartObject => {
                        objects.push(ins.name().map(str::to_string));
                        if ins.has_flag(RowFlag::Retrieved) {
                            let line = ins.line;
                            ins = Instruction::new(Opcode::GetObject, Vec::new());
                            ins.line = line;
                        }
                    }
                    Opcode::GetObject => objects.push(None),
                    Opcode::EndObject => {
                        objects.pop();
                    }
                    Opcode::StartMember => {
                        let in_qualifying = self.in_qualifying_object(&objects);
                        self.rewrite_member(&mut ins, in_qualifying);
                        members.push(ins.name().unwrap_or_default().to_string());
                    }
                    Opcode::EndMember => {
                        members.pop();
                    }
                    Opcode::Value => {
                        let member = members.last().map_or("", String::as_str);
                        let in_qualifying = self.in_qualifying_object(&objects);
                        if let Some(value) = ins.operands.first_mut() {
                            *value = self.rewrite_value(value, member, in_qualifying);
                        }
                    }
                    Opcode::Namespace | Opcode::Closed => {}
                }
                ins
            })
            .collect()
    }

    fn in_qualifying_object(&self, objects: &[Option<String>]) -> bool {
        objects
            .last()
            .and_then(Option::as_deref)
            .map_or(false, |name| self.rules.is_qualifying_type(name))
    }

    fn rewrite_member(&self, ins: &mut Instruction, in_qualifying: bool) {
        let Some(token) = ins.qualified_token() else {
            return;
        };
        let canonical = self.rules.canonical_member(&token);
        let (mut prefix, mut name) = match canonical.split_once(':') {
            Some((prefix, name)) => (prefix.to_string(), name.to_string()),
            None => (String::new(), canonical.to_string()),
        };
        // The prefix qualified the owner, so it goes with it.
        if in_qualifying {
            if let Some((_, bare)) = name.split_once('.') {
                name = bare.to_string();
                prefix.clear();
            }
        }
        if ins.operands.len() >= 2 {
            ins.operands[0] = prefix;
            ins.operands[1] = name;
        }
    }

    /// Rewrites the value of the member named `member`.
    fn rewrite_value(&self, value: &str, member: &str, in_qualifying: bool) -> String {
        let mut value = self.rules.unwrap_value(value).to_string();

        if in_qualifying && self.rules.is_qualified_member(member) {
            if let Some((_, bare)) = value.rsplit_once('.') {
                value = bare.to_string();
            }
        }

        if self.rules.normalize_booleans {
            if value.eq_ignore_ascii_case("true") {
                return "true".to_string();
            }
            if value.eq_ignore_ascii_case("false") {
                return "false".to_string();
            }
        }

        if self.rules.normalize_colors && self.rules.is_color_member(member) {
            if let Ok(color) = value.parse::<Color>() {
                return color.to_string();
            }
        }

        if self.rules.normalize_points && self.rules.is_point_member(member) {
            if let Ok(points) = value.parse::<PointList>() {
                return points.to_string();
            }
        }

        value
    }
}

/// Index of the `EM` closing the `SM` at `start`, counting nested members.
fn matching_end_member(instructions: &[Instruction], start: usize) -> Result<usize> {
    let mut depth = 0usize;
    for (i, ins) in instructions.iter().enumerate().skip(start) {
        match ins.opcode {
            Opcode::StartMember => depth += 1,
            Opcode::EndMember => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(Error::unbalanced(
        instructions[start].line,
        "member group never closed",
    ))
}

/// Sorts member groups of every object scope, innermost first. Returns the
/// number of scopes settled.
fn reorder_members(rows: &mut [Row]) -> Result<usize> {
    let mut starts: Vec<usize> = Vec::new();
    let mut scopes = 0;

    for i in 0..rows.len() {
        match rows[i].opcode {
            op if op.opens_object() => starts.push(i),
            Opcode::EndObject => {
                let start = starts
                    .pop()
                    .ok_or_else(|| Error::unbalanced(rows[i].line, "EO without an open object"))?;
                sort_scope(rows, start, i)?;
                scopes += 1;
            }
            _ => {}
        }
    }

    if let Some(&start) = starts.last() {
        return Err(Error::unbalanced(rows[start].line, "object scope never closed"));
    }
    Ok(scopes)
}

/// Reorders the direct member groups between `start` (the `SO`/`GO` row) and
/// `end` (its `EO` row), then marks the whole scope processed.
fn sort_scope(rows: &mut [Row], start: usize, end: usize) -> Result<()> {
    let mut groups: Vec<Group> = Vec::new();
    let mut loose: Vec<usize> = Vec::new();

    let mut j = start + 1;
    while j < end {
        if rows[j].opcode == Opcode::StartMember && !rows[j].processed {
            let close = (j + 1..end)
                .find(|&k| !rows[k].processed && rows[k].opcode == Opcode::EndMember)
                .ok_or_else(|| Error::unbalanced(rows[j].line, "member group never closed"))?;
            groups.push(Group { start: j, end: close });
            j = close + 1;
        } else {
            loose.push(j);
            j += 1;
        }
    }

    if groups.len() > 1 {
        // Stable insertion sort by the member row's content.
        for i in 1..groups.len() {
            let mut k = i;
            while k > 0 && rows[groups[k - 1].start].content > rows[groups[k].start].content {
                groups.swap(k - 1, k);
                k -= 1;
            }
        }

        let mut segment: Vec<Row> = Vec::with_capacity(end - start - 1);
        segment.extend(loose.iter().map(|&i| rows[i].clone()));
        for group in &groups {
            segment.extend_from_slice(&rows[group.start..=group.end]);
        }
        debug_assert_eq!(segment.len(), end - start - 1);
        rows[start + 1..end].clone_from_slice(&segment);
        tracing::trace!(row = start, groups = groups.len(), "reordered object scope");
    }

    for row in &mut rows[start..=end] {
        row.processed = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RemovalRule;

    fn canon(text: &str, source: Source, rules: &CanonicalRules) -> Vec<String> {
        Canonicalizer::new(rules).canonicalize_text(text, source).unwrap()
    }

    #[test]
    fn test_nested_scopes_sort_independently() {
        let text = "SO Panel\n\
                    SM Children\n\
                    SO Button\nSM Width\nV 1\nEM\nSM Content\nV a\nEM\nEO\n\
                    EM\n\
                    SM Background\nV Red\nEM\n\
                    EO";
        let rows = canon(text, Source::Markup, &CanonicalRules::default());
        assert_eq!(
            rows,
            vec![
                "SO Panel",
                "SM Background",
                "V \"#FFFF0000\"",
                "EM",
                "SM Children",
                "SO Button",
                "SM Content",
                "V \"a\"",
                "EM",
                "SM Width",
                "V \"1\"",
                "EM",
                "EO",
                "EM",
                "EO",
            ]
        );
    }

    #[test]
    fn test_collection_order_is_kept() {
        let text = "SO List\nSM x:_Items IMPLICIT\nSO B\nEO\nSO A\nEO\nEM\nEO";
        let rows = canon(text, Source::Markup, &CanonicalRules::none());
        assert_eq!(rows[2], "SO B");
        assert_eq!(rows[4], "SO A");
    }

    #[test]
    fn test_removal_is_scoped_to_source() {
        let rules = CanonicalRules::none().with_removal(RemovalRule::new("x:Key").for_source(Source::Binary));
        let text = "SO Brush\nSM x:Key\nV k1\nEM\nSM Color\nV Red\nEM\nEO";
        assert_eq!(canon(text, Source::Binary, &rules).len(), 5);
        assert_eq!(canon(text, Source::Markup, &rules).len(), 8);
    }

    #[test]
    fn test_setter_property_qualification() {
        let text = "SO Setter\nSM Property\nV Button.Width\nEM\nSM Value\nV 10\nEM\nEO";
        let rows = canon(text, Source::Binary, &CanonicalRules::default());
        assert_eq!(rows[2], "V \"Width\"");
        assert_eq!(rows[5], "V \"10\"");

        let outside = canon("SO Label\nSM Tag\nV Button.Width\nEM\nEO", Source::Binary, &CanonicalRules::default());
        assert_eq!(outside[2], "V \"Button.Width\"");
    }

    #[test]
    fn test_value_rewrites() {
        let rules = CanonicalRules::default();
        let c = Canonicalizer::new(&rules);
        assert_eq!(c.rewrite_value("TRUE", "IsEnabled", false), "true");
        assert_eq!(c.rewrite_value("{x:Type Button}", "TargetType", false), "Button");
        assert_eq!(c.rewrite_value("PointCollection:0,0 1.50,2", "Points", false), "0,0 1.5,2");
        assert_eq!(c.rewrite_value("#f00", "Fill", false), "#FFFF0000");
        assert_eq!(c.rewrite_value("hello", "Fill", false), "hello");
        assert_eq!(c.rewrite_value("RuntimeType:DependencyProperty:Button.Width", "Property", true), "Width");
    }

    #[test]
    fn test_nested_wrappers_reach_a_fixed_point() {
        let rules = CanonicalRules::default();
        let c = Canonicalizer::new(&rules);
        let once = c.rewrite_value("RuntimeType:DependencyProperty:Width", "Tag", false);
        assert_eq!(once, "Width");
        assert_eq!(c.rewrite_value(&once, "Tag", false), once);

        let text = "SO Label\nSM Tag\nV \"RuntimeType:DependencyProperty:Width\"\nEM\nEO";
        let first = canon(text, Source::Binary, &rules);
        let second = canon(&first.join("\n"), Source::Binary, &rules);
        assert_eq!(first, second);
    }

    #[test]
    fn test_color_and_point_rewrites_follow_the_member() {
        let rules = CanonicalRules::default();
        let text = canon("SO TextBlock\nSM Text\nV Red\nEM\nEO", Source::Markup, &rules);
        assert_eq!(text[2], "V \"Red\"");
        let points = canon("SO TextBlock\nSM Tag\nV \"1.50,2\"\nEM\nEO", Source::Markup, &rules);
        assert_eq!(points[2], "V \"1.50,2\"");

        let fill = canon("SO Rectangle\nSM Fill\nV Red\nEM\nEO", Source::Markup, &rules);
        assert_eq!(fill[2], "V \"#FFFF0000\"");
        let attached = canon("SO Run\nSM TextElement.Foreground\nV #f00\nEM\nEO", Source::Markup, &rules);
        assert_eq!(attached[2], "V \"#FFFF0000\"");
    }

    #[test]
    fn test_setter_member_drops_owner_prefix() {
        let rules = CanonicalRules::default();
        let qualified = canon("SO Setter\nSM p:Button.Width\nV 10\nEM\nEO", Source::Markup, &rules);
        let bare = canon("SO Setter\nSM Width\nV 10\nEM\nEO", Source::Binary, &rules);
        assert_eq!(qualified, bare);
        assert_eq!(qualified[1], "SM Width");

        // Outside a setter the prefix and owner both stay.
        let outside = canon("SO Grid\nSM p:Button.Width\nV 10\nEM\nEO", Source::Markup, &rules);
        assert_eq!(outside[1], "SM p:Button.Width");
    }

    #[test]
    fn test_retrieved_forms_agree() {
        let rules = CanonicalRules::none();
        let a = canon("SO Root\nSM Style\nSO p:Style RETRIEVED\nEO\nEM\nEO", Source::Markup, &rules);
        let a_text = a.join("\n");
        assert!(a_text.contains("GO"));
        let b = canon("SO Root\nSM Style\nGO\nEO\nEM\nEO", Source::Binary, &rules);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unbalanced_input_is_rejected() {
        let rules = CanonicalRules::default();
        let c = Canonicalizer::new(&rules);
        assert!(c.canonicalize_text("EO", Source::Markup).is_err());
        assert!(c.canonicalize_text("SO A\nSM B\nV 1\nEM", Source::Markup).is_err());
        assert!(c.canonicalize_text("SO A\nSM xml:base\nV u", Source::Markup).is_err());
    }
}
