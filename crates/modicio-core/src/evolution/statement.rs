//! Statement vocabulary of the evolution language
//!
//! Statements are classified by substring containment, checked in the
//! order of [`VOCABULARY`]. The argument of a statement is whatever follows
//! its keyword.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::errors::{ModicioError, Result};

/// Selection slot named by `CLOSE <kind> <name>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Class,
    Attribute,
    Association,
    Composition,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Class => "class",
            Slot::Attribute => "attribute",
            Slot::Association => "association",
            Slot::Composition => "composition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateClass { name: String, is_abstract: bool },
    DeleteClass { name: String },
    OpenClass { name: String },
    DeleteAttribute { name: String },
    AddAttribute { name: String },
    OpenAttribute { name: String },
    SetType { d_type: &'static str },
    AddAssociation { name: String, target: String },
    DeleteAssociation { name: String },
    OpenAssociation { name: String },
    CompatibleWithVersion { version_time: DateTime<Utc> },
    VersionRange { from: DateTime<Utc>, to: DateTime<Utc> },
    CompatibleWithVariant { variant_time: DateTime<Utc> },
    VersionUpTo { border: DateTime<Utc> },
    VersionStartingFrom { border: DateTime<Utc> },
    AddParentRelation { target: String },
    DeleteParentRelation { target: String },
    DeleteComposition { name: String },
    AddComposition { role: String, target: String },
    MakeComposition { public: bool },
    OpenComposition { role: String },
    ChangeAttributeName { name: String },
    ChangeAttributeUri { uri: String },
    SetAttributeValue { value: String },
    Close { slot: Slot, name: String },
}

#[derive(Debug, Clone, Copy)]
enum Keyword {
    CreateClass,
    CreateAbstractClass,
    DeleteClass,
    OpenClass,
    DeleteAttribute,
    AddAttribute,
    OpenAttribute,
    SetType,
    AddAssociation,
    DeleteAssociation,
    OpenAssociation,
    CompatibleWithVersion,
    VersionRange,
    CompatibleWithVariant,
    VersionUpTo,
    VersionStartingFrom,
    AddParentRelation,
    DeleteParentRelation,
    DeleteComposition,
    AddComposition,
    MakeComposition,
    OpenComposition,
    ChangeAttributeName,
    ChangeAttributeUri,
    SetAttributeValue,
    Close(Slot),
}

/// Keywords in matching precedence
const VOCABULARY: &[(&str, Keyword)] = &[
    ("CREATE CLASS", Keyword::CreateClass),
    ("CREATE ABSTRACT CLASS", Keyword::CreateAbstractClass),
    ("DELETE CLASS", Keyword::DeleteClass),
    ("OPEN CLASS", Keyword::OpenClass),
    ("DELETE ATTRIBUTE", Keyword::DeleteAttribute),
    ("ADD ATTRIBUTE", Keyword::AddAttribute),
    ("OPEN ATTRIBUTE", Keyword::OpenAttribute),
    ("SET TYPE", Keyword::SetType),
    ("ADD ASSOCIATION", Keyword::AddAssociation),
    ("DELETE ASSOCIATION", Keyword::DeleteAssociation),
    ("OPEN ASSOCIATION", Keyword::OpenAssociation),
    ("SET COMPATIBLE WITH VERSION", Keyword::CompatibleWithVersion),
    ("SET VERSION RANGE FROM", Keyword::VersionRange),
    (
        "SET COMPATIBLE WITH ALL VERSIONS OF VARIANT",
        Keyword::CompatibleWithVariant,
    ),
    ("SET VERSION UP TO DATE", Keyword::VersionUpTo),
    ("SET VERSION STARTING FROM DATE", Keyword::VersionStartingFrom),
    ("ADD PARENT_RELATION", Keyword::AddParentRelation),
    ("DELETE PARENT_RELATION", Keyword::DeleteParentRelation),
    ("DELETE COMPOSITION", Keyword::DeleteComposition),
    ("ADD COMPOSITION", Keyword::AddComposition),
    ("MAKE COMPOSITION", Keyword::MakeComposition),
    ("OPEN COMPOSITION", Keyword::OpenComposition),
    ("CHANGE ATTRIBUTE NAME", Keyword::ChangeAttributeName),
    ("CHANGE ATTRIBUTE URI", Keyword::ChangeAttributeUri),
    ("SET ATTRIBUTE VALUE", Keyword::SetAttributeValue),
    ("CLOSE CLASS", Keyword::Close(Slot::Class)),
    ("CLOSE ATTRIBUTE", Keyword::Close(Slot::Attribute)),
    ("CLOSE ASSOCIATION", Keyword::Close(Slot::Association)),
    ("CLOSE COMPOSITION", Keyword::Close(Slot::Composition)),
];

/// `SET TYPE` keyword to resolved data type
pub fn resolve_type(keyword: &str) -> &'static str {
    match keyword {
        "WORD" => "Date",
        "PHRASE" => "String",
        "NUMBER" => "Integer",
        _ => "Default",
    }
}

/// Read an evolution date `YYYY-MM-DD` as noon UTC
pub fn parse_evolution_date(value: &str) -> Option<DateTime<Utc>> {
    let noon = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()?
        .and_hms_opt(12, 0, 0)?;
    Some(Utc.from_utc_datetime(&noon))
}

impl Statement {
    /// Classify one trimmed, non-empty statement
    ///
    /// # Errors
    /// * `UnknownStatement` - no keyword of the vocabulary occurs
    /// * `MalformedArgument` - the keyword's argument is missing or invalid
    pub fn parse(statement: &str) -> Result<Self> {
        let (keyword, rest) = VOCABULARY
            .iter()
            .find_map(|(word, keyword)| {
                statement
                    .find(word)
                    .map(|at| (*keyword, statement[at + word.len()..].trim()))
            })
            .ok_or_else(|| ModicioError::UnknownStatement {
                statement: statement.to_string(),
            })?;
        build(keyword, statement, rest)
    }

    /// True for statements that only move the selection
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            Statement::OpenClass { .. }
                | Statement::OpenAttribute { .. }
                | Statement::OpenAssociation { .. }
                | Statement::OpenComposition { .. }
                | Statement::Close { .. }
        )
    }
}

fn malformed(statement: &str, reason: impl Into<String>) -> ModicioError {
    ModicioError::MalformedArgument {
        statement: statement.to_string(),
        reason: reason.into(),
    }
}

fn name(statement: &str, rest: &str) -> Result<String> {
    if rest.is_empty() {
        return Err(malformed(statement, "missing name"));
    }
    Ok(rest.to_string())
}

fn date(statement: &str, rest: &str) -> Result<DateTime<Utc>> {
    parse_evolution_date(rest)
        .ok_or_else(|| malformed(statement, format!("'{}' is not a date (YYYY-MM-DD)", rest)))
}

/// Split `<name> <separator> <value>` into its two non-empty parts
fn split_pair(statement: &str, rest: &str, separator: &str) -> Result<(String, String)> {
    let (left, right) = rest
        .split_once(separator)
        .ok_or_else(|| malformed(statement, format!("missing {}", separator.trim())))?;
    Ok((name(statement, left.trim())?, name(statement, right.trim())?))
}

/// Strip the leading `TO` of `CHANGE ... TO x` / `SET ATTRIBUTE VALUE TO x`
fn after_to<'a>(statement: &str, rest: &'a str) -> Result<&'a str> {
    rest.strip_prefix("TO")
        .map(str::trim)
        .ok_or_else(|| malformed(statement, "missing TO"))
}

fn build(keyword: Keyword, statement: &str, rest: &str) -> Result<Statement> {
    let parsed = match keyword {
        Keyword::CreateClass => Statement::CreateClass {
            name: name(statement, rest)?,
            is_abstract: false,
        },
        Keyword::CreateAbstractClass => Statement::CreateClass {
            name: name(statement, rest)?,
            is_abstract: true,
        },
        Keyword::DeleteClass => Statement::DeleteClass {
            name: name(statement, rest)?,
        },
        Keyword::OpenClass => Statement::OpenClass {
            name: name(statement, rest)?,
        },
        Keyword::DeleteAttribute => Statement::DeleteAttribute {
            name: name(statement, rest)?,
        },
        Keyword::AddAttribute => Statement::AddAttribute {
            name: name(statement, rest)?,
        },
        Keyword::OpenAttribute => Statement::OpenAttribute {
            name: name(statement, rest)?,
        },
        Keyword::SetType => Statement::SetType {
            d_type: resolve_type(rest),
        },
        Keyword::AddAssociation => {
            let (name, target) = split_pair(statement, rest, " TARGET ")?;
            Statement::AddAssociation { name, target }
        }
        Keyword::DeleteAssociation => Statement::DeleteAssociation {
            name: name(statement, rest)?,
        },
        Keyword::OpenAssociation => Statement::OpenAssociation {
            name: name(statement, rest)?,
        },
        Keyword::CompatibleWithVersion => Statement::CompatibleWithVersion {
            version_time: date(statement, rest)?,
        },
        Keyword::VersionRange => {
            let (from, to) = split_pair(statement, rest, " TO ")?;
            let (from, to) = (date(statement, &from)?, date(statement, &to)?);
            if from > to {
                return Err(malformed(statement, "range starts after it ends"));
            }
            Statement::VersionRange { from, to }
        }
        Keyword::CompatibleWithVariant => Statement::CompatibleWithVariant {
            variant_time: date(statement, rest)?,
        },
        Keyword::VersionUpTo => Statement::VersionUpTo {
            border: date(statement, rest)?,
        },
        Keyword::VersionStartingFrom => Statement::VersionStartingFrom {
            border: date(statement, rest)?,
        },
        Keyword::AddParentRelation => Statement::AddParentRelation {
            target: name(statement, rest)?,
        },
        Keyword::DeleteParentRelation => Statement::DeleteParentRelation {
            target: name(statement, rest)?,
        },
        Keyword::DeleteComposition => Statement::DeleteComposition {
            name: name(statement, rest)?,
        },
        Keyword::AddComposition => {
            let (role, target) = split_pair(statement, rest, " TARGET ")?;
            Statement::AddComposition { role, target }
        }
        Keyword::MakeComposition => match rest {
            "PUBLIC" => Statement::MakeComposition { public: true },
            "PRIVATE" => Statement::MakeComposition { public: false },
            _ => return Err(malformed(statement, "expected PUBLIC or PRIVATE")),
        },
        Keyword::OpenComposition => Statement::OpenComposition {
            role: name(statement, rest)?,
        },
        Keyword::ChangeAttributeName => Statement::ChangeAttributeName {
            name: name(statement, after_to(statement, rest)?)?,
        },
        Keyword::ChangeAttributeUri => Statement::ChangeAttributeUri {
            uri: name(statement, after_to(statement, rest)?)?,
        },
        Keyword::SetAttributeValue => Statement::SetAttributeValue {
            value: after_to(statement, rest)?.to_string(),
        },
        Keyword::Close(slot) => Statement::Close {
            slot,
            name: rest.to_string(),
        },
    };
    Ok(parsed)
}
