//! SQL templates for catalog metrics. A template is literal SQL with
//! `{name}` placeholders and `[[ ... ]]` optional blocks; rendering turns
//! placeholders into positional binds, so parameter values never touch the
//! SQL text itself. Compilation happens once at startup and rejects anything
//! malformed outright.

use std::collections::BTreeMap;

use thiserror::Error;

use rota_core::Weekday;

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("unbalanced template delimiters")]
    Unbalanced,
    #[error("nested optional blocks are not supported")]
    NestedConditional,
    #[error("unknown placeholder '{0}'")]
    UnknownPlaceholder(String),
    #[error("empty placeholder")]
    EmptyPlaceholder,
    #[error("missing required parameter '{0}'")]
    MissingParam(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Text,
    TextArray,
    Int,
    Day,
}

/// One declared metric parameter. Required parameters sit in the template
/// body proper; optional ones may only appear inside `[[ ... ]]` blocks.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub required: bool,
}

impl ParamSpec {
    pub const fn required(name: &'static str, param_type: ParamType) -> Self {
        ParamSpec { name, param_type, required: true }
    }

    pub const fn optional(name: &'static str, param_type: ParamType) -> Self {
        ParamSpec { name, param_type, required: false }
    }
}

/// A bindable value. The variant decides the SQL cast on the placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    TextArray(Vec<String>),
    Int(i64),
    Day(Weekday),
}

impl ParamValue {
    pub fn sql_cast(&self) -> &'static str {
        match self {
            ParamValue::Text(_) => "::text",
            ParamValue::TextArray(_) => "::text[]",
            ParamValue::Int(_) => "::bigint",
            ParamValue::Day(_) => "::text",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder(String),
    /// Rendered only when every placeholder inside has a value.
    Conditional(Vec<Segment>),
}

#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
pub struct RenderedQuery {
    pub sql: String,
    pub binds: Vec<ParamValue>,
}

pub fn compile(source: &str, allowed: &[&str]) -> Result<CompiledTemplate, TemplateError> {
    let segments = parse(source, allowed, false)?;
    Ok(CompiledTemplate { segments })
}

fn parse(
    source: &str,
    allowed: &[&str],
    inside_conditional: bool,
) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = source;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("[[") {
            if inside_conditional {
                return Err(TemplateError::NestedConditional);
            }
            let close = after.find("]]").ok_or(TemplateError::Unbalanced)?;
            let inner = &after[..close];
            segments.push(Segment::Conditional(parse(inner, allowed, true)?));
            rest = &after[close + 2..];
            continue;
        }
        if rest.starts_with("]]") {
            return Err(TemplateError::Unbalanced);
        }
        if let Some(after) = rest.strip_prefix('{') {
            let close = after.find('}').ok_or(TemplateError::Unbalanced)?;
            let name = after[..close].trim();
            if name.is_empty() {
                return Err(TemplateError::EmptyPlaceholder);
            }
            if !allowed.contains(&name) {
                return Err(TemplateError::UnknownPlaceholder(name.to_string()));
            }
            segments.push(Segment::Placeholder(name.to_string()));
            rest = &after[close + 1..];
            continue;
        }
        if rest.starts_with('}') {
            return Err(TemplateError::Unbalanced);
        }

        // Literal run up to the next marker. None of the markers start at
        // this position (handled above), so the run is never empty.
        let cut = ["{", "}", "[[", "]]"]
            .iter()
            .filter_map(|marker| rest.find(marker))
            .min()
            .unwrap_or(rest.len())
            .max(1);
        match segments.last_mut() {
            Some(Segment::Literal(literal)) => literal.push_str(&rest[..cut]),
            _ => segments.push(Segment::Literal(rest[..cut].to_string())),
        }
        rest = &rest[cut..];
    }

    Ok(segments)
}

impl CompiledTemplate {
    /// Every placeholder the template can reference, conditionals included.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_placeholders(&self.segments, &mut names);
        names
    }

    pub fn render(
        &self,
        values: &BTreeMap<String, ParamValue>,
    ) -> Result<RenderedQuery, TemplateError> {
        let mut sql = String::new();
        let mut binds: Vec<ParamValue> = Vec::new();
        let mut ordinals: BTreeMap<String, usize> = BTreeMap::new();
        render_segments(&self.segments, values, &mut sql, &mut binds, &mut ordinals)?;
        Ok(RenderedQuery { sql, binds })
    }
}

fn collect_placeholders<'a>(segments: &'a [Segment], names: &mut Vec<&'a str>) {
    for segment in segments {
        match segment {
            Segment::Literal(_) => {}
            Segment::Placeholder(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Segment::Conditional(inner) => collect_placeholders(inner, names),
        }
    }
}

fn render_segments(
    segments: &[Segment],
    values: &BTreeMap<String, ParamValue>,
    sql: &mut String,
    binds: &mut Vec<ParamValue>,
    ordinals: &mut BTreeMap<String, usize>,
) -> Result<(), TemplateError> {
    for segment in segments {
        match segment {
            Segment::Literal(literal) => sql.push_str(literal),
            Segment::Placeholder(name) => {
                let value = values
                    .get(name)
                    .ok_or_else(|| TemplateError::MissingParam(name.clone()))?;
                let ordinal = match ordinals.get(name) {
                    Some(existing) => *existing,
                    None => {
                        binds.push(value.clone());
                        ordinals.insert(name.clone(), binds.len());
                        binds.len()
                    }
                };
                sql.push_str(&format!("${ordinal}{}", value.sql_cast()));
            }
            Segment::Conditional(inner) => {
                let mut needed = Vec::new();
                collect_placeholders(inner, &mut needed);
                if needed.iter().all(|name| values.contains_key(*name)) {
                    render_segments(inner, values, sql, binds, ordinals)?;
                }
            }
        }
    }
    Ok(())
}
