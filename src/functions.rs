//! Implementations backing the regular-operator registry (`registry.rs`).
//!
//! String-function bodies (char-indexed `SUBSTR`, `STRBEFORE`/`STRAFTER`,
//! `ENCODE_FOR_URI`'s byte-percent-encoding, the `REGEX`/`REPLACE` flag
//! handling, and the hash-function hex encoding) are adapted line-for-line
//! in spirit from `spareval`'s `expression.rs`, generalized to return
//! `Result<EvalTerm, EvalError>` instead of `Option<ExpressionTerm>` so
//! failures carry the taxonomy of §7 instead of being erased.

use crate::error::EvalError;
use crate::operator::{OperatorSymbol, XsdCastTarget};
use crate::registry::FunctionContext;
use crate::value::{self, format_decimal, value_equals, EvalTerm, NumericPair, TypeTag};
use bigdecimal::{BigDecimal, ToBigInt};
use md5::{Digest, Md5};
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use oxrdf::{BlankNode, NamedNode};
use oxsdatatypes::{Double, Float};
use regex::{Regex, RegexBuilder};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use std::borrow::Cow;
use std::str::FromStr;

const REGEX_SIZE_LIMIT: usize = 1_000_000;

/// Extracts `(lexical, language)` from a string-like operand, or fails.
fn string_and_language(t: &EvalTerm) -> Result<(String, Option<String>), EvalError> {
    match t {
        EvalTerm::String(v) => Ok((v.clone(), None)),
        EvalTerm::LangString { value, language } => Ok((value.clone(), Some(language.clone()))),
        _ => Err(type_error(OperatorSymbol::Str, std::slice::from_ref(t))),
    }
}

fn plain_literal(value: String, language: Option<String>) -> EvalTerm {
    match language {
        Some(language) => EvalTerm::LangString { value, language },
        None => EvalTerm::String(value),
    }
}

fn type_error(operator: OperatorSymbol, args: &[EvalTerm]) -> EvalError {
    EvalError::InvalidArgumentTypes {
        operator,
        operand_types: args.iter().map(EvalTerm::type_tag).collect(),
    }
}

// ---- arithmetic -----------------------------------------------------

pub fn add(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    match NumericPair::new(OperatorSymbol::Add, &args[0], &args[1])? {
        NumericPair::Integer(a, b) => Ok(EvalTerm::Integer(a + b)),
        NumericPair::Decimal(a, b) => Ok(EvalTerm::Decimal(a + b)),
        NumericPair::Float(a, b) => Ok(EvalTerm::Float(a + b)),
        NumericPair::Double(a, b) => Ok(EvalTerm::Double(a + b)),
    }
}

pub fn subtract(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    match NumericPair::new(OperatorSymbol::Subtract, &args[0], &args[1])? {
        NumericPair::Integer(a, b) => Ok(EvalTerm::Integer(a - b)),
        NumericPair::Decimal(a, b) => Ok(EvalTerm::Decimal(a - b)),
        NumericPair::Float(a, b) => Ok(EvalTerm::Float(a - b)),
        NumericPair::Double(a, b) => Ok(EvalTerm::Double(a - b)),
    }
}

pub fn multiply(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    match NumericPair::new(OperatorSymbol::Multiply, &args[0], &args[1])? {
        NumericPair::Integer(a, b) => Ok(EvalTerm::Integer(a * b)),
        NumericPair::Decimal(a, b) => Ok(EvalTerm::Decimal(a * b)),
        NumericPair::Float(a, b) => Ok(EvalTerm::Float(a * b)),
        NumericPair::Double(a, b) => Ok(EvalTerm::Double(a * b)),
    }
}

/// Division of two `integer`s promotes to `decimal` (§3 "Numeric lattice").
pub fn divide(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    match NumericPair::new(OperatorSymbol::Divide, &args[0], &args[1])? {
        NumericPair::Integer(a, b) => {
            if b.is_zero() {
                return Err(type_error(OperatorSymbol::Divide, args));
            }
            Ok(EvalTerm::Decimal(BigDecimal::from(a) / BigDecimal::from(b)))
        }
        NumericPair::Decimal(a, b) => {
            if b.is_zero() {
                return Err(type_error(OperatorSymbol::Divide, args));
            }
            Ok(EvalTerm::Decimal(a / b))
        }
        NumericPair::Float(a, b) => Ok(EvalTerm::Float(a / b)),
        NumericPair::Double(a, b) => Ok(EvalTerm::Double(a / b)),
    }
}

pub fn unary_plus(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(args[0].clone())
}

pub fn unary_minus(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(match &args[0] {
        EvalTerm::Integer(v) => EvalTerm::Integer(-v),
        EvalTerm::Decimal(v) => EvalTerm::Decimal(-v.clone()),
        EvalTerm::Float(v) => EvalTerm::Float(-*v),
        EvalTerm::Double(v) => EvalTerm::Double(-*v),
        _ => return Err(type_error(OperatorSymbol::UnaryMinus, args)),
    })
}

pub fn abs(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(match &args[0] {
        EvalTerm::Integer(v) => EvalTerm::Integer(v.abs()),
        EvalTerm::Decimal(v) => EvalTerm::Decimal(v.abs()),
        EvalTerm::Float(v) => EvalTerm::Float(v.abs()),
        EvalTerm::Double(v) => EvalTerm::Double(v.abs()),
        _ => return Err(type_error(OperatorSymbol::Abs, args)),
    })
}

pub fn ceil(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(match &args[0] {
        EvalTerm::Integer(v) => EvalTerm::Integer(v.clone()),
        EvalTerm::Decimal(v) => EvalTerm::Decimal(v.with_scale(0) + ceil_fraction(v)),
        EvalTerm::Float(v) => EvalTerm::Float(v.ceil()),
        EvalTerm::Double(v) => EvalTerm::Double(v.ceil()),
        _ => return Err(type_error(OperatorSymbol::Ceil, args)),
    })
}

pub fn floor(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(match &args[0] {
        EvalTerm::Integer(v) => EvalTerm::Integer(v.clone()),
        EvalTerm::Decimal(v) => EvalTerm::Decimal(v.with_scale(0) - floor_fraction(v)),
        EvalTerm::Float(v) => EvalTerm::Float(v.floor()),
        EvalTerm::Double(v) => EvalTerm::Double(v.floor()),
        _ => return Err(type_error(OperatorSymbol::Floor, args)),
    })
}

pub fn round(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(match &args[0] {
        EvalTerm::Integer(v) => EvalTerm::Integer(v.clone()),
        EvalTerm::Decimal(v) => EvalTerm::Decimal(v.round(0)),
        EvalTerm::Float(v) => EvalTerm::Float(v.round()),
        EvalTerm::Double(v) => EvalTerm::Double(v.round()),
        _ => return Err(type_error(OperatorSymbol::Round, args)),
    })
}

fn ceil_fraction(v: &BigDecimal) -> BigDecimal {
    let truncated = v.with_scale(0);
    if *v > truncated {
        BigDecimal::from(1)
    } else {
        BigDecimal::from(0)
    }
}

fn floor_fraction(v: &BigDecimal) -> BigDecimal {
    let truncated = v.with_scale(0);
    if *v < truncated {
        BigDecimal::from(1)
    } else {
        BigDecimal::from(0)
    }
}

pub fn rand(_ctx: &FunctionContext, _args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::Double(Double::from(rand::random::<f64>())))
}

// ---- term inspection / construction ----------------------------------

pub fn str_fn(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::String(match &args[0] {
        EvalTerm::NamedNode(n) => n.as_str().to_owned(),
        EvalTerm::String(v) => v.clone(),
        EvalTerm::LangString { value, .. } => value.clone(),
        EvalTerm::Boolean(v) => v.to_string(),
        EvalTerm::Integer(v) => v.to_string(),
        EvalTerm::Decimal(v) => format_decimal(v),
        EvalTerm::Float(v) => v.to_string(),
        EvalTerm::Double(v) => v.to_string(),
        EvalTerm::DateTime(v) => v.to_string(),
        EvalTerm::NonLexical { lexical, .. } | EvalTerm::Other { lexical, .. } => lexical.clone(),
        EvalTerm::BlankNode(_) => return Err(type_error(OperatorSymbol::Str, args)),
    }))
}

pub fn lang(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::String(match &args[0] {
        EvalTerm::LangString { language, .. } => language.clone(),
        EvalTerm::String(_)
        | EvalTerm::Boolean(_)
        | EvalTerm::Integer(_)
        | EvalTerm::Decimal(_)
        | EvalTerm::Float(_)
        | EvalTerm::Double(_)
        | EvalTerm::DateTime(_)
        | EvalTerm::NonLexical { .. }
        | EvalTerm::Other { .. } => String::new(),
        EvalTerm::NamedNode(_) | EvalTerm::BlankNode(_) => {
            return Err(type_error(OperatorSymbol::Lang, args))
        }
    }))
}

pub fn lang_matches(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (tag, _) = string_and_language(&args[0])?;
    let (range, _) = string_and_language(&args[1])?;
    let tag = tag.to_ascii_lowercase();
    let range = range.to_ascii_lowercase();
    Ok(EvalTerm::Boolean(
        range == "*" && !tag.is_empty()
            || tag == range
            || tag.starts_with(&format!("{range}-")),
    ))
}

pub fn datatype(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    match &args[0] {
        EvalTerm::NamedNode(_) | EvalTerm::BlankNode(_) => Err(type_error(OperatorSymbol::Datatype, args)),
        other => Ok(EvalTerm::NamedNode(other.datatype_iri())),
    }
}

pub fn bnode_nullary(_ctx: &FunctionContext, _args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::BlankNode(BlankNode::default()))
}

/// `BNODE(id)` reuses `id` as the blank node's own label, per §17.4.18 of
/// the SPARQL 1.1 recommendation: repeated calls with the same `id` within
/// one solution mapping must yield the same blank node.
pub fn bnode_unary(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (id, _) = string_and_language(&args[0])?;
    BlankNode::new(id)
        .map(EvalTerm::BlankNode)
        .map_err(|_| type_error(OperatorSymbol::BNode, args))
}

pub fn iri(ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let relative = match &args[0] {
        EvalTerm::NamedNode(n) => return Ok(EvalTerm::NamedNode(n.clone())),
        other => string_and_language(other)?.0,
    };
    let resolved = match &ctx.base_iri {
        Some(base) => base.resolve(&relative),
        None => oxiri::Iri::parse(relative.clone()),
    }
    .map_err(|_| cast_error(&relative, TypeTag::String, "anyURI"))?;
    Ok(EvalTerm::NamedNode(resolved.into()))
}

fn cast_error(lexical: &str, from: TypeTag, to: &str) -> EvalError {
    EvalError::Cast {
        lexical: lexical.to_owned(),
        from,
        to: NamedNode::new_unchecked(format!("http://www.w3.org/2001/XMLSchema#{to}")),
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

pub fn str_dt(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (lexical, _) = string_and_language(&args[0])?;
    let EvalTerm::NamedNode(datatype) = &args[1] else {
        return Err(type_error(OperatorSymbol::StrDt, args));
    };
    Ok(value::EvalTerm::from(oxrdf::Term::Literal(
        oxrdf::Literal::new_typed_literal(lexical, datatype.clone()),
    )))
}

pub fn str_lang(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (value, _) = string_and_language(&args[0])?;
    let (language, _) = string_and_language(&args[1])?;
    Ok(EvalTerm::LangString { value, language })
}

pub fn uuid(_ctx: &FunctionContext, _args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::NamedNode(NamedNode::new_unchecked(format!(
        "urn:uuid:{}",
        random_uuid_v4()
    ))))
}

pub fn str_uuid(_ctx: &FunctionContext, _args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::String(random_uuid_v4()))
}

fn random_uuid_v4() -> String {
    let mut bytes: [u8; 16] = rand::random();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        bytes[6], bytes[7],
        bytes[8], bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
    )
}

// ---- string functions -------------------------------------------------

pub fn str_len(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (s, _) = string_and_language(&args[0])?;
    Ok(EvalTerm::Integer(BigInt::from(s.chars().count())))
}

pub fn ucase(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (s, lang) = string_and_language(&args[0])?;
    Ok(plain_literal(s.to_uppercase(), lang))
}

pub fn lcase(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (s, lang) = string_and_language(&args[0])?;
    Ok(plain_literal(s.to_lowercase(), lang))
}

fn string_like_pair(
    op: OperatorSymbol,
    a: &EvalTerm,
    b: &EvalTerm,
) -> Result<(String, String, Option<String>), EvalError> {
    let (v1, l1) = string_and_language(a)?;
    let (v2, l2) = string_and_language(b)?;
    if l2.is_some() && l1 != l2 {
        return Err(type_error(op, std::slice::from_ref(a)));
    }
    Ok((v1, v2, l1))
}

pub fn str_starts(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (a, b, _) = string_like_pair(OperatorSymbol::StrStarts, &args[0], &args[1])?;
    Ok(EvalTerm::Boolean(a.starts_with(&b)))
}

pub fn str_ends(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (a, b, _) = string_like_pair(OperatorSymbol::StrEnds, &args[0], &args[1])?;
    Ok(EvalTerm::Boolean(a.ends_with(&b)))
}

pub fn contains(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (a, b, _) = string_like_pair(OperatorSymbol::Contains, &args[0], &args[1])?;
    Ok(EvalTerm::Boolean(a.contains(&b)))
}

pub fn str_before(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (a, b, lang) = string_like_pair(OperatorSymbol::StrBefore, &args[0], &args[1])?;
    Ok(match a.find(&b) {
        Some(pos) => plain_literal(a[..pos].to_owned(), lang),
        None => EvalTerm::String(String::new()),
    })
}

pub fn str_after(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (a, b, lang) = string_like_pair(OperatorSymbol::StrAfter, &args[0], &args[1])?;
    Ok(match a.find(&b) {
        Some(pos) => plain_literal(a[pos + b.len()..].to_owned(), lang),
        None => EvalTerm::String(String::new()),
    })
}

pub fn concat(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let mut result = String::new();
    let mut language: Option<Option<String>> = None;
    for arg in args {
        let (value, lang) = string_and_language(arg)?;
        language = Some(match language {
            None => lang,
            Some(existing) if existing == lang => existing,
            Some(_) => None,
        });
        result += &value;
    }
    Ok(plain_literal(result, language.flatten()))
}

fn integer_index(t: &EvalTerm, op: OperatorSymbol) -> Result<i64, EvalError> {
    match t {
        EvalTerm::Integer(v) => v
            .to_i64()
            .ok_or_else(|| type_error(op, std::slice::from_ref(t))),
        _ => Err(type_error(op, std::slice::from_ref(t))),
    }
}

pub fn substr2(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    substr_impl(&args[0], &args[1], None)
}

pub fn substr3(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    substr_impl(&args[0], &args[1], Some(&args[2]))
}

/// 1-based, character-indexed, per XPath `fn:substring`'s common case
/// (we do not special-case a `starting_loc` less than 1, matching the
/// conservative subset the teacher's own evaluator implements).
fn substr_impl(
    source: &EvalTerm,
    start: &EvalTerm,
    length: Option<&EvalTerm>,
) -> Result<EvalTerm, EvalError> {
    let (source, lang) = string_and_language(source)?;
    let arity_err = || type_error(OperatorSymbol::SubStr, std::slice::from_ref(start));
    let starting_location: usize = usize::try_from(integer_index(start, OperatorSymbol::SubStr)?)
        .map_err(|_| arity_err())?;
    let length: Option<usize> = length
        .map(|l| -> Result<usize, EvalError> {
            usize::try_from(integer_index(l, OperatorSymbol::SubStr)?).map_err(|_| arity_err())
        })
        .transpose()?;

    let skip = starting_location.checked_sub(1).ok_or_else(arity_err)?;
    let mut start_iter = source.char_indices().skip(skip).peekable();
    let result = if let Some((start_position, _)) = start_iter.peek().copied() {
        if let Some(length) = length {
            let mut end_iter = start_iter.skip(length).peekable();
            if let Some((end_position, _)) = end_iter.peek() {
                &source[start_position..*end_position]
            } else {
                &source[start_position..]
            }
        } else {
            &source[start_position..]
        }
    } else {
        ""
    };
    Ok(plain_literal(result.to_owned(), lang))
}

pub fn encode_for_uri(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let (s, _) = string_and_language(&args[0])?;
    let mut out = Vec::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b),
            _ => {
                out.push(b'%');
                out.push(hex_digit(b / 16));
                out.push(hex_digit(b % 16));
            }
        }
    }
    Ok(EvalTerm::String(
        String::from_utf8(out).expect("percent-encoded ASCII is always valid UTF-8"),
    ))
}

fn hex_digit(n: u8) -> u8 {
    if n < 10 {
        b'0' + n
    } else {
        b'A' + (n - 10)
    }
}

fn compile_pattern(pattern: &str, flags: Option<&str>) -> Result<Regex, EvalError> {
    let mut pattern = Cow::Borrowed(pattern);
    let flags = flags.unwrap_or_default();
    if flags.contains('q') {
        pattern = regex::escape(&pattern).into();
    }
    let mut builder = RegexBuilder::new(&pattern);
    builder.size_limit(REGEX_SIZE_LIMIT);
    for flag in flags.chars() {
        match flag {
            's' => {
                builder.dot_matches_new_line(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            'i' => {
                builder.case_insensitive(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            'q' => (),
            _ => {
                return Err(EvalError::InvalidArgumentTypes {
                    operator: OperatorSymbol::Regex,
                    operand_types: vec![TypeTag::String],
                })
            }
        }
    }
    builder
        .build()
        .map_err(|_| EvalError::InvalidArgumentTypes {
            operator: OperatorSymbol::Regex,
            operand_types: vec![TypeTag::String],
        })
}

pub fn regex2(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    regex_impl(&args[0], &args[1], None)
}

pub fn regex3(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    regex_impl(&args[0], &args[1], Some(&args[2]))
}

fn regex_impl(
    text: &EvalTerm,
    pattern: &EvalTerm,
    flags: Option<&EvalTerm>,
) -> Result<EvalTerm, EvalError> {
    let (text, _) = string_and_language(text)?;
    let (pattern, _) = string_and_language(pattern)?;
    let flags = flags.map(string_and_language).transpose()?.map(|(f, _)| f);
    let regex = compile_pattern(&pattern, flags.as_deref())?;
    Ok(EvalTerm::Boolean(regex.is_match(&text)))
}

pub fn replace3(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    replace_impl(&args[0], &args[1], &args[2], None)
}

pub fn replace4(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    replace_impl(&args[0], &args[1], &args[2], Some(&args[3]))
}

fn replace_impl(
    text: &EvalTerm,
    pattern: &EvalTerm,
    replacement: &EvalTerm,
    flags: Option<&EvalTerm>,
) -> Result<EvalTerm, EvalError> {
    let (text, lang) = string_and_language(text)?;
    let (pattern, _) = string_and_language(pattern)?;
    let (replacement, _) = string_and_language(replacement)?;
    let flags = flags.map(string_and_language).transpose()?.map(|(f, _)| f);
    let regex = compile_pattern(&pattern, flags.as_deref())?;
    let replaced = match regex.replace_all(&text, replacement.as_str()) {
        Cow::Owned(s) => s,
        Cow::Borrowed(_) => text,
    };
    Ok(plain_literal(replaced, lang))
}

// ---- date/time ---------------------------------------------------------

pub fn now(ctx: &FunctionContext, _args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::DateTime(ctx.now))
}

pub fn year(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    date_time_field(args, OperatorSymbol::Year, |d| BigInt::from(d.year()))
}

pub fn month(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    date_time_field(args, OperatorSymbol::Month, |d| BigInt::from(d.month()))
}

pub fn day(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    date_time_field(args, OperatorSymbol::Day, |d| BigInt::from(d.day()))
}

pub fn hours(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    date_time_field(args, OperatorSymbol::Hours, |d| BigInt::from(d.hour()))
}

pub fn minutes(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    date_time_field(args, OperatorSymbol::Minutes, |d| BigInt::from(d.minute()))
}

fn date_time_field(
    args: &[EvalTerm],
    op: OperatorSymbol,
    f: impl Fn(oxsdatatypes::DateTime) -> BigInt,
) -> Result<EvalTerm, EvalError> {
    match &args[0] {
        EvalTerm::DateTime(d) => Ok(EvalTerm::Integer(f(*d))),
        _ => Err(type_error(op, args)),
    }
}

pub fn seconds(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    match &args[0] {
        EvalTerm::DateTime(d) => {
            let seconds = d.second().to_string();
            BigDecimal::from_str(&seconds)
                .map(EvalTerm::Decimal)
                .map_err(|_| type_error(OperatorSymbol::Seconds, args))
        }
        _ => Err(type_error(OperatorSymbol::Seconds, args)),
    }
}

pub fn timezone(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    match &args[0] {
        EvalTerm::DateTime(d) => match d.timezone() {
            Some(tz) => Ok(EvalTerm::Other {
                lexical: format_day_time_duration(tz),
                datatype: NamedNode::new_unchecked(
                    "http://www.w3.org/2001/XMLSchema#dayTimeDuration",
                ),
            }),
            None => Err(type_error(OperatorSymbol::Timezone, args)),
        },
        _ => Err(type_error(OperatorSymbol::Timezone, args)),
    }
}

fn format_day_time_duration(d: oxsdatatypes::DayTimeDuration) -> String {
    d.to_string()
}

pub fn tz(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    match &args[0] {
        EvalTerm::DateTime(d) => Ok(EvalTerm::String(match d.timezone_offset() {
            Some(offset) => offset.to_string(),
            None => String::new(),
        })),
        _ => Err(type_error(OperatorSymbol::Tz, args)),
    }
}

// ---- hashing -------------------------------------------------------------

pub fn md5_fn(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    hash::<Md5>(args, OperatorSymbol::Md5)
}

pub fn sha1_fn(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    hash::<Sha1>(args, OperatorSymbol::Sha1)
}

pub fn sha256_fn(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    hash::<Sha256>(args, OperatorSymbol::Sha256)
}

pub fn sha384_fn(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    hash::<Sha384>(args, OperatorSymbol::Sha384)
}

pub fn sha512_fn(_ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    hash::<Sha512>(args, OperatorSymbol::Sha512)
}

fn hash<H: Digest>(args: &[EvalTerm], op: OperatorSymbol) -> Result<EvalTerm, EvalError> {
    let (input, _) = string_and_language(&args[0]).map_err(|_| type_error(op, args))?;
    Ok(EvalTerm::String(hex::encode(
        H::new().chain_update(input.as_bytes()).finalize(),
    )))
}

// ---- casts ---------------------------------------------------------------

pub fn cast(target: XsdCastTarget, _ctx: &FunctionContext, args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    let v = &args[0];
    let fail = || cast_error(&cast_source_lexical(v), v.type_tag(), cast_target_name(target));
    match target {
        XsdCastTarget::String => Ok(EvalTerm::String(cast_source_lexical(v))),
        XsdCastTarget::Boolean => Ok(EvalTerm::Boolean(match v {
            EvalTerm::Boolean(b) => *b,
            EvalTerm::String(s) => match s.as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(fail()),
            },
            EvalTerm::Integer(n) => !n.is_zero(),
            EvalTerm::Decimal(n) => !n.is_zero(),
            EvalTerm::Float(f) => !(*f == Float::from(0.0f32) || f.is_nan()),
            EvalTerm::Double(d) => !(*d == Double::from(0.) || d.is_nan()),
            _ => return Err(fail()),
        })),
        XsdCastTarget::Integer => Ok(EvalTerm::Integer(match v {
            EvalTerm::Integer(n) => n.clone(),
            EvalTerm::Decimal(n) => n.with_scale(0).to_bigint().ok_or_else(fail)?,
            EvalTerm::Float(f) => BigInt::from(f64::from(*f) as i64),
            EvalTerm::Double(d) => BigInt::from(f64::from(*d) as i64),
            EvalTerm::Boolean(b) => BigInt::from(*b as i64),
            EvalTerm::String(s) => value::parse_xsd_integer(s).ok_or_else(fail)?,
            _ => return Err(fail()),
        })),
        XsdCastTarget::Decimal => Ok(EvalTerm::Decimal(match v {
            EvalTerm::Integer(n) => BigDecimal::from(n.clone()),
            EvalTerm::Decimal(n) => n.clone(),
            EvalTerm::Float(f) => BigDecimal::from_str(&f.to_string()).map_err(|_| fail())?,
            EvalTerm::Double(d) => BigDecimal::from_str(&d.to_string()).map_err(|_| fail())?,
            EvalTerm::Boolean(b) => BigDecimal::from(*b as i64),
            EvalTerm::String(s) => value::parse_xsd_decimal(s).ok_or_else(fail)?,
            _ => return Err(fail()),
        })),
        XsdCastTarget::Float => Ok(EvalTerm::Float(match v {
            EvalTerm::Integer(n) => Float::from(n.to_f32().unwrap_or(f32::NAN)),
            EvalTerm::Decimal(n) => Float::from(n.to_f32().unwrap_or(f32::NAN)),
            EvalTerm::Float(f) => *f,
            EvalTerm::Double(d) => Float::from(*d),
            EvalTerm::Boolean(b) => Float::from(*b as i8),
            EvalTerm::String(s) => Float::from_str(s).map_err(|_| fail())?,
            _ => return Err(fail()),
        })),
        XsdCastTarget::Double => Ok(EvalTerm::Double(match v {
            EvalTerm::Integer(n) => Double::from(n.to_f64().unwrap_or(f64::NAN)),
            EvalTerm::Decimal(n) => Double::from(n.to_f64().unwrap_or(f64::NAN)),
            EvalTerm::Float(f) => Double::from(*f),
            EvalTerm::Double(d) => *d,
            EvalTerm::Boolean(b) => Double::from(*b as i8),
            EvalTerm::String(s) => Double::from_str(s).map_err(|_| fail())?,
            _ => return Err(fail()),
        })),
        XsdCastTarget::DateTime => Ok(EvalTerm::DateTime(match v {
            EvalTerm::DateTime(d) => *d,
            EvalTerm::String(s) => {
                oxsdatatypes::DateTime::from_str(s).map_err(|_| fail())?
            }
            _ => return Err(fail()),
        })),
    }
}

fn cast_source_lexical(v: &EvalTerm) -> String {
    match v {
        EvalTerm::NamedNode(n) => n.as_str().to_owned(),
        EvalTerm::BlankNode(n) => n.as_str().to_owned(),
        EvalTerm::String(s) => s.clone(),
        EvalTerm::LangString { value, .. } => value.clone(),
        EvalTerm::Boolean(b) => b.to_string(),
        EvalTerm::Integer(n) => n.to_string(),
        EvalTerm::Decimal(n) => format_decimal(n),
        EvalTerm::Float(f) => f.to_string(),
        EvalTerm::Double(d) => d.to_string(),
        EvalTerm::DateTime(d) => d.to_string(),
        EvalTerm::NonLexical { lexical, .. } | EvalTerm::Other { lexical, .. } => lexical.clone(),
    }
}

fn cast_target_name(target: XsdCastTarget) -> &'static str {
    match target {
        XsdCastTarget::String => "string",
        XsdCastTarget::Boolean => "boolean",
        XsdCastTarget::Integer => "integer",
        XsdCastTarget::Decimal => "decimal",
        XsdCastTarget::Float => "float",
        XsdCastTarget::Double => "double",
        XsdCastTarget::DateTime => "dateTime",
    }
}

// ---- universal unary predicates, bypassing the table (registry.rs) -----

pub fn not(args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::Boolean(!args[0].effective_boolean_value()?))
}

pub fn is_iri(args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::Boolean(matches!(args[0], EvalTerm::NamedNode(_))))
}

pub fn is_blank(args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::Boolean(matches!(args[0], EvalTerm::BlankNode(_))))
}

pub fn is_literal(args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::Boolean(!matches!(
        args[0],
        EvalTerm::NamedNode(_) | EvalTerm::BlankNode(_)
    )))
}

pub fn is_numeric(args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::Boolean(args[0].type_tag().is_numeric()))
}

pub fn equal(args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::Boolean(value_equals(&args[0], &args[1])?))
}

pub fn not_equal(args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::Boolean(!value_equals(&args[0], &args[1])?))
}

pub fn less(args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::Boolean(
        value::compare(&args[0], &args[1])? == std::cmp::Ordering::Less,
    ))
}

pub fn greater(args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::Boolean(
        value::compare(&args[0], &args[1])? == std::cmp::Ordering::Greater,
    ))
}

pub fn less_or_equal(args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::Boolean(
        value::compare(&args[0], &args[1])? != std::cmp::Ordering::Greater,
    ))
}

pub fn greater_or_equal(args: &[EvalTerm]) -> Result<EvalTerm, EvalError> {
    Ok(EvalTerm::Boolean(
        value::compare(&args[0], &args[1])? != std::cmp::Ordering::Less,
    ))
}

