//! Attribute parsing for the Record derive macro.
//!
//! Parses the `#[record(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Ident, Lit, Meta, Result, Token,
};

/// Declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `#[record(String)]`
    String,
    /// `#[record(Number)]`
    Number,
    /// `#[record(Timestamp)]`
    Timestamp,
    /// `#[record(Bool)]`
    Bool,
}

const EXPECTED: &str = "String, Number, Timestamp, Bool";

impl FieldKind {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "String" | "string" => Some(FieldKind::String),
            "Number" | "number" => Some(FieldKind::Number),
            "Timestamp" | "timestamp" | "temporal" | "datetime" => Some(FieldKind::Timestamp),
            "Bool" | "bool" | "boolean" => Some(FieldKind::Bool),
            _ => None,
        }
    }

    pub fn from_ident(ident: &Ident) -> Result<Self> {
        let name = ident.to_string();
        FieldKind::parse(&name).ok_or_else(|| {
            Error::new(
                ident.span(),
                format!("unknown record field type '{name}'. Expected one of: {EXPECTED}"),
            )
        })
    }

    /// Parses `ty = "..."`, which also accepts names that are keywords.
    pub fn from_str(s: &str, span: Span) -> Result<Self> {
        FieldKind::parse(s).ok_or_else(|| {
            Error::new(
                span,
                format!("unknown record field type '{s}'. Expected one of: {EXPECTED}"),
            )
        })
    }

    /// Name of the matching `pagesift::FieldType` variant.
    pub fn variant(self) -> &'static str {
        match self {
            FieldKind::String => "String",
            FieldKind::Number => "Number",
            FieldKind::Timestamp => "Timestamp",
            FieldKind::Bool => "Bool",
        }
    }
}

/// Field-level attributes from `#[record(...)]`.
#[derive(Debug, Clone, Default)]
pub struct RecordAttr {
    pub kind: Option<FieldKind>,
    pub skip: bool,
    /// Field name used in filters and sorts (default: the Rust field name).
    pub rename: Option<String>,
}

impl Parse for RecordAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = RecordAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.kind = Some(FieldKind::from_ident(ident)?);
                    } else {
                        return Err(Error::new(
                            p.span(),
                            format!("expected a field type ({EXPECTED}) or skip"),
                        ));
                    }
                }

                Meta::NameValue(nv) => {
                    let value = match &nv.value {
                        syn::Expr::Lit(syn::ExprLit {
                            lit: Lit::Str(s), ..
                        }) => s,
                        other => {
                            return Err(Error::new(other.span(), "expected a string literal"));
                        }
                    };
                    if nv.path.is_ident("rename") {
                        attr.rename = Some(value.value());
                    } else if nv.path.is_ident("ty") {
                        attr.kind = Some(FieldKind::from_str(&value.value(), value.span())?);
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown attribute. Expected: rename or ty",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        format!(
                            "unknown record attribute. Expected: {EXPECTED}, skip, \
                             rename = \"...\", or ty = \"...\""
                        ),
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extracts the `#[record(...)]` attribute of a field.
pub fn parse_record_attrs(attrs: &[Attribute]) -> Result<RecordAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<RecordAttr>();
        }
    }
    Ok(RecordAttr::default())
}
