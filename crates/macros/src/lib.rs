// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! *Part of the wider TimelineBuilder project*
//!
//! This crate contains the TimelineBuilder procedural macros
//!

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, ExprLit, ExprUnary, Lit, Token, UnOp};

/// Parse the comma separated integer literals passed to a macro
fn parse_integers(input: TokenStream) -> Result<Vec<(i64, proc_macro2::Span)>, syn::Error> {
    let exprs = Punctuated::<Expr, Token![,]>::parse_terminated.parse(input)?;
    exprs.iter().map(integer_literal).collect()
}

/// Evaluate an integer literal, optionally negated (e.g. `-40`)
fn integer_literal(expr: &Expr) -> Result<(i64, proc_macro2::Span), syn::Error> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(lit), ..
        }) => Ok((lit.base10_parse::<i64>()?, expr.span())),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => integer_literal(inner).map(|(value, _)| (-value, expr.span())),
        _ => Err(syn::Error::new(
            expr.span(),
            "Expected an integer literal",
        )),
    }
}

/// Check that a field fits between `min` and `max`
fn bounded(
    (value, span): (i64, proc_macro2::Span),
    field: &str,
    min: i64,
    max: i64,
) -> Result<i64, syn::Error> {
    if value < min || value > max {
        Err(syn::Error::new(
            span,
            format!("{field} must be between {min} and {max}"),
        ))
    } else {
        Ok(value)
    }
}

/// Generate the date with compile time checking of its fields
fn generate_date(input: TokenStream) -> Result<proc_macro2::TokenStream, syn::Error> {
    let fields = parse_integers(input)?;
    if fields.is_empty() || fields.len() > 3 {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "Expected `year`, `year, month` or `year, month, day`",
        ));
    }

    let year = fields[0].0;
    let month = match fields.get(1) {
        Some(field) => bounded(*field, "Month", 0, u16::MAX as i64)? as u16,
        None => 0,
    };
    let day = match fields.get(2) {
        Some(field) => bounded(*field, "Day", 0, u16::MAX as i64)? as u16,
        None => 0,
    };
    if day > 0 && month == 0 {
        return Err(syn::Error::new(
            fields[2].1,
            "A day can't be set without also setting the month",
        ));
    }

    Ok(quote! {
        Date::new(#year, #month, #day)
    })
}

/// Generate the season date with compile time checking of its fields
fn generate_season_date(input: TokenStream) -> Result<proc_macro2::TokenStream, syn::Error> {
    let fields = parse_integers(input)?;
    if fields.len() != 2 {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "Expected `year, season`",
        ));
    }
    let year = fields[0].0;
    let season = bounded(fields[1], "Season", 1, u8::MAX as i64)? as u8;

    Ok(quote! {
        Date::with_season(#year, #season)
    })
}

/// Create a `Date`, using `date!(year)`, `date!(year, month)` or
/// `date!(year, month, day)`, with compile time checking of the fields.
#[proc_macro]
pub fn date(input: TokenStream) -> TokenStream {
    generate_date(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Create a season precision `Date`, using `season_date!(year, season)`, with
/// compile time checking of the fields.
#[proc_macro]
pub fn season_date(input: TokenStream) -> TokenStream {
    generate_season_date(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
