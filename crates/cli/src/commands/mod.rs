//! Command handlers, one module per resource family
//!
//! Every handler follows the same shape: build a typed request, call the
//! service, run the response through [`proceed`], then print.

pub mod amt;
pub mod catalog;
pub mod cluster;
pub mod config;
pub mod deployment;
pub mod host;
pub mod location;
pub mod package;
pub mod tenancy;

use anyhow::{anyhow, Result};
use clap::Args;
use orch_lib::models::ListOptions;
use orch_lib::{refine, ApiResponse};
use std::collections::BTreeMap;

use crate::output::OutputFormat;

/// Per-invocation settings shared by all handlers
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project: Option<String>,
    pub format: OutputFormat,
    pub verbose: bool,
}

impl CommandContext {
    /// Project for project-scoped commands
    pub fn project(&self) -> Result<&str> {
        self.project
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                anyhow!("no project set: pass --project or run `orch-cli config set project <name>`")
            })
    }
}

/// Paging and filter flags shared by list commands
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Filter expression passed to the service
    #[arg(long)]
    pub filter: Option<String>,

    /// Sort order, e.g. "name desc"
    #[arg(long)]
    pub order_by: Option<String>,

    /// Maximum number of items to return
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Number of items to skip
    #[arg(long)]
    pub offset: Option<u32>,
}

impl From<&ListArgs> for ListOptions {
    fn from(args: &ListArgs) -> Self {
        ListOptions {
            filter: args.filter.clone(),
            order_by: args.order_by.clone(),
            page_size: args.page_size,
            offset: args.offset,
        }
    }
}

/// Decide whether to go on with a response.
///
/// In verbose mode any non-2xx status and body are echoed to stderr first.
/// Returns `Ok(false)` for 404, which callers treat as "nothing there".
pub fn proceed(ctx: &CommandContext, response: &ApiResponse, context: &str) -> Result<bool> {
    if ctx.verbose && !response.is_success() {
        eprintln!("HTTP {} {}", response.status, response.status_text);
        if !response.body.is_empty() {
            eprintln!("{}", response.body);
        }
    }

    match response.classify(ctx.verbose, context) {
        Ok(proceed) => Ok(proceed),
        Err(err) => Err(refine(err, &response.body).into()),
    }
}

/// clap value parser for `key=value` flags
pub fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected <key>=<value>, got '{}'", s)),
    }
}

/// Collect repeated `key=value` flags; later keys overwrite earlier ones
pub fn to_map(pairs: &[(String, String)]) -> BTreeMap<String, String> {
    pairs.iter().cloned().collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("app.a.b=1=2").unwrap(),
            ("app.a.b".to_string(), "1=2".to_string())
        );
        assert_eq!(parse_key_value("k=").unwrap(), ("k".to_string(), String::new()));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=v").is_err());
    }

    #[test]
    fn test_to_map_last_wins() {
        let pairs = vec![
            ("a".to_string(), "1".to_string()),
            ("a".to_string(), "2".to_string()),
        ];
        assert_eq!(to_map(&pairs).get("a").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_project_required() {
        let mut ctx = test_support::ctx();
        assert_eq!(ctx.project().unwrap(), "demo");
        ctx.project = None;
        assert!(ctx.project().unwrap_err().to_string().contains("--project"));
    }

    #[test]
    fn test_proceed_maps_statuses() {
        let ctx = test_support::ctx();
        assert!(proceed(&ctx, &test_support::ok("{}"), "ctx").unwrap());
        assert!(!proceed(&ctx, &test_support::not_found(), "ctx").unwrap());

        let err = proceed(&ctx, &ApiResponse::new(401, "Unauthorized", ""), "ctx").unwrap_err();
        assert_eq!(err.to_string(), "Unauthenticated. Please login");

        let err = proceed(
            &ctx,
            &ApiResponse::new(400, "Bad Request", r#"{"message":"name is required"}"#),
            "error creating region",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "error creating region: name is required");
    }

    #[test]
    fn test_list_args_into_options() {
        let args = ListArgs {
            filter: Some("name=x".to_string()),
            page_size: Some(5),
            ..Default::default()
        };
        let opts = ListOptions::from(&args);
        assert_eq!(opts.filter.as_deref(), Some("name=x"));
        assert_eq!(opts.page_size, Some(5));
        assert_eq!(opts.offset, None);
    }
}
