//! `arks query`

use anyhow::{Context, Result};
use arks_core::{FsQuerier, Querier};
use arks_schema::Request;
use std::path::PathBuf;

/// Resolve one identifier and print its target.
pub async fn query(port: PathBuf, id: &str) -> Result<()> {
    let request = Request::parse(id).with_context(|| format!("Invalid identifier '{id}'"))?;
    let querier = FsQuerier::new(port);
    let item = super::blocking(move || Ok(querier.query(&request)?)).await?;
    println!("{}", item.target);
    Ok(())
}
