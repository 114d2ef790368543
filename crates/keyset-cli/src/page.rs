//! The `page` command.

use std::io::Write;

use anyhow::{Context, anyhow};
use keyset_core::FieldFilter;
use keyset_engine::store::MemoryStore;
use keyset_engine::{EqualityFilter, PageRequest, Paginator};

use crate::config::PageArgs;
use crate::{TRACING_TARGET_PAGE, document};

/// Runs the `page` command, writing one JSON slice per line to `out`.
///
/// Returns the number of pages written.
pub async fn run_page<W: Write>(args: &PageArgs, out: &mut W) -> anyhow::Result<usize> {
    let schema = document::schema(&args.id, &args.fields)?;
    let documents = document::load(&args.input, &args.id, &args.fields).await?;

    let mut filter = FieldFilter::new();
    for spec in &args.filters {
        let field = schema
            .field(&spec.field)
            .ok_or_else(|| anyhow!("cannot filter on undeclared field '{}'", spec.field))?;
        filter.insert(spec.field.clone(), spec.value(field.kind())?);
    }
    let filter = (!filter.is_empty()).then_some(filter);

    let store = MemoryStore::with_rows(schema.clone(), documents);
    let paginator = Paginator::new(store, schema, EqualityFilter, &args.pagination)
        .context("failed to build paginator")?;

    let mut request = PageRequest::new(args.size)
        .with_optional_token(args.token.clone())
        .with_direction(args.direction);
    if let Some(sort) = &args.sort {
        request = request.with_sort(sort.as_str());
    }

    let mut pages = 0;
    loop {
        let slice = paginator
            .fetch_page(&request, filter.as_ref(), None)
            .await
            .with_context(|| format!("failed to fetch page {}", pages + 1))?;

        serde_json::to_writer(&mut *out, &slice).context("failed to write page")?;
        writeln!(out).context("failed to write page")?;
        pages += 1;

        tracing::debug!(
            target: TRACING_TARGET_PAGE,
            page = pages,
            rows = slice.number_of_elements(),
            has_next = slice.has_next(),
            "wrote page"
        );

        match slice.continuation_token() {
            Some(token) if args.all => request = request.with_token(token),
            _ => break,
        }
    }

    out.flush().context("failed to flush output")?;
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use clap::Parser;
    use keyset_core::ErrorKind;
    use serde_json::{Value as Json, json};
    use tempfile::NamedTempFile;

    use super::*;
    use crate::config::{Cli, Command};

    const SECRET: &str = "0123456789abcdef";

    fn people() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let documents = json!([
            {"id": 1, "name": "ada", "age": 36, "team": "red"},
            {"id": 2, "name": "bob", "age": 25, "team": "blue"},
            {"id": 3, "name": "cy", "age": 36, "team": "red"},
            {"id": 4, "name": "dee", "age": 41, "team": "red"},
            {"id": 5, "name": "eve", "team": "blue"},
        ]);
        write!(file, "{documents}").unwrap();
        file
    }

    fn args(file: &NamedTempFile, extra: &[&str]) -> PageArgs {
        let path = file.path().to_str().unwrap();
        let mut argv = vec![
            "keyset",
            "page",
            "--input",
            path,
            "--id",
            "id:int",
            "--field",
            "name:string",
            "--field",
            "age:int",
            "--field",
            "team:string",
            "--token-secret",
            SECRET,
            "--sortable-fields",
            "age,name",
        ];
        argv.extend_from_slice(extra);

        let Command::Page(args) = Cli::try_parse_from(argv).unwrap().command;
        args
    }

    async fn pages(args: &PageArgs) -> Vec<Json> {
        let mut out = Vec::new();
        let count = run_page(args, &mut out).await.unwrap();

        let pages: Vec<Json> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(pages.len(), count);
        pages
    }

    fn ids(page: &Json) -> Vec<i64> {
        page["content"]
            .as_array()
            .unwrap()
            .iter()
            .map(|doc| doc["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn prints_single_page() {
        let file = people();
        let pages = pages(&args(&file, &["--size", "2"])).await;

        assert_eq!(pages.len(), 1);
        assert_eq!(ids(&pages[0]), [5, 4]);
        assert_eq!(pages[0]["size"], 2);
        assert_eq!(pages[0]["hasNext"], true);
        assert!(pages[0]["continuationToken"].is_string());
    }

    #[tokio::test]
    async fn follows_tokens_with_all() {
        let file = people();
        let pages = pages(&args(
            &file,
            &["--size", "2", "--sort", "age", "--direction", "asc", "--all"],
        ))
        .await;

        let all: Vec<i64> = pages.iter().flat_map(ids).collect();
        assert_eq!(all, [5, 2, 1, 3, 4]);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2]["hasNext"], false);
        assert!(pages[2]["continuationToken"].is_null());
    }

    #[tokio::test]
    async fn resumes_from_token() {
        let file = people();
        let first = pages(&args(&file, &["--size", "3"])).await;
        let token = first[0]["continuationToken"].as_str().unwrap().to_owned();

        let rest = pages(&args(&file, &["--size", "3", "--token", &token])).await;
        assert_eq!(ids(&rest[0]), [2, 1]);
        assert_eq!(rest[0]["hasNext"], false);
    }

    #[tokio::test]
    async fn applies_equality_filters() {
        let file = people();
        let pages = pages(&args(&file, &["--where", "team=red", "--size", "2", "--all"])).await;

        let all: Vec<i64> = pages.iter().flat_map(ids).collect();
        assert_eq!(all, [4, 3, 1]);
    }

    #[tokio::test]
    async fn rejects_token_from_other_filter() {
        let file = people();
        let first = pages(&args(&file, &["--where", "team=red", "--size", "1"])).await;
        let token = first[0]["continuationToken"].as_str().unwrap().to_owned();

        let error = run_page(
            &args(&file, &["--where", "team=blue", "--size", "1", "--token", &token]),
            &mut Vec::new(),
        )
        .await
        .unwrap_err();

        let error = error.downcast_ref::<keyset_core::Error>().unwrap();
        assert_eq!(error.kind(), ErrorKind::FingerprintMismatch);
    }

    #[tokio::test]
    async fn rejects_undeclared_filter_field() {
        let file = people();
        let result = run_page(&args(&file, &["--where", "city=oslo"]), &mut Vec::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejects_unsortable_field() {
        let file = people();
        let error = run_page(&args(&file, &["--sort", "team"]), &mut Vec::new())
            .await
            .unwrap_err();

        let error = error.downcast_ref::<keyset_core::Error>().unwrap();
        assert_eq!(error.kind(), ErrorKind::InvalidRequest);
    }
}
