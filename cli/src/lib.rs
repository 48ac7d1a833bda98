use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use search_core::batch::{process_queries, process_queries_joined};
use search_core::dedup::remove_duplicates;
use search_core::paginator::paginate;
use search_core::{DocId, Document, DocumentStatus, ExecutionPolicy, SearchConfig, SearchServer};
use serde::Deserialize;
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct InputDoc {
    pub id: DocId,
    pub text: String,
    #[serde(default = "default_status")]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

fn default_status() -> DocumentStatus { DocumentStatus::Actual }

#[derive(Parser)]
#[command(name = "search-cli")]
#[command(about = "Query an in-memory TF-IDF document index", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct IndexArgs {
    /// Input path (JSON/JSONL file or a directory of them)
    #[arg(long)]
    pub input: String,
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    pub stop_words: String,
    /// JSON engine config; --stop-words is appended to its stop words
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Score with the parallel strategy
    #[arg(long, default_value_t = false)]
    pub parallel: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank documents for a query
    Search {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        query: String,
        #[arg(long, value_enum, default_value_t = StatusArg::Actual)]
        status: StatusArg,
        /// Results per printed page
        #[arg(long, default_value_t = 2)]
        page_size: usize,
        /// Print results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show which query words a document matches
    Match {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        query: String,
        #[arg(long)]
        id: DocId,
    },
    /// Remove documents with identical word sets
    Dedup {
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Run every query from a file, one per line
    Batch {
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long)]
        queries: PathBuf,
        /// Print one flat list instead of per-query groups
        #[arg(long, default_value_t = false)]
        joined: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

impl From<StatusArg> for DocumentStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Actual => DocumentStatus::Actual,
            StatusArg::Irrelevant => DocumentStatus::Irrelevant,
            StatusArg::Banned => DocumentStatus::Banned,
            StatusArg::Removed => DocumentStatus::Removed,
        }
    }
}

impl IndexArgs {
    fn policy(&self) -> ExecutionPolicy {
        if self.parallel { ExecutionPolicy::Parallel } else { ExecutionPolicy::Sequential }
    }

    fn config(&self) -> Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
                SearchConfig::from_json(&json)?
            }
            None => SearchConfig::default(),
        };
        config.stop_words.extend(self.stop_words.split(' ').filter(|w| !w.is_empty()).map(str::to_string));
        Ok(config)
    }

    /// Build a server from the configured input. Documents that fail to index
    /// are logged and skipped.
    pub fn build_server(&self) -> Result<SearchServer> {
        let mut server = SearchServer::with_config(self.config()?)?;
        let docs = load_documents(Path::new(&self.input))?;
        let total = docs.len();
        for doc in docs {
            if let Err(e) = server.add_document(doc.id, &doc.text, doc.status, &doc.ratings) {
                tracing::warn!(doc_id = doc.id, error = %e, "skipping document");
            }
        }
        tracing::info!(total, indexed = server.document_count(), "documents loaded");
        Ok(server)
    }
}

/// Collect input documents from a JSON/JSONL file or every such file below a
/// directory, in path order.
pub fn load_documents(input: &Path) -> Result<Vec<InputDoc>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input {} does not exist", input.display());
    }

    let mut docs = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line).with_context(|| format!("{}:{}", file.display(), n + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(File::open(file)?))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => {}
    }
    Ok(())
}

pub fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    match cli.command {
        Commands::Search { index, query, status, page_size, json } => {
            let server = index.build_server()?;
            let found = server.find_top_documents_by_status_policy(index.policy(), &query, status.into())?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&found)?)?;
                return Ok(());
            }
            print_pages(out, &found, page_size)?;
        }
        Commands::Match { index, query, id } => {
            let server = index.build_server()?;
            let (words, status) = server.match_document_policy(index.policy(), &query, id)?;
            write!(out, "{{ document_id = {id}, status = {status:?}, words =")?;
            for word in words {
                write!(out, " {word}")?;
            }
            writeln!(out, "}}")?;
        }
        Commands::Dedup { index } => {
            let mut server = index.build_server()?;
            for id in remove_duplicates(&mut server) {
                writeln!(out, "Found duplicate document id {id}")?;
            }
            writeln!(out, "{} documents left", server.document_count())?;
        }
        Commands::Batch { index, queries, joined } => {
            let server = index.build_server()?;
            let text = fs::read_to_string(&queries).with_context(|| format!("reading queries {}", queries.display()))?;
            let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
            if joined {
                for doc in process_queries_joined(&server, &lines)? {
                    writeln!(out, "{doc}")?;
                }
            } else {
                for (query, docs) in lines.iter().zip(process_queries(&server, &lines)?) {
                    writeln!(out, "{} documents for query [{query}]", docs.len())?;
                    for doc in docs {
                        writeln!(out, "{doc}")?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_pages<W: Write>(out: &mut W, docs: &[Document], page_size: usize) -> Result<()> {
    for (n, page) in paginate(docs, page_size).iter().enumerate() {
        if n > 0 {
            writeln!(out, "Page break")?;
        }
        for doc in page.items() {
            writeln!(out, "{doc}")?;
        }
    }
    Ok(())
}
