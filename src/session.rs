//! One interactive session: owned conversation, planner, executor, and the
//! read-eval-print loop that drives them.

use anyhow::Result;
use sqlformat::{FormatOptions, QueryParams, format};
use std::io::{BufRead, Write};
use std::path::Path;
use uuid::Uuid;

use crate::config::Settings;
use crate::services::agent::{CompletionProvider, LlmProvider};
use crate::services::database::DatabaseManager;
use crate::services::executor::{ExecutionResult, QueryExecutor, ResultSet, render_result};
use crate::services::export::export_to_path;
use crate::services::planner::{Conversation, QueryPlan, QueryPlanner};
use crate::services::retrieval::{Document, LexicalRetriever, Retriever, load_markdown_documents};

pub const BANNER: &str = r#"
Northwind NL->SQL assistant
Type a question (or 'quit'). Examples:
- Which customers ordered the most in 1997?
- What are the top 3 selling product categories in France?
- How many suppliers are based in the UK?
- What is the total revenue in Q2 1997?
Commands: :clear resets the conversation, :export <file.csv|file.json> saves the last result.
"#;

pub struct Session<R = LexicalRetriever, C = LlmProvider> {
    id: Uuid,
    planner: QueryPlanner<R, C>,
    executor: QueryExecutor,
    db: DatabaseManager,
    conversation: Conversation,
    last_result: Option<ResultSet>,
}

impl Session {
    /// Connect the database, index docs and schema, and build the provider.
    pub async fn open(settings: &Settings) -> Result<Self> {
        let db = DatabaseManager::new();
        db.connect(&settings.db_path).await?;

        let mut documents = load_markdown_documents(&settings.docs_dir).await?;
        documents.extend(schema_documents(&db).await?);
        let retriever = LexicalRetriever::from_documents(&documents);
        tracing::info!("Retriever ready with {} chunks", retriever.len());

        let provider = LlmProvider::from_settings(settings)?;
        tracing::info!("Using completion provider {}", provider.describe());

        let planner = QueryPlanner::new(retriever, provider)
            .with_top_k(settings.retrieval_k)
            .with_dialect(settings.sql_dialect.clone())
            .with_timeout(settings.completion_timeout());

        Ok(Session::new(planner, db))
    }
}

impl<R, C> Session<R, C>
where
    R: Retriever,
    C: CompletionProvider,
{
    pub fn new(planner: QueryPlanner<R, C>, db: DatabaseManager) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(session = %id, "Session started");
        Self {
            id,
            planner,
            executor: QueryExecutor::new(db.clone()),
            db,
            conversation: Conversation::new(),
            last_result: None,
        }
    }

    pub async fn plan(&mut self, question: &str) -> QueryPlan {
        self.planner.plan(question, &mut self.conversation).await
    }

    /// Run SQL, remembering the result for `:export` when it has rows.
    pub async fn execute(&mut self, sql: &str) -> ExecutionResult {
        let result = self.executor.execute(sql).await;
        if let ExecutionResult::Rows(set) = &result {
            self.last_result = Some(set.clone());
        }
        result
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn clear_conversation(&mut self) {
        self.conversation.clear();
    }

    pub fn last_result(&self) -> Option<&ResultSet> {
        self.last_result.as_ref()
    }

    pub async fn close(self) -> Result<()> {
        tracing::info!(session = %self.id, turns = self.conversation.len(), "Session closed");
        if self.db.is_connected().await {
            self.db.disconnect().await?;
        }
        Ok(())
    }
}

/// Each table and view as a retrievable snippet tagged `schema:<name>`.
async fn schema_documents(db: &DatabaseManager) -> Result<Vec<Document>> {
    Ok(db
        .database_schema()
        .await?
        .iter()
        .map(|schema| Document::new(schema.describe(), format!("schema:{}", schema.table_name)))
        .collect())
}

pub fn pretty_sql(sql: &str) -> String {
    format(sql, &QueryParams::None, &FormatOptions::default())
}

/// Read questions from `input` until EOF or `quit`/`exit`.
///
/// A plan that asks for clarification gets exactly one follow-up prompt;
/// the answer is appended to the original question and planned again.
pub async fn run_repl<R, C, I, W>(session: &mut Session<R, C>, input: &mut I, out: &mut W) -> Result<()>
where
    R: Retriever,
    C: CompletionProvider,
    I: BufRead,
    W: Write,
{
    writeln!(out, "{}", BANNER)?;

    loop {
        let Some(question) = prompt_line(input, out, "\nYour question> ")? else {
            break;
        };
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "quit" | "exit") {
            writeln!(out, "Bye.")?;
            break;
        }
        if question == ":clear" {
            session.clear_conversation();
            writeln!(out, "Conversation cleared.")?;
            continue;
        }
        if let Some(path) = question
            .strip_prefix(":export")
            .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            export_last(session, path.trim(), out).await?;
            continue;
        }

        let mut plan = session.plan(&question).await;
        if plan.needs_clarification {
            writeln!(out, "\nClarification needed: {}", plan.question_for_user())?;
            let Some(follow) = prompt_line(input, out, "Your answer> ")? else {
                break;
            };
            let augmented = format!("{} Additional details: {}", question, follow);
            plan = session.plan(&augmented).await;
        }

        let Some(sql) = plan.usable_sql() else {
            writeln!(out, "\nNo SQL generated. Reasoning: {}", plan.reasoning)?;
            continue;
        };

        writeln!(out, "\nSQL generated:\n\n{}\n", pretty_sql(sql))?;
        let result = session.execute(sql).await;
        writeln!(out, "{}", render_result(&result))?;
    }

    Ok(())
}

async fn export_last<R, C, W>(session: &Session<R, C>, path: &str, out: &mut W) -> Result<()>
where
    R: Retriever,
    C: CompletionProvider,
    W: Write,
{
    if path.is_empty() {
        writeln!(out, "Usage: :export <file.csv|file.json>")?;
        return Ok(());
    }
    let Some(result) = session.last_result() else {
        writeln!(out, "Nothing to export yet.")?;
        return Ok(());
    };

    match export_to_path(result, Path::new(path)).await {
        Ok(()) => writeln!(out, "Exported {} rows to {}", result.row_count, path)?,
        Err(e) => writeln!(out, "**ERROR**: {}", e)?,
    }
    Ok(())
}

/// Print `prompt`, read one trimmed line. `None` on EOF.
fn prompt_line<I: BufRead, W: Write>(input: &mut I, out: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(out, "{}", prompt)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
