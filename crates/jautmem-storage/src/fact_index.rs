use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::doc;
use tantivy::query::{BooleanQuery, ConstScoreQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, STORED, STRING, Schema, TEXT, Value};
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

/// Heap budget used by [`FactIndex::in_memory`].
const IN_MEMORY_WRITER_HEAP: usize = 15_000_000;

#[derive(Debug, Clone)]
pub struct IndexableFact {
    pub id: String,
    pub agent: String,
    pub category: String,
    pub content: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub fact_id: String,
    pub score: f32,
    pub created_at: i64,
}

/// Full-text index over fact content, partitioned by agent.
///
/// Rankings depend only on the indexed facts: BM25 score first, then newest
/// first, then fact id.
pub struct FactIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<Mutex<IndexWriter>>,
    fact_id_field: Field,
    agent_field: Field,
    category_field: Field,
    content_field: Field,
    created_at_field: Field,
}

impl FactIndex {
    pub fn open(path: &Path, writer_heap_bytes: usize) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create index dir: {}", path.display()))?;

        let schema = build_schema();
        let index = Index::open_in_dir(path).or_else(|_| Index::create_in_dir(path, schema))?;
        Self::from_index(index, writer_heap_bytes)
    }

    pub fn in_memory() -> Result<Self> {
        let schema = build_schema();
        let index = Index::create_in_ram(schema);
        Self::from_index(index, IN_MEMORY_WRITER_HEAP)
    }

    pub fn doc_count(&self) -> Result<u64> {
        Ok(self.reader.searcher().num_docs())
    }

    /// Upsert one fact and make it visible to the next search.
    pub fn index_fact(&self, fact: &IndexableFact) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.delete_term(Term::from_field_text(self.fact_id_field, &fact.id));
        writer.add_document(self.to_document(fact.clone()))?;
        writer.commit()?;
        self.reader.reload()?;
        Ok(())
    }

    /// Split free text into index terms using the content field's tokenizer.
    pub fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let mut analyzer = self.index.tokenizer_for_field(self.content_field)?;
        let mut stream = analyzer.token_stream(text);
        let mut terms = BTreeSet::new();
        while stream.advance() {
            terms.insert(stream.token().text.clone());
        }
        Ok(terms.into_iter().collect())
    }

    /// Rank facts in the given partitions against the query text.
    ///
    /// Any query term may match. Returns an empty list for an empty query,
    /// no partitions, or `limit == 0`.
    pub fn search(&self, query: &str, partitions: &[&str], limit: usize) -> Result<Vec<SearchHit>> {
        let terms = self.tokenize(query)?;
        if terms.is_empty() || partitions.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let total_docs = searcher.num_docs();
        if total_docs == 0 {
            return Ok(Vec::new());
        }

        let text_clauses: Vec<(Occur, Box<dyn Query>)> = terms
            .iter()
            .map(|term| {
                let term = Term::from_field_text(self.content_field, term);
                let query: Box<dyn Query> =
                    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                (Occur::Should, query)
            })
            .collect();

        let partition_clauses: Vec<(Occur, Box<dyn Query>)> = partitions
            .iter()
            .map(|partition| {
                let term = Term::from_field_text(self.agent_field, partition);
                let query: Box<dyn Query> =
                    Box::new(TermQuery::new(term, IndexRecordOption::Basic));
                (Occur::Should, query)
            })
            .collect();

        // Partition membership filters but must not shift relevance.
        let partition_filter = ConstScoreQuery::new(Box::new(BooleanQuery::new(partition_clauses)), 0.0);

        let combined = BooleanQuery::new(vec![
            (Occur::Must, Box::new(BooleanQuery::new(text_clauses)) as Box<dyn Query>),
            (Occur::Must, Box::new(partition_filter)),
        ]);

        // Rank the whole match set so ties at the cut-off resolve deterministically.
        let top_docs = searcher.search(&combined, &TopDocs::with_limit(total_docs as usize))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let document: TantivyDocument = searcher.doc(address)?;
            let Some(fact_id) = document
                .get_first(self.fact_id_field)
                .and_then(|value| value.as_str())
            else {
                continue;
            };
            let created_at = document
                .get_first(self.created_at_field)
                .and_then(|value| value.as_i64())
                .unwrap_or(0);
            hits.push(SearchHit {
                fact_id: fact_id.to_string(),
                score,
                created_at,
            });
        }

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.fact_id.cmp(&b.fact_id))
        });
        hits.truncate(limit);

        Ok(hits)
    }

    /// Drop every document and repopulate from `facts` in a single commit.
    ///
    /// Readers observe either the previous index or the rebuilt one.
    pub fn rebuild<I>(&self, facts: I) -> Result<usize>
    where
        I: IntoIterator<Item = IndexableFact>,
    {
        let mut writer = self.writer.lock();
        writer.delete_all_documents()?;

        let mut count = 0usize;
        for fact in facts {
            writer.add_document(self.to_document(fact))?;
            count += 1;
        }

        writer.commit()?;
        self.reader.reload()?;
        Ok(count)
    }

    fn to_document(&self, fact: IndexableFact) -> TantivyDocument {
        doc!(
            self.fact_id_field => fact.id,
            self.agent_field => fact.agent,
            self.category_field => fact.category,
            self.content_field => fact.content,
            self.created_at_field => fact.created_at,
        )
    }

    fn from_index(index: Index, writer_heap_bytes: usize) -> Result<Self> {
        let schema = index.schema();
        let fact_id_field = schema
            .get_field("fact_id")
            .context("missing fact_id field in index schema")?;
        let agent_field = schema
            .get_field("agent")
            .context("missing agent field in index schema")?;
        let category_field = schema
            .get_field("category")
            .context("missing category field in index schema")?;
        let content_field = schema
            .get_field("content")
            .context("missing content field in index schema")?;
        let created_at_field = schema
            .get_field("created_at")
            .context("missing created_at field in index schema")?;

        let writer = index.writer(writer_heap_bytes)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(Mutex::new(writer)),
            fact_id_field,
            agent_field,
            category_field,
            content_field,
            created_at_field,
        })
    }
}

fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    schema_builder.add_text_field("fact_id", STRING | STORED);
    schema_builder.add_text_field("agent", STRING);
    schema_builder.add_text_field("category", STRING | STORED);
    schema_builder.add_text_field("content", TEXT);
    schema_builder.add_i64_field("created_at", STORED);
    schema_builder.build()
}
