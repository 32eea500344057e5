//! Full-text matching over an in-RAM tantivy index ranked with BM25.
//!
//! Every stored document is one `(entity_type, entity_id, language)` row.
//! Queries go through [`normalize_for_fts`] and the tantivy query parser, so
//! `-term` exclusion and term conjunction are evaluated by the engine.

use std::collections::HashSet;

use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions, Value,
};
use tantivy::tokenizer::{
    AsciiFoldingFilter, LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer,
};
use tantivy::{
    Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, TantivyError, Term, doc,
};

use crate::error::BackendError;
use crate::fusion::RankedKey;
use crate::normalize::normalize_for_fts;

const TEXT_TOKENIZER: &str = "search_text";

/// Writer heap for one mutation; a single indexing thread.
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Separator for composite key terms; never produced by user ids.
const KEY_SEPARATOR: char = '\u{1f}';

/// Build the parser input for a user query.
///
/// Keeps letter/digit words only, lowercases them and drops repeats so a
/// word typed twice is scored once. `None` when nothing positive is left,
/// since an exclusion-only query matches no document.
pub(crate) fn web_query(query: &str) -> Option<String> {
    let mut seen = HashSet::new();
    let mut clauses = Vec::new();
    let mut has_positive = false;

    for token in normalize_for_fts(query).split_whitespace() {
        let (negated, body) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        for word in body
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
        {
            let word = word.to_lowercase();
            if !seen.insert((negated, word.clone())) {
                continue;
            }
            has_positive |= !negated;
            clauses.push(if negated { format!("-{word}") } else { word });
        }
    }

    has_positive.then(|| clauses.join(" "))
}

/// Map an unbounded full-text rank into `[0, 1)` monotonically: `raw / (raw + 1)`.
#[must_use]
pub fn normalize_fts_score(raw: f32) -> f32 {
    if raw <= 0.0 {
        return 0.0;
    }
    raw / (raw + 1.0)
}

fn document_key(key: &RankedKey) -> String {
    format!(
        "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
        key.entity_type, key.entity_id, key.language
    )
}

fn entity_key(entity_type: &str, entity_id: &str) -> String {
    format!("{entity_type}{KEY_SEPARATOR}{entity_id}")
}

/// BM25 index of document text.
pub(crate) struct TextIndex {
    index: Index,
    reader: IndexReader,
    document_key: Field,
    entity_key: Field,
    entity_type: Field,
    entity_id: Field,
    language: Field,
    text: Field,
}

impl TextIndex {
    pub(crate) fn new() -> Result<Self, TantivyError> {
        let mut builder = Schema::builder();
        let document_key = builder.add_text_field("document_key", STRING);
        let entity_key = builder.add_text_field("entity_key", STRING);
        let entity_type = builder.add_text_field("entity_type", STRING | STORED);
        let entity_id = builder.add_text_field("entity_id", STRING | STORED);
        let language = builder.add_text_field("language", STRING | STORED);
        let text_options = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(TEXT_TOKENIZER)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );
        let text = builder.add_text_field("text", text_options);

        let index = Index::create_in_ram(builder.build());
        let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(40))
            .filter(LowerCaser)
            .filter(AsciiFoldingFilter)
            .build();
        index.tokenizers().register(TEXT_TOKENIZER, analyzer);

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self {
            index,
            reader,
            document_key,
            entity_key,
            entity_type,
            entity_id,
            language,
            text,
        })
    }

    fn writer(&self) -> Result<IndexWriter, TantivyError> {
        self.index.writer_with_num_threads(1, WRITER_HEAP_BYTES)
    }

    fn commit(&self, writer: &mut IndexWriter) -> Result<(), TantivyError> {
        writer.commit()?;
        self.reader.reload()
    }

    /// Insert or replace the text of one document.
    pub(crate) fn upsert(&self, key: &RankedKey, text: &str) -> Result<(), TantivyError> {
        let document_key = document_key(key);
        let mut writer = self.writer()?;
        writer.delete_term(Term::from_field_text(self.document_key, &document_key));
        writer.add_document(doc!(
            self.document_key => document_key,
            self.entity_key => entity_key(&key.entity_type, &key.entity_id),
            self.entity_type => key.entity_type.as_str(),
            self.entity_id => key.entity_id.as_str(),
            self.language => key.language.as_str(),
            self.text => text
        ))?;
        self.commit(&mut writer)
    }

    /// Drop every language of one entity.
    pub(crate) fn remove_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<(), TantivyError> {
        let mut writer = self.writer()?;
        writer.delete_term(Term::from_field_text(
            self.entity_key,
            &entity_key(entity_type, entity_id),
        ));
        self.commit(&mut writer)
    }

    /// Every document of `language` matching `query`, with its raw BM25 score.
    ///
    /// Unordered; callers rank and truncate after applying their filters.
    pub(crate) fn search(
        &self,
        query: &str,
        language: &str,
    ) -> Result<Vec<(RankedKey, f32)>, BackendError> {
        let Some(query) = web_query(query) else {
            return Ok(Vec::new());
        };
        let searcher = self.reader.searcher();
        let Ok(total) = usize::try_from(searcher.num_docs()) else {
            return Err(BackendError::InvalidRequest(
                "full-text index too large".to_string(),
            ));
        };
        if total == 0 {
            return Ok(Vec::new());
        }

        let mut parser = QueryParser::for_index(&self.index, vec![self.text]);
        parser.set_conjunction_by_default();
        let parsed = parser
            .parse_query(&query)
            .map_err(|e| BackendError::InvalidRequest(format!("full-text query: {e}")))?;

        let mut matches = Vec::new();
        for (score, address) in searcher.search(&parsed, &TopDocs::with_limit(total))? {
            let document: TantivyDocument = searcher.doc(address)?;
            let field = |field: Field| {
                document
                    .get_first(field)
                    .and_then(|value| value.as_str())
                    .unwrap_or_default()
                    .to_string()
            };
            if field(self.language) != language {
                continue;
            }
            let key = RankedKey::new(
                field(self.entity_type),
                field(self.entity_id),
                field(self.language),
            );
            matches.push((key, score));
        }
        Ok(matches)
    }
}
