use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

pub const DOCS_TOKENIZER: &str = "docs_text";

/// Handles to the fields of the documentation schema.
#[derive(Debug, Clone, Copy)]
pub struct DocFields {
    pub id: Field,
    pub title: Field,
    pub description: Field,
    pub headings: Field,
    pub content: Field,
    pub category: Field,
}

impl DocFields {
    /// Fields searched when a query names none explicitly.
    pub fn default_fields(&self) -> Vec<Field> {
        vec![
            self.title,
            self.category,
            self.description,
            self.headings,
            self.content,
        ]
    }
}

pub fn build_schema() -> (Schema, DocFields) {
    let mut schema_builder = Schema::builder();
    let text_field_indexing = TextFieldIndexing::default()
        .set_tokenizer(DOCS_TOKENIZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
    let fields = DocFields {
        id: schema_builder.add_text_field("id", STRING | STORED),
        title: schema_builder.add_text_field("title", text_options.clone()),
        description: schema_builder.add_text_field("description", text_options.clone()),
        headings: schema_builder.add_text_field("headings", text_options.clone()),
        content: schema_builder.add_text_field("content", text_options.clone()),
        category: schema_builder.add_text_field("category", text_options),
    };
    (schema_builder.build(), fields)
}

pub fn register_tokenizer(index: &Index) {
    let stop_words = vec![
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
        "it", "its", "of", "on", "that", "the", "to", "was", "will", "with", "or", "but", "not",
        "this", "these", "they", "them", "their", "there", "then", "than", "so", "if", "when",
        "where", "why", "how", "what", "which", "who", "whom", "whose", "can", "could", "should",
        "would", "may", "might", "must", "shall", "do", "does", "did", "have", "had", "having",
    ];
    let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(
            stop_words.into_iter().map(|s| s.to_string()),
        ))
        .build();
    index.tokenizers().register(DOCS_TOKENIZER, tokenizer);
}
