//! Database schema definitions
//!
//! All DDL lives here. Every statement is `IF NOT EXISTS` so schema setup
//! can run on every start.

/// Schema statements, executed in order
pub const SCHEMA_SQL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS documents (
        id SERIAL PRIMARY KEY,
        url TEXT UNIQUE NOT NULL,
        title TEXT,
        content TEXT,
        created_at TIMESTAMP DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS words (
        id SERIAL PRIMARY KEY,
        word VARCHAR(32) UNIQUE NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS document_words (
        document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
        word_id INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
        frequency INTEGER NOT NULL CHECK (frequency > 0),
        PRIMARY KEY (document_id, word_id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_document_words_word ON document_words(word_id)",
];
