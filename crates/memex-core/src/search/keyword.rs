//! FTS5 keyword search (§4.5.2, full-text candidate path).

use rusqlite::Connection;

/// Sanitize a user query for safe embedding in an FTS5 MATCH expression.
///
/// FTS5's query syntax treats `"`, `-`, `(`, `)`, `*`, `:` and `^` specially.
/// Rather than trying to parse and re-escape operator syntax, each query is
/// split into bare words, each word is individually double-quoted (escaping
/// any embedded quote by doubling it per SQLite string-literal rules), and
/// the quoted words are joined with an implicit AND — this guarantees the
/// resulting string is always a valid FTS5 MATCH argument, at the cost of
/// disabling FTS5's own operator syntax for end users.
pub fn sanitize_fts5_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|word| format!("\"{}\"", word.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
pub struct KeywordHit {
    pub memory_id: String,
    pub bm25_rank: f64,
}

pub struct KeywordSearcher;

impl KeywordSearcher {
    /// Run a sanitized FTS5 query against `memories_fts`, returning ids
    /// ordered by BM25 rank (most relevant first — `bm25()` is negative, so
    /// ascending order on it is descending relevance).
    pub fn search(
        conn: &Connection,
        project_id: &str,
        query: &str,
        limit: usize,
    ) -> rusqlite::Result<Vec<KeywordHit>> {
        let sanitized = sanitize_fts5_query(query);
        if sanitized.is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(
            "SELECT m.id, bm25(memories_fts) AS rank
             FROM memories_fts
             JOIN memories m ON m.rowid = memories_fts.rowid
             WHERE memories_fts MATCH ?1 AND m.project_id = ?2 AND m.deprecated = 0
             ORDER BY rank ASC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![sanitized, project_id, limit as i64],
            |row| {
                Ok(KeywordHit {
                    memory_id: row.get(0)?,
                    bm25_rank: row.get(1)?,
                })
            },
        )?;
        rows.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_each_word_independently() {
        assert_eq!(sanitize_fts5_query("foo bar"), "\"foo\" \"bar\"");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(sanitize_fts5_query("say \"hi\""), "\"say\" \"\"\"hi\"\"\"");
    }

    #[test]
    fn operator_characters_are_defanged() {
        let sanitized = sanitize_fts5_query("foo* OR (bar)");
        assert_eq!(sanitized, "\"foo*\" \"OR\" \"(bar)\"");
    }
}
