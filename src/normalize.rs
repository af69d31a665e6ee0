//! Input Normalization
//!
//! Canonicalizes untrusted input before pattern matching so that
//! encoding-based evasions (escaped characters, alternate quote glyphs,
//! UTF-7 escape sequences, SQL keyword noise) collapse into the form the
//! rule patterns target.
//!
//! The pipeline is an ordered list of substitution rules, applied strictly
//! in registration order; within one rule all occurrences in the current
//! string are replaced before the next rule runs. Order matters: later
//! rules operate on the output of earlier ones (UTF-7 escapes are decoded
//! before the generic hex/entity decode rules run). This is a best-effort,
//! single-pass-per-rule canonicalizer, not a complete decoder; in
//! particular, percent-decoding of printable characters is out of scope.

use regex::{NoExpand, Regex};

/// One substitution rule in the pipeline.
enum Rewrite {
    /// Replace every occurrence of a literal needle.
    Literal { from: String, to: String },
    /// Replace every occurrence of a literal needle, ignoring case.
    IgnoreCase { pattern: Regex, to: String },
}

/// Ordered text-canonicalization pipeline.
///
/// Assembled once and reused for every query. Stateless with respect to a
/// single transformation; applying it allocates only the transformed
/// string, so one instance may serve any number of concurrent queries.
pub struct Normalizer {
    rewrites: Vec<Rewrite>,
}

impl Normalizer {
    pub fn new() -> Self {
        let mut pipeline = Self {
            rewrites: Vec::with_capacity(1152),
        };
        pipeline.install_line_breaks();
        pipeline.install_quote_glyphs();
        pipeline.install_utf7_escapes();
        pipeline.install_char_decodes();
        pipeline.install_sql_foldings();
        pipeline.install_encoded_controls();
        pipeline
    }

    /// Apply the full pipeline to `input`, returning the canonical form.
    pub fn apply(&self, input: &str) -> String {
        let mut text = input.to_string();
        for rewrite in &self.rewrites {
            match rewrite {
                Rewrite::Literal { from, to } => {
                    if text.contains(from.as_str()) {
                        text = text.replace(from.as_str(), to);
                    }
                }
                Rewrite::IgnoreCase { pattern, to } => {
                    if pattern.is_match(&text) {
                        text = pattern.replace_all(&text, NoExpand(to)).into_owned();
                    }
                }
            }
        }
        text
    }

    fn literal(&mut self, from: impl Into<String>, to: &str) {
        self.rewrites.push(Rewrite::Literal {
            from: from.into(),
            to: to.to_string(),
        });
    }

    fn ignore_case(&mut self, from: &str, to: &str) {
        let pattern = Regex::new(&format!("(?i){}", regex::escape(from))).unwrap();
        self.rewrites.push(Rewrite::IgnoreCase {
            pattern,
            to: to.to_string(),
        });
    }

    /// Line breaks and control characters become statement separators,
    /// defeating whitespace-based statement splitting.
    fn install_line_breaks(&mut self) {
        self.literal("\r", ";");
        self.literal("\n", ";");
        self.literal("\x0c", ";");
        self.literal("\t", ";");
        self.literal("\x0b", ";");
    }

    /// Alternate quote glyphs fold to a canonical double quote.
    fn install_quote_glyphs(&mut self) {
        self.literal("'", "\"");
        self.literal("`", "\"");
        self.literal("´", "\"");
        self.literal("’", "\"");
        self.literal("‘", "\"");
    }

    /// Legacy 7-bit-safe (UTF-7) escape sequences for punctuation.
    fn install_utf7_escapes(&mut self) {
        self.literal("+ACI-", "\"");
        self.literal("+ADw-", "<");
        self.literal("+AD4-", ">");
        self.literal("+AFs-", "[");
        self.literal("+AF0-", "]");
        self.literal("+AHs-", "{");
        self.literal("+AH0-", "}");
        self.literal("+AFw-", "\\");
        self.literal("+ADs-", ";");
        self.literal("+ACM-", "#");
        self.literal("+ACY-", "&");
        self.literal("+ACU-", "%");
        self.literal("+ACQ-", "$");
        self.literal("+AD0-", "=");
        self.literal("+AGA-", "`");
        self.literal("+ALQ-", "\"");
        self.literal("+IBg-", "\"");
        self.literal("+IBk-", "\"");
        self.literal("+AHw-", "|");
        self.literal("+ACo-", "*");
        self.literal("+AF4-", "^");
        self.literal("+ACIAPg-", "\">");
        self.literal("+ACIAPgA8-", "\">");
    }

    /// Escaped and entity-encoded representations of every printable ASCII
    /// character decode to the literal character: backslash-octal,
    /// backslash-hex and `0x`-hex in both cases with and without zero
    /// padding, and decimal/hex numeric character references.
    fn install_char_decodes(&mut self) {
        for code in 33u8..=126 {
            let ch = (code as char).to_string();
            self.literal(format!("\\{code:o}"), &ch);
            self.literal(format!("\\x{code:x}"), &ch);
            self.literal(format!("\\x000000{code:x}"), &ch);
            self.literal(format!("\\x{code:X}"), &ch);
            self.literal(format!("\\x000000{code:X}"), &ch);
            self.literal(format!("0x{code:x}"), &ch);
            self.literal(format!("0x000000{code:x}"), &ch);
            self.literal(format!("0x{code:X}"), &ch);
            self.literal(format!("0x000000{code:X}"), &ch);
            self.literal(format!("&#{code};"), &ch);
            self.literal(format!("&#x{code:x};"), &ch);
        }
    }

    /// SQL keyword foldings, collapsing injection idioms toward a
    /// canonical comparison form. `is null` must precede `null` and `is`.
    fn install_sql_foldings(&mut self) {
        self.ignore_case("is null", "=0");
        self.ignore_case("like null", "=0");
        self.ignore_case("utc_time", "");
        self.ignore_case("null", "");
        self.ignore_case("true", "");
        self.ignore_case("false", "");
        self.ignore_case("localtime", "");
        self.ignore_case("stamp", "");
        self.ignore_case("binary", "");
        self.ignore_case("ascii", "");
        self.ignore_case("soundex", "");
        self.ignore_case("md5", "");
        self.ignore_case("between", "=");
        self.ignore_case("is", "=");
        self.ignore_case("not in", "=");
        self.ignore_case("xor", "=");
        self.ignore_case("rlike", "=");
        self.ignore_case("regexp", "=");
        self.ignore_case("sounds like", "=");
    }

    /// URL-encoded control characters (%00 through %13) fold to a single
    /// canonical marker.
    fn install_encoded_controls(&mut self) {
        for code in 0u8..20 {
            self.ignore_case(&format!("%{code:02x}"), "%00");
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
