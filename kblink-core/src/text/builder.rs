use super::{Annotated, AnalysedText, Chunk, MorphoFeatures, PhraseTag, PosTag, SpanRange, Token};

/// Incremental builder for [`AnalysedText`]
///
/// Tokens are joined with single spaces, so `"Paris"` followed by `"."` yields
/// the text `"Paris ."`. Useful for adapters whose tokenizer does not keep the
/// original text, and for tests.
#[derive(Debug, Default)]
pub struct TextBuilder {
    text: String,
    language: Option<String>,
    tokens: Vec<Token>,
    chunks: Vec<Chunk>,
    sentences: Vec<SpanRange>,
    sentence_start: Option<usize>,
}

impl TextBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document language
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Append a token with an optional POS tag of unknown probability
    pub fn token(self, surface: &str, pos: Option<PosTag>) -> Self {
        let pos = pos.map(Annotated::unknown).into_iter().collect();
        self.annotated_token(surface, pos, None)
    }

    /// Append a token with explicit POS annotations and an optional lemma
    pub fn annotated_token(
        mut self,
        surface: &str,
        pos: Vec<Annotated<PosTag>>,
        lemma: Option<&str>,
    ) -> Self {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        let start = self.text.len();
        self.text.push_str(surface);
        if self.sentence_start.is_none() {
            self.sentence_start = Some(start);
        }
        let mut token = Token::new(start, self.text.len());
        token.pos = pos;
        if let Some(lemma) = lemma {
            token.morpho.push(Annotated::unknown(MorphoFeatures::lemma(lemma)));
        }
        self.tokens.push(token);
        self
    }

    /// Group the tokens `first..=last` (indices in append order) into a chunk
    pub fn chunk(mut self, first: usize, last: usize, phrase: Option<Annotated<PhraseTag>>) -> Self {
        match (self.tokens.get(first), self.tokens.get(last)) {
            (Some(a), Some(b)) if first <= last => {
                let chunk = Chunk {
                    start: a.start,
                    end: b.end,
                    phrase: phrase.into_iter().collect(),
                };
                self.chunks.push(chunk);
            }
            _ => log::warn!("ignoring chunk over invalid token range {first}..={last}"),
        }
        self
    }

    /// Close the current sentence after the last appended token
    pub fn end_sentence(mut self) -> Self {
        if let Some(start) = self.sentence_start.take() {
            self.sentences.push(SpanRange::new(start, self.text.len()));
        }
        self
    }

    /// Finish the document
    ///
    /// If any sentence was closed explicitly, trailing tokens form a last sentence.
    pub fn build(mut self) -> AnalysedText {
        if !self.sentences.is_empty() {
            self = self.end_sentence();
        }
        AnalysedText {
            text: self.text,
            language: self.language,
            sentences: self.sentences,
            chunks: self.chunks,
            tokens: self.tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_space_joined() {
        let text = TextBuilder::new()
            .language("en")
            .token("Paris", None)
            .token(".", None)
            .build();
        assert_eq!(text.text, "Paris .");
        assert_eq!(text.tokens[1].start, 6);
        assert!(text.sentences.is_empty());
        assert!(text.validate().is_ok());
    }

    #[test]
    fn test_sentences_and_chunks() {
        let text = TextBuilder::new()
            .token("New", None)
            .token("York", None)
            .chunk(0, 1, None)
            .token(".", None)
            .end_sentence()
            .token("Hi", None)
            .build();
        assert_eq!(text.sentences.len(), 2);
        assert_eq!(text.span_text(text.sentences[1].start, text.sentences[1].end), "Hi");
        assert_eq!(text.span_text(text.chunks[0].start, text.chunks[0].end), "New York");
    }
}
