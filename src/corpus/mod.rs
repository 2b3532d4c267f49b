use cgisf_lib::cgisf;
use include_dir::{include_dir, Dir};
use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{Error, Result};

static CORPUS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/corpus");

const BUILTIN_FILE: &str = "english.json";

#[derive(Deserialize, Debug)]
struct CorpusFile {
    sentences: Vec<String>,
}

/// Where target texts come from
#[derive(Debug, Clone, PartialEq)]
pub enum Corpus {
    /// A fixed, non-empty set of sentences picked uniformly at random
    Fixed(Vec<String>),
    /// Grammatical nonsense sentences generated on every pick
    Generated,
}

impl Corpus {
    /// The sentences shipped with the binary
    pub fn builtin() -> Result<Self> {
        let file = CORPUS_DIR
            .get_file(BUILTIN_FILE)
            .and_then(|f| f.contents_utf8())
            .ok_or(Error::EmptyCorpus)?;

        let parsed: CorpusFile = serde_json::from_str(file)?;
        Self::from_sentences(parsed.sentences)
    }

    /// Load a JSON array of sentences from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let sentences: Vec<String> = serde_json::from_slice(&bytes)?;
        Self::from_sentences(sentences)
    }

    pub fn from_sentences<I, S>(sentences: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sentences = sentences
            .into_iter()
            .map(Into::into)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>();

        if sentences.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        Ok(Corpus::Fixed(sentences))
    }

    /// A corpus holding exactly one user supplied prompt
    pub fn single(prompt: &str) -> Result<Self> {
        if prompt.trim().is_empty() {
            return Err(Error::EmptyPrompt);
        }
        Ok(Corpus::Fixed(vec![prompt.trim().to_string()]))
    }

    pub fn select_random_text(&self) -> String {
        let rng = &mut rand::thread_rng();
        match self {
            Corpus::Fixed(sentences) => sentences
                .choose(rng)
                .cloned()
                .unwrap_or_default(),
            Corpus::Generated => generate_sentence(rng),
        }
    }

    pub fn len(&self) -> Option<usize> {
        match self {
            Corpus::Fixed(sentences) => Some(sentences.len()),
            Corpus::Generated => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }
}

fn generate_sentence<R: Rng>(rng: &mut R) -> String {
    let s = cgisf(
        rng.gen_range(1..3),
        rng.gen_range(1..3),
        rng.gen_range(1..5),
        rng.gen_bool(0.5),
        rng.gen_range(1..3),
        rng.gen_bool(0.5),
    );
    s.trim().to_string()
}
