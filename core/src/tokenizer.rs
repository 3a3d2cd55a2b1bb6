use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Identifies the stopword list and stemmer an index was built with.
pub const NORMALIZER_VERSION: &str = "nltk-english-stopwords/snowball-english";

lazy_static! {
    // Letter/digit runs; a trailing clitic ("'s", "'t") is matched as its own token.
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}]+|['’]\p{L}+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","ain","all","am","an","and","any","are","aren","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","couldn",
            "d","did","didn","do","does","doesn","doing","don","down","during",
            "each","few","for","from","further",
            "had","hadn","has","hasn","have","haven","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","it","its","itself",
            "just","ll","m","ma","me","mightn","more","most","mustn","my","myself",
            "needn","no","nor","not","now",
            "o","of","off","on","once","only","or","other","our","ours","ourselves","out","over","own",
            "re","s","same","shan","she","should","shouldn","so","some","such",
            "t","than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","we","were","weren","what","when","where","which","while","who","whom","why","will","with","won","wouldn",
            "y","you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

fn is_alphanumeric(token: &str) -> bool { token.chars().all(char::is_alphanumeric) }

/// Upper bound on stemmer passes; real words settle within two or three.
const MAX_STEM_PASSES: usize = 8;

/// Stem until the stemmer stops changing the token, so every emitted term is
/// its own stem ("universal" -> "univers" -> "univ").
fn stem_fixed(token: &str) -> String {
    let mut current = token.to_string();
    for _ in 0..MAX_STEM_PASSES {
        let next = STEMMER.stem(&current);
        if next == current {
            break;
        }
        current = next.into_owned();
    }
    current
}

/// Normalize text into index terms: NFKC + lowercase, word split, drop
/// non-alphanumeric tokens and stopwords, then stem. Stems that land on a
/// stopword ("overs" -> "over") are dropped too, so normalizing the joined
/// output again gives the same terms. Order and duplicates are kept.
pub fn normalize(text: &str) -> Vec<String> {
    let lowered = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&lowered)
        .map(|mat| mat.as_str())
        .filter(|token| is_alphanumeric(token) && !is_stopword(token))
        .map(stem_fixed)
        .filter(|stem| !is_stopword(stem))
        .collect()
}
