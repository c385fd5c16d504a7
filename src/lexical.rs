//! Rule-based polarity estimator.
//!
//! Valence lexicon lookups adjusted by booster words, nearby negations,
//! contrastive "but" and exclamation emphasis, squashed into (-1, 1) with
//! `s / sqrt(s^2 + 15)`.

use crate::result::AnalysisKind;
use crate::scorer::Scorer;
use ahash::AHashMap;
use anyhow::Result;

const NORMALIZE_ALPHA: f64 = 15.0;
const NEGATION_SCALAR: f64 = -0.74;
const BOOST_INCR: f64 = 0.293;
const BOOST_DECR: f64 = -0.293;
const EXCLAIM_INCR: f64 = 0.292;
const MAX_EXCLAIMS: usize = 4;
/// Booster effect by distance (1, 2, 3 tokens back).
const BOOST_DECAY: [f64; 3] = [1.0, 0.95, 0.9];

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "dont", "hadnt", "hasnt",
    "havent", "isnt", "mightnt", "mustnt", "neither", "never", "no", "nobody", "none", "nope", "nor",
    "not", "nothing", "nowhere", "shouldnt", "wasnt", "werent", "without", "wont", "wouldnt",
];

const BOOSTERS_UP: &[&str] = &[
    "absolutely", "amazingly", "completely", "deeply", "especially", "extremely", "fucking", "highly",
    "hella", "incredibly", "insanely", "really", "so", "super", "totally", "truly", "very", "way",
];

const BOOSTERS_DOWN: &[&str] = &[
    "almost", "barely", "hardly", "kinda", "kindof", "less", "marginally", "partly", "slightly",
    "somewhat", "sorta",
];

const LEXICON: &[(&str, f64)] = &[
    // positive
    ("amazing", 2.8), ("awesome", 3.1), ("beautiful", 2.9), ("best", 3.2), ("better", 1.9),
    ("brilliant", 2.8), ("clean", 1.7), ("cool", 1.3), ("enjoy", 2.2), ("enjoyed", 2.3),
    ("excellent", 3.2), ("excited", 1.4), ("fair", 1.3), ("fantastic", 2.6), ("fine", 0.8),
    ("fun", 2.3), ("glad", 2.0), ("good", 1.9), ("great", 3.1), ("happy", 2.7), ("helpful", 1.8),
    ("hope", 1.9), ("interesting", 1.7), ("like", 1.5), ("liked", 1.8), ("lol", 1.8), ("love", 3.2),
    ("loved", 2.9), ("lucky", 1.8), ("nice", 1.8), ("perfect", 2.7), ("pretty", 1.3), ("solid", 1.2),
    ("thank", 1.5), ("thanks", 1.9), ("win", 2.8), ("wins", 2.7), ("wonderful", 2.7), ("wow", 2.8),
    ("yay", 2.4), ("yes", 1.7), ("agree", 1.5), ("fixed", 1.1), ("finally", 0.5), ("worth", 0.9),
    ("recommend", 1.5), ("respect", 2.1), ("welcome", 2.0), ("haha", 2.0), ("lmao", 2.0),
    // negative
    ("angry", -2.3), ("annoying", -1.7), ("awful", -2.0), ("bad", -2.5), ("boring", -1.3),
    ("broken", -1.6), ("bug", -1.0), ("buggy", -1.9), ("crap", -1.6), ("dead", -3.3),
    ("disappointed", -1.9), ("disappointing", -2.2), ("dumb", -2.3), ("fail", -2.5), ("failed", -2.3),
    ("garbage", -2.2), ("hate", -2.7), ("hated", -3.2), ("horrible", -2.5), ("idiot", -2.3),
    ("lame", -1.8), ("lazy", -1.5), ("lost", -1.3), ("mad", -2.2), ("mess", -1.5), ("nerf", -1.0),
    ("pathetic", -2.4), ("problem", -1.7), ("ridiculous", -1.5), ("rip", -0.5), ("sad", -2.1),
    ("scam", -2.4), ("shit", -2.6), ("sick", -2.3), ("stupid", -2.4), ("sucks", -1.5),
    ("terrible", -2.1), ("toxic", -2.3), ("trash", -1.6), ("ugly", -2.3), ("unfair", -2.1),
    ("useless", -1.8), ("waste", -1.8), ("wasted", -2.2), ("worse", -2.1), ("worst", -3.1),
    ("wrong", -2.1), ("ugh", -1.8), ("meh", -0.3), ("cringe", -1.7), ("grind", -0.6),
    // emoji tokens produced by the normalizer
    (":grinning_face:", 2.0), (":face_with_tears_of_joy:", 2.2), (":smiling_face_with_smiling_eyes:", 2.4),
    (":red_heart:", 2.9), (":thumbs_up:", 1.9), (":fire:", 1.5), (":clapping_hands:", 2.0),
    (":thinking_face:", -0.2), (":crying_face:", -2.1), (":loudly_crying_face:", -1.9),
    (":pouting_face:", -2.6), (":angry_face:", -2.5), (":thumbs_down:", -1.9), (":skull:", -0.4),
    (":face_with_rolling_eyes:", -1.4), (":unamused_face:", -1.6),
];

/// Lexicon-based polarity scorer. Deterministic and stateless per call.
#[derive(Clone, Debug)]
pub struct LexicalScorer {
    lexicon: AHashMap<String, f64>,
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalScorer {
    pub fn new() -> Self {
        let lexicon = LEXICON.iter().map(|(w, v)| (w.to_string(), *v)).collect();
        Self { lexicon }
    }

    /// Add or override a lexicon entry. `valence` is clamped to [-4, 4].
    pub fn with_entry(mut self, word: impl AsRef<str>, valence: f64) -> Self {
        self.lexicon.insert(word.as_ref().to_lowercase(), valence.clamp(-4.0, 4.0));
        self
    }

    /// Polarity of `text` in (-1, 1); 0.0 when no token carries valence.
    pub fn polarity(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let mut valences: Vec<f64> = Vec::with_capacity(tokens.len());

        for (i, tok) in tokens.iter().enumerate() {
            let Some(&base) = self.lexicon.get(tok.as_str()) else {
                valences.push(0.0);
                continue;
            };
            let mut v = base;
            for (dist, decay) in BOOST_DECAY.iter().enumerate().map(|(d, k)| (d + 1, k)) {
                if i < dist {
                    break;
                }
                let prev = tokens[i - dist].as_str();
                let incr = if BOOSTERS_UP.contains(&prev) {
                    BOOST_INCR
                } else if BOOSTERS_DOWN.contains(&prev) {
                    BOOST_DECR
                } else {
                    continue;
                };
                v += incr * base.signum() * decay;
            }
            if tokens[i.saturating_sub(3)..i].iter().any(|t| is_negation(t)) {
                v *= NEGATION_SCALAR;
            }
            valences.push(v);
        }

        if let Some(but) = tokens.iter().position(|t| t == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < but {
                    *v *= 0.5;
                } else if i > but {
                    *v *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum == 0.0 {
            return 0.0;
        }
        let exclaims = text.matches('!').count().min(MAX_EXCLAIMS);
        sum += sum.signum() * exclaims as f64 * EXCLAIM_INCR;
        sum / (sum * sum + NORMALIZE_ALPHA).sqrt()
    }
}

impl Scorer for LexicalScorer {
    fn kind(&self) -> AnalysisKind {
        AnalysisKind::Polarity
    }

    fn score(&self, text: &str) -> Result<f64> {
        Ok(self.polarity(text))
    }
}

fn is_negation(tok: &str) -> bool {
    NEGATIONS.contains(&tok)
}

/// Lowercased word tokens. Emoji name tokens (`:name:`) are kept whole;
/// apostrophes are dropped so "don't" and "dont" look the same.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|raw| {
            let raw = raw.to_lowercase();
            if raw.len() > 2 && raw.starts_with(':') && raw.ends_with(':') {
                return Some(raw);
            }
            let tok: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
            (!tok.is_empty()).then_some(tok)
        })
        .collect()
}
