use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 語彙の難易度レベル
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyLevel {
    Intermediate,
    Advanced,
    Expert,
}

/// 語彙のカテゴリ
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyCategory {
    Academic,
    Business,
    Scientific,
    Literary,
    General,
}

/// 全レベル（走査順）
pub const LEVELS: [VocabularyLevel; 3] = [
    VocabularyLevel::Intermediate,
    VocabularyLevel::Advanced,
    VocabularyLevel::Expert,
];

/// 全カテゴリ（走査順）
pub const CATEGORIES: [VocabularyCategory; 5] = [
    VocabularyCategory::Academic,
    VocabularyCategory::Business,
    VocabularyCategory::Scientific,
    VocabularyCategory::Literary,
    VocabularyCategory::General,
];

struct CatalogueBucket {
    level: VocabularyLevel,
    category: VocabularyCategory,
    weight: u32,
    words: &'static [&'static str],
}

/// 組み込み語彙カタログ
///
/// (レベル × カテゴリ) ごとの単語表を起動時に一度だけ構築する、
/// 不変の重み付きルックアップテーブル。実行中に変更されることはなく、
/// 参照でWordSelectorに渡して使う。
///
/// 重みはレベルに付く。中級語を最も引きやすくし、上級・最上級は
/// 出現頻度を下げる。
pub struct WordCatalogue {
    buckets: Vec<CatalogueBucket>,
}

impl WordCatalogue {
    pub fn new() -> Self {
        let mut buckets = Vec::new();
        for &level in &LEVELS {
            for &category in &CATEGORIES {
                buckets.push(CatalogueBucket {
                    level,
                    category,
                    weight: level_weight(level),
                    words: bucket_words(level, category),
                });
            }
        }
        Self { buckets }
    }

    /// 指定バケットから単語を抽出（重複なし）
    ///
    /// バケットの語数が `count` に満たない場合は全語を返す。
    pub fn batch<R: Rng>(
        &self,
        level: VocabularyLevel,
        category: VocabularyCategory,
        count: usize,
        rng: &mut R,
    ) -> Vec<String> {
        self.buckets
            .iter()
            .find(|b| b.level == level && b.category == category)
            .map(|b| {
                b.words
                    .choose_multiple(rng, count)
                    .map(|w| w.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 重み付きでレベル・カテゴリを横断した抽出
    ///
    /// バケットを重みに従って選び、1語ずつ引く。結果に同じ単語は
    /// 含まれない。カタログの語数を超える要求では少なく返る。
    pub fn random_mixed<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<String> {
        let mut picked = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        // 有限のカタログなので打ち切り回数で頭打ちにする
        let max_draws = count.saturating_mul(10).max(50);
        for _ in 0..max_draws {
            if picked.len() >= count {
                break;
            }
            let bucket = match self.buckets.choose_weighted(rng, |b| b.weight) {
                Ok(bucket) => bucket,
                Err(_) => break,
            };
            if let Some(&word) = bucket.words.choose(rng) {
                if seen.insert(word.to_lowercase()) {
                    picked.push(word.to_string());
                }
            }
        }

        picked
    }

    /// 最終手段の固定語彙
    ///
    /// カタログからの抽出が全滅したときに呼び出し側が差し込む
    /// ハードコードされた語彙セット。
    pub fn fallback_words<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<String> {
        let mut words: Vec<String> = FALLBACK_WORDS.iter().map(|w| w.to_string()).collect();
        words.shuffle(rng);
        words.truncate(count);
        words
    }

    /// カタログ全体の語数（重複込み）
    pub fn total_words(&self) -> usize {
        self.buckets.iter().map(|b| b.words.len()).sum()
    }

    /// 指定した単語がカタログに含まれるか（大文字小文字無視）
    pub fn contains(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.buckets
            .iter()
            .any(|b| b.words.iter().any(|w| w.to_lowercase() == lower))
    }
}

impl Default for WordCatalogue {
    fn default() -> Self {
        Self::new()
    }
}

fn level_weight(level: VocabularyLevel) -> u32 {
    match level {
        VocabularyLevel::Intermediate => 3,
        VocabularyLevel::Advanced => 2,
        VocabularyLevel::Expert => 1,
    }
}

fn bucket_words(level: VocabularyLevel, category: VocabularyCategory) -> &'static [&'static str] {
    use VocabularyCategory::*;
    use VocabularyLevel::*;
    match (level, category) {
        (Intermediate, Academic) => INTERMEDIATE_ACADEMIC,
        (Intermediate, Business) => INTERMEDIATE_BUSINESS,
        (Intermediate, Scientific) => INTERMEDIATE_SCIENTIFIC,
        (Intermediate, Literary) => INTERMEDIATE_LITERARY,
        (Intermediate, General) => INTERMEDIATE_GENERAL,
        (Advanced, Academic) => ADVANCED_ACADEMIC,
        (Advanced, Business) => ADVANCED_BUSINESS,
        (Advanced, Scientific) => ADVANCED_SCIENTIFIC,
        (Advanced, Literary) => ADVANCED_LITERARY,
        (Advanced, General) => ADVANCED_GENERAL,
        (Expert, Academic) => EXPERT_ACADEMIC,
        (Expert, Business) => EXPERT_BUSINESS,
        (Expert, Scientific) => EXPERT_SCIENTIFIC,
        (Expert, Literary) => EXPERT_LITERARY,
        (Expert, General) => EXPERT_GENERAL,
    }
}

const INTERMEDIATE_ACADEMIC: &[&str] = &[
    "analyze", "hypothesis", "criteria", "relevant", "significant", "establish", "demonstrate",
    "interpret", "evaluate", "consistent", "adequate", "fundamental", "preliminary", "subsequent",
    "framework", "methodology",
];

const INTERMEDIATE_BUSINESS: &[&str] = &[
    "negotiate", "revenue", "invoice", "stakeholder", "deadline", "procurement", "forecast",
    "quarterly", "merger", "liability", "incentive", "logistics", "compliance", "turnover",
    "subsidiary", "benchmark",
];

const INTERMEDIATE_SCIENTIFIC: &[&str] = &[
    "molecule", "catalyst", "velocity", "organism", "phenomenon", "variable", "equilibrium",
    "synthesis", "friction", "membrane", "particle", "radiation", "specimen", "mutation",
    "trajectory", "sediment",
];

const INTERMEDIATE_LITERARY: &[&str] = &[
    "metaphor", "narrative", "protagonist", "irony", "imagery", "allegory", "prologue",
    "melancholy", "vivid", "solitude", "nostalgia", "tragedy", "eloquence", "satire",
    "ambience", "poignant",
];

const INTERMEDIATE_GENERAL: &[&str] = &[
    "accommodate", "anticipate", "appreciate", "substantial", "appropriate", "distinct",
    "efficient", "beneficial", "crucial", "essential", "accurate", "reliable", "versatile",
    "flexible", "thorough", "widespread",
];

const ADVANCED_ACADEMIC: &[&str] = &[
    "substantiate", "empirical", "paradigm", "dichotomy", "extrapolate", "corroborate",
    "juxtapose", "pedagogy", "axiomatic", "heuristic", "epistemology", "synthesize",
    "discourse", "canonical", "seminal", "tautology",
];

const ADVANCED_BUSINESS: &[&str] = &[
    "amortize", "arbitrage", "divestiture", "fiduciary", "indemnity", "solvency",
    "conglomerate", "depreciation", "leverage", "remuneration", "austerity", "collateral",
    "escrow", "liquidation", "outsourcing", "syndicate",
];

const ADVANCED_SCIENTIFIC: &[&str] = &[
    "entropy", "isotope", "polymer", "quantum", "symbiosis", "thermodynamics", "enzyme",
    "chromosome", "oscillation", "photosynthesis", "precipitate", "refraction", "stochastic",
    "viscosity", "homeostasis", "catalysis",
];

const ADVANCED_LITERARY: &[&str] = &[
    "ephemeral", "quintessential", "serendipity", "sublime", "verbose", "wistful", "archetype",
    "cacophony", "euphemism", "lyrical", "pathos", "picaresque", "soliloquy", "vernacular",
    "denouement", "elegiac",
];

const ADVANCED_GENERAL: &[&str] = &[
    "eloquent", "resilient", "meticulous", "ubiquitous", "pragmatic", "contemplative",
    "inevitable", "sophisticated", "ambiguous", "diligent", "inherent", "prominent",
    "deteriorate", "facilitate", "scrutinize", "tenacious",
];

const EXPERT_ACADEMIC: &[&str] = &[
    "hermeneutics", "ontological", "teleological", "solipsism", "dialectic", "exegesis",
    "positivism", "reification", "apriorism", "nomenclature", "historiography", "phenomenology",
];

const EXPERT_BUSINESS: &[&str] = &[
    "subrogation", "usufruct", "recapitalization", "securitization", "tranche", "moratorium",
    "novation", "rescission", "seigniorage", "disintermediation",
];

const EXPERT_SCIENTIFIC: &[&str] = &[
    "epigenetics", "superposition", "tribology", "allotrope", "chirality", "ferromagnetism",
    "nucleosynthesis", "piezoelectric", "tropism", "zwitterion",
];

const EXPERT_LITERARY: &[&str] = &[
    "sesquipedalian", "apotheosis", "bildungsroman", "chiaroscuro", "leitmotif", "palimpsest",
    "panegyric", "peripeteia", "synecdoche", "verisimilitude",
];

const EXPERT_GENERAL: &[&str] = &[
    "perspicacious", "obfuscate", "recalcitrant", "intransigent", "pulchritude", "obstreperous",
    "sycophant", "truculent", "insouciant", "perfunctory",
];

/// カタログ抽出が全滅したときの固定語彙
const FALLBACK_WORDS: &[&str] = &[
    "eloquent", "resilient", "meticulous", "ubiquitous", "serendipity", "ephemeral", "pragmatic",
    "contemplative", "inevitable", "sophisticated", "ambiguous", "diligent", "substantiate",
    "inherent", "prominent", "comprehensive", "deteriorate", "facilitate", "accumulate",
    "preliminary", "substantial", "accommodate", "investigate", "demonstrate", "appreciate",
    "anticipate", "equivalent", "fundamental", "adequate", "appropriate", "consistent",
    "distinct", "establish", "maintain", "acquire", "significant", "relevant", "specific",
    "particular", "individual", "efficient", "effective", "beneficial", "advantageous",
    "crucial", "essential", "vital", "critical", "accurate", "precise", "reliable",
    "dependable", "trustworthy", "credible", "authentic", "innovative", "creative",
    "imaginative", "resourceful", "versatile", "adaptable", "flexible", "dynamic",
    "progressive", "advanced", "complex", "intricate", "elaborate", "detailed", "thorough",
    "extensive", "widespread", "universal", "global",
];
