use serde::{Deserialize, Serialize};

/// 可读性指标集合
///
/// 字段名与对外报告保持一致，数值按教科书公式计算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityScores {
    pub flesch_reading_ease: f64,
    pub smog_index: f64,
    pub flesch_kincaid_grade: f64,
    pub coleman_liau_index: f64,
    pub automated_readability_index: f64,
    pub dale_chall_readability_score: f64,
    pub difficult_words: usize,
    pub linsear_write_formula: f64,
    pub gunning_fog: f64,
    pub sentence_count: usize,
    pub word_count: usize,
    pub syllable_count: usize,
}
