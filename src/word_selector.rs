use crate::catalogue::{WordCatalogue, CATEGORIES, LEVELS};
use crate::config::SelectionConfig;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// カテゴリ総当たり時のバッチサイズ
const SWEEP_BATCH_SIZE: usize = 10;

/// 1日分の単語セットを選定する
///
/// 新規語と復習語のバランスを取りながら、履歴との重複を
/// 大文字小文字無視で排除した単語リストを作る。
///
/// 選定ポリシーは「新規+復習ミックス」の一本のみ。`review_words` を
/// 0 にすれば全語新規の挙動になる。
pub struct WordSelector {
    catalogue: WordCatalogue,
    config: SelectionConfig,
}

impl WordSelector {
    pub fn new(catalogue: WordCatalogue, config: SelectionConfig) -> Self {
        Self { catalogue, config }
    }

    /// 単語セットを選定
    ///
    /// # Arguments
    ///
    /// * `total` - 選定する単語数の上限
    /// * `review_count` - 復習枠の数。履歴からランダムに引く。
    ///   履歴が空の場合この枠は新規枠に回る。
    /// * `used_words` - 既出単語の集合（小文字）
    ///
    /// # Returns
    ///
    /// シャッフル済みの単語リスト。新規候補が尽きた場合は `total` より
    /// 短いリストを返す。呼び出し側は短いリストを許容し、空の場合は
    /// 固定の語彙セットで代替すること。
    pub fn select(&self, total: usize, review_count: usize, used_words: &HashSet<String>) -> Vec<String> {
        let mut rng = rand::thread_rng();
        let mut picked: Vec<String> = Vec::new();
        let mut picked_lower: HashSet<String> = HashSet::new();

        // 復習枠: 履歴から一様ランダムに引く
        if review_count > 0 && !used_words.is_empty() {
            let pool: Vec<&String> = used_words.iter().collect();
            let review_take = review_count.min(total).min(pool.len());
            for &word in pool.choose_multiple(&mut rng, review_take) {
                if picked_lower.insert(word.to_lowercase()) {
                    picked.push(word.clone());
                }
            }
            log::info!("復習枠として {} 語を選定", picked.len());
        } else if review_count > 0 {
            log::info!("履歴が空のため復習枠は新規枠に回します");
        }

        // 新規枠: 候補を多めに引いて履歴・選定済みと突き合わせる
        let mut attempts = 0;
        while picked.len() < total && attempts < self.config.max_attempts {
            attempts += 1;
            let remaining = total - picked.len();
            let draw = (remaining * 2).max(20);
            log::debug!("新規単語の抽選 {} 回目 ({} 語要求)", attempts, draw);

            let candidates = self.catalogue.random_mixed(draw, &mut rng);
            for word in candidates {
                let lower = word.to_lowercase();
                if used_words.contains(&lower) || picked_lower.contains(&lower) {
                    continue;
                }
                picked_lower.insert(lower);
                picked.push(word);
                if picked.len() >= total {
                    break;
                }
            }

            log::debug!("{} 回目終了時点で {} 語", attempts, picked.len());
        }

        // まだ足りなければ全 (レベル × カテゴリ) を総当たり
        if picked.len() < total {
            log::info!(
                "あと {} 語が必要。カテゴリ総当たりに切り替えます",
                total - picked.len()
            );

            'sweep: for &level in &LEVELS {
                for &category in &CATEGORIES {
                    let batch = self
                        .catalogue
                        .batch(level, category, SWEEP_BATCH_SIZE, &mut rng);
                    for word in batch {
                        let lower = word.to_lowercase();
                        if used_words.contains(&lower) || picked_lower.contains(&lower) {
                            continue;
                        }
                        picked_lower.insert(lower);
                        picked.push(word);
                        if picked.len() >= total {
                            break 'sweep;
                        }
                    }
                }
            }
        }

        if picked.len() < total {
            log::warn!(
                "新規候補が尽きました。{} 語中 {} 語のみ選定",
                total,
                picked.len()
            );
        }

        picked.shuffle(&mut rng);
        picked
    }

    /// 設定値で単語セットを選定
    pub fn select_daily(&self, used_words: &HashSet<String>) -> Vec<String> {
        self.select(self.config.total_words, self.config.review_words, used_words)
    }

    /// 固定の代替語彙セットを取得
    ///
    /// 選定結果が空だったときに使う最終手段。
    pub fn fallback_set(&self, count: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();
        self.catalogue.fallback_words(count, &mut rng)
    }
}
