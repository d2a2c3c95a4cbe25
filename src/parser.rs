use crate::types::{MonologueContent, VocabularyRecord};
use regex_lite::Regex;

/// 音声合成に渡すテキストの文字数上限
///
/// 下流の合成ツール側の実用的な入力長制限に合わせる。
pub const MAX_SPEECH_CHARS: usize = 5000;

/// 例文として取り込む最大数
const MAX_EXAMPLE_SENTENCES: usize = 5;

/// AI応答を解析して学習レコードを生成
///
/// 入力はラベル付きセクション構成に「おおむね」従う自由形式テキスト。
/// 見つからないセクションは未設定のまま残し、決してエラーにしない。
/// 解析が全滅しても `word` と生テキストだけのレコードを返す。
///
/// マーカー切り出し方式はモデル出力の揺れに弱いため、この関数群の
/// 背後に実装を隠している。構造化出力（JSON指定など)へ移行する場合も
/// 呼び出し側には手を入れずに差し替えられる。
pub fn parse(word: &str, raw: &str) -> VocabularyRecord {
    log::debug!("単語 '{}' のAI応答を解析", word);

    let mut record = VocabularyRecord::new(word, raw);

    record.pronunciation = extract_pronunciation(raw);
    record.part_of_speech = extract_part_of_speech(raw);
    record.simple_definition = extract_simple_definition(raw);
    record.advanced_definition = extract_advanced_definition(raw);
    record.example_sentences = extract_example_sentences(raw);
    record.collocations =
        extract_section(raw, r"(?:common )?collocations?").and_then(|s| format_list_section(&s));

    let (synonyms, antonyms) = extract_synonyms_antonyms(raw);
    record.synonyms = synonyms;
    record.antonyms = antonyms;

    record.confused_words = extract_section(raw, r"(?:commonly )?confused(?: words)?")
        .and_then(|s| format_list_section(&s));
    record.word_family =
        extract_section(raw, r"word family").and_then(|s| format_list_section(&s));
    record.translation =
        extract_section(raw, r"japanese(?: translation)?").and_then(|s| format_list_section(&s));

    log::debug!(
        "単語 '{}': {} 項目を解析",
        word,
        record.parsed_field_count()
    );

    record
}

/// モノローグ応答から3スパンを切り出す
///
/// 固定マーカー（Monologue / Explanation / Pronunciation）で区切られた
/// 本文・解説・発音メモを取り出す。本文マーカーが無い場合は
/// 「モノローグなし」として `None` を返す。エラーではない。
pub fn parse_monologue(text: &str) -> Option<MonologueContent> {
    let narrative = monologue_span(text, "Monologue", Some("Explanation"))?;
    if narrative.is_empty() {
        return None;
    }

    let explanation = monologue_span(text, "Explanation", Some("Pronunciation")).unwrap_or_default();
    let pronunciation = monologue_span(text, "Pronunciation", None)
        .map(|s| {
            s.replace('/', "")
                .replace('[', "")
                .replace(']', "")
                .trim()
                .to_string()
        })
        .unwrap_or_default();

    Some(MonologueContent {
        narrative,
        explanation,
        pronunciation,
    })
}

/// モノローグ応答を追記用に正規化
///
/// 空行の連続を潰し、本文マーカーが欠けていれば補う。
/// レコードの生テキストへ追記される形式で返す。
pub fn normalize_monologue_block(text: &str) -> String {
    let collapsed = regex_replace(text.trim(), r"\n{3,}", "\n\n");
    if collapsed.contains("Monologue:") {
        collapsed
    } else {
        format!("**Monologue:**\n{}", collapsed)
    }
}

/// 音声合成向けのテキストクリーンアップ
///
/// マークダウンの強調・見出し・リスト・リンク・コード記号を取り除き、
/// 連続する空白を1つにまとめる。括弧書きはそのまま残す。
/// 上限を超える長さは切り詰めて末尾に `...` を付ける。
pub fn clean_for_speech(text: &str) -> String {
    let mut cleaned = text.to_string();

    cleaned = regex_replace(&cleaned, r"\*\*([^*]+?)\*\*", "$1");
    cleaned = regex_replace(&cleaned, r"\*([^*]+?)\*", "$1");
    cleaned = regex_replace(&cleaned, r"_([^_]+?)_", "$1");
    cleaned = regex_replace(&cleaned, r"#+\s*", "");
    cleaned = regex_replace(&cleaned, r"\[([^\]]+)\]\([^)]+\)", "$1");
    cleaned = regex_replace(&cleaned, r"\[([^\]]+)\]", "$1");
    cleaned = regex_replace(&cleaned, r"`([^`]+)`", "$1");
    cleaned = regex_replace(&cleaned, r"(?m)^\s*>\s*", "");
    cleaned = regex_replace(&cleaned, r"(?m)^\s*[-*+]\s+", "");
    cleaned = regex_replace(&cleaned, r"(?m)^\s*\d+\.\s+", "");
    cleaned = regex_replace(&cleaned, r"\s+", " ");
    cleaned = cleaned.trim().to_string();

    if cleaned.chars().count() > MAX_SPEECH_CHARS {
        log::warn!(
            "合成テキストが長すぎます ({} 文字)。{} 文字に切り詰めます",
            cleaned.chars().count(),
            MAX_SPEECH_CHARS
        );
        cleaned = cleaned.chars().take(MAX_SPEECH_CHARS).collect::<String>() + "...";
    }

    cleaned
}

fn extract_pronunciation(text: &str) -> Option<String> {
    // IPA表記のパターンを順に試す
    let patterns = [
        r"(?i)pronunciation[:\s]*\**\s*(/[^/\n]+/)",
        r"(?i)ipa[:\s]*\**\s*(/[^/\n]+/)",
        r"(/[^/\n]+/)",
    ];

    for pattern in patterns {
        if let Some(found) = first_capture(text, pattern) {
            return Some(found);
        }
    }
    None
}

fn extract_part_of_speech(text: &str) -> Option<String> {
    first_capture(text, r"(?i)part of speech\s*\**\s*:\s*\**\s*\(?([^\n.()]+)")
        .map(|s| strip_emphasis(&s).trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_simple_definition(text: &str) -> Option<String> {
    first_capture(text, r"(?i)simple(?: definition)?\s*\**\s*:\s*\**\s*([^\n]+)")
        .map(|s| strip_emphasis(&s).trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_advanced_definition(text: &str) -> Option<String> {
    first_capture(
        text,
        r"(?i)advanced(?: definition)?\s*\**\s*:\s*\**\s*([^\n]+(?:\n\s*[^\n*]+)*)",
    )
    .map(|s| strip_emphasis(&s).trim().to_string())
    .filter(|s| !s.is_empty())
}

/// 例文の抽出
///
/// 例文セクション内の番号付きリストを出現順に取り出す。
/// セクションが見つからない場合は引用符付きの箇条書きを全文から探す。
/// どちらも無ければ空のリストを返す。
fn extract_example_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();

    if let Some(section) = extract_section(text, r"example sentences?") {
        if let Ok(re) = Regex::new(r"(?m)^\s*\d+\.\s*(.+)$") {
            for cap in re.captures_iter(&section) {
                if sentences.len() >= MAX_EXAMPLE_SENTENCES {
                    break;
                }
                if let Some(m) = cap.get(1) {
                    let sentence = strip_emphasis(m.as_str())
                        .trim()
                        .trim_matches('"')
                        .trim()
                        .to_string();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                }
            }
        }
    }

    if sentences.is_empty() {
        if let Ok(re) = Regex::new(r#"(?m)(?:\*|\d+\.|-)\s*"([^"\n]+)""#) {
            for cap in re.captures_iter(text) {
                if sentences.len() >= MAX_EXAMPLE_SENTENCES {
                    break;
                }
                if let Some(m) = cap.get(1) {
                    let sentence = m.as_str().trim().to_string();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                }
            }
        }
    }

    sentences
}

/// ラベル付きセクションの切り出し
///
/// ラベル見出しを探し、その直後から次の太字見出し行（`**Xxx:**` 形式）
/// までのスパンを返す。見出しが見つからなければ `None`。
fn extract_section(text: &str, label_pattern: &str) -> Option<String> {
    let header =
        Regex::new(&format!(r"(?i)\**\s*(?:\d+\.\s*)?(?:{})[^\n]*?:\**", label_pattern)).ok()?;
    let found = header.find(text)?;
    let rest = &text[found.end()..];

    let boundary = Regex::new(r"(?m)^\s*\*\*[A-Za-z][^\n]*?:\*\*").ok()?;
    let end = boundary.find(rest).map(|b| b.start()).unwrap_or(rest.len());

    let span = rest[..end].trim();
    if span.is_empty() {
        None
    } else {
        Some(span.to_string())
    }
}

/// 類義語・対義語の切り出し
///
/// 「Synonyms & Antonyms」のようにひとつのセクションにまとまっている
/// 応答と、別セクションになっている応答の両方を扱う。
fn extract_synonyms_antonyms(text: &str) -> (Option<String>, Option<String>) {
    let combined = match extract_section(text, r"synonyms?") {
        Some(section) => section,
        None => return (None, extract_section(text, r"antonyms?").and_then(|s| format_list_section(&s))),
    };

    let subheader = Regex::new(r"(?im)^[\s*]*antonyms?\s*:\**\s*$").ok();
    if let Some(found) = subheader.as_ref().and_then(|re| re.find(&combined)) {
        let synonyms_part = &combined[..found.start()];
        let antonyms_part = &combined[found.end()..];
        (
            format_list_section(synonyms_part),
            format_list_section(antonyms_part),
        )
    } else {
        (
            format_list_section(&combined),
            extract_section(text, r"antonyms?").and_then(|s| format_list_section(&s)),
        )
    }
}

/// セクション本文を箇条書きの平文に整形
///
/// 行ごとにマークダウン記号と番号を落とし、`• ` を付けて並べ直す。
/// 有効な行がひとつも無ければ `None`。
fn format_list_section(content: &str) -> Option<String> {
    let marker = Regex::new(r"^\s*(?:[-*+•]|\d+\.)\s*").ok();
    let mut lines = Vec::new();

    for line in content.lines() {
        let without_marker = match &marker {
            Some(re) => re.replace(line, "").into_owned(),
            None => line.to_string(),
        };
        let cleaned = strip_emphasis(&without_marker).trim().to_string();
        if cleaned.is_empty() || cleaned.chars().all(|c| !c.is_alphanumeric()) {
            continue;
        }
        // 小見出しだけの行（"Synonyms:" など）は飛ばす
        if cleaned.ends_with(':') && cleaned.chars().filter(|c| c.is_whitespace()).count() == 0 {
            continue;
        }
        lines.push(format!("• {}", cleaned));
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn strip_emphasis(text: &str) -> String {
    text.replace('*', "").replace('_', "")
}

fn first_capture(text: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn regex_replace(text: &str, pattern: &str, replacement: &str) -> String {
    match Regex::new(pattern) {
        Ok(re) => re.replace_all(text, replacement).into_owned(),
        Err(_) => text.to_string(),
    }
}

/// モノローグマーカーの位置を探す
///
/// `**Name:**` 形式を優先し、無ければ素の `Name:` 形式を探す。
fn find_marker(text: &str, name: &str) -> Option<(usize, usize)> {
    let bold = format!("**{}:**", name);
    if let Some(i) = text.find(&bold) {
        return Some((i, i + bold.len()));
    }
    let plain = format!("{}:", name);
    text.find(&plain).map(|i| (i, i + plain.len()))
}

fn monologue_span(text: &str, name: &str, next: Option<&str>) -> Option<String> {
    let (_, content_start) = find_marker(text, name)?;
    let rest = &text[content_start..];
    let stop = next
        .and_then(|n| find_marker(rest, n))
        .map(|(start, _)| start)
        .unwrap_or(rest.len());
    Some(rest[..stop].trim().to_string())
}
