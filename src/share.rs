use crate::exercise::LanguagePair;
use crate::scoring::ScoreReport;

pub const SITE_URL: &str = "https://typeswitch.io";

fn post_lines(pair: LanguagePair) -> (&'static str, &'static str) {
    match pair {
        LanguagePair::HebrewEnglish => (
            "עשיתי את מבחן ההקלדה של TypeSwitch.",
            "מסתבר שרמת ההקלדה שלי היא \"{level}\" עם ציון כללי של {score}/100.",
        ),
        LanguagePair::RussianEnglish => (
            "Я прошёл тест на скорость печати от TypeSwitch.",
            "Оказывается, мой уровень — \"{level}\" с общим баллом {score}/100.",
        ),
        LanguagePair::ArabicEnglish => (
            "لقد أجريت اختبار الكتابة من TypeSwitch.",
            "اتضح أن مستواي هو \"{level}\" بنتيجة إجمالية {score}/100.",
        ),
        LanguagePair::HindiEnglish => (
            "मैंने TypeSwitch टाइपिंग टेस्ट दिया।",
            "पता चला कि मेरा स्तर \"{level}\" है और कुल स्कोर {score}/100 है।",
        ),
        LanguagePair::FrenchEnglish => (
            "J'ai passé le test de dactylographie de TypeSwitch.",
            "Il s'avère que mon niveau est \"{level}\" avec un score global de {score}/100.",
        ),
        LanguagePair::JapaneseEnglish => (
            "TypeSwitchのタイピングテストを受けました。",
            "私のレベルは「{level}」で、総合スコアは{score}/100でした。",
        ),
    }
}

/// Localized post announcing a result.
pub fn share_text(pair: LanguagePair, report: &ScoreReport) -> String {
    let (intro, result) = post_lines(pair);
    let result = result
        .replace("{level}", &report.level().to_string())
        .replace("{score}", &report.final_score.to_string());
    format!("{intro}\n{result}\n{SITE_URL}")
}

/// Tweet intent carrying the post text.
pub fn share_url(text: &str) -> String {
    format!("https://twitter.com/intent/tweet?text={}", percent_encode(text))
}

/// Encode everything outside the URI unreserved set, byte by byte.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 3);
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
